//! Typed facade for the asset program
//!
//! The concrete instantiation of the binding machinery: a
//! fungible/collectible asset program with balance-and-allowance semantics.
//! `query` methods are dry simulations; `tx` methods sign and submit.
//! Rebinding forwards to the underlying [`ContractBinding`] and returns a
//! new facade, leaving the receiver untouched.

use crate::abi::Abi;
use crate::binding::{ContractBinding, QueryExecutor, SubmissionOutcome, TxExecutor};
use crate::config::CallDefaults;
use crate::connection::{ChainClient, ConnectionError};
use crate::deploy::Deployer;
use crate::errors::CallOutcome;
use crate::signer::Signer;
use crate::types::{AccountId, Balance, ContractOptions, Id};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Event schema tags
const EVENT_TRANSFER: u8 = 0;
const EVENT_APPROVAL: u8 = 1;

/// Interface description of the asset program
pub fn asset_abi() -> Abi {
    Abi::new()
        .with_method("collection_id", false)
        .with_method("balance_of", false)
        .with_method("owner_of", false)
        .with_method("allowance", false)
        .with_method("total_supply", false)
        .with_method("approve", true)
        .with_method("transfer", true)
        .with_event(EVENT_TRANSFER, TransferEvent::NAME)
        .with_event(EVENT_APPROVAL, ApprovalEvent::NAME)
}

/// Emitted when units move, including mints (`from: None`) and burns
/// (`to: None`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub from: Option<AccountId>,
    pub to: Option<AccountId>,
    pub value: Balance,
}

impl TransferEvent {
    pub const NAME: &'static str = "Transfer";
}

/// Emitted when an operator approval changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalEvent {
    pub owner: AccountId,
    pub operator: AccountId,
    pub id: Option<Id>,
    pub approved: bool,
}

impl ApprovalEvent {
    pub const NAME: &'static str = "Approval";
}

/// Typed handle to a deployed asset program
#[derive(Debug, Clone)]
pub struct AssetContract {
    binding: ContractBinding,
}

impl AssetContract {
    pub fn new(binding: ContractBinding) -> Self {
        Self { binding }
    }

    /// Bind to an already-deployed instance at `address`
    pub fn attach(
        client: Arc<dyn ChainClient>,
        address: AccountId,
        signer: Arc<Signer>,
        defaults: CallDefaults,
    ) -> Self {
        Self::new(ContractBinding::new(
            client,
            Arc::new(asset_abi()),
            address,
            signer,
            defaults,
        ))
    }

    /// Instantiate a fresh asset program with `initial_supply` minted to the
    /// deployer and bind to it
    pub async fn deploy(
        client: Arc<dyn ChainClient>,
        signer: Arc<Signer>,
        initial_supply: Balance,
        defaults: CallDefaults,
    ) -> Result<Self, ConnectionError> {
        let deployer = Deployer::new(client, defaults);
        let binding = deployer
            .instantiate(
                Arc::new(asset_abi()),
                signer,
                &(initial_supply,),
                ContractOptions::default(),
            )
            .await?;
        Ok(Self::new(binding))
    }

    pub fn binding(&self) -> &ContractBinding {
        &self.binding
    }

    pub fn address(&self) -> AccountId {
        self.binding.address()
    }

    pub fn with_signer(&self, signer: Arc<Signer>) -> Self {
        Self::new(self.binding.with_signer(signer))
    }

    pub fn with_address(&self, address: AccountId) -> Self {
        Self::new(self.binding.with_address(address))
    }

    pub fn with_client(&self, client: Arc<dyn ChainClient>) -> Self {
        Self::new(self.binding.with_client(client))
    }

    /// Read-only surface
    pub fn query(&self) -> AssetQuery {
        AssetQuery {
            exec: self.binding.query(),
        }
    }

    /// State-changing surface
    pub fn tx(&self) -> AssetTx {
        AssetTx {
            exec: self.binding.tx(),
        }
    }
}

/// Read-only methods of the asset program
#[derive(Debug, Clone)]
pub struct AssetQuery {
    exec: QueryExecutor,
}

impl AssetQuery {
    pub async fn collection_id(
        &self,
        options: ContractOptions,
    ) -> Result<CallOutcome<Id>, ConnectionError> {
        self.exec.call("collection_id", &(), options).await
    }

    pub async fn balance_of(
        &self,
        owner: &AccountId,
        options: ContractOptions,
    ) -> Result<CallOutcome<Balance>, ConnectionError> {
        self.exec.call("balance_of", &(*owner,), options).await
    }

    pub async fn owner_of(
        &self,
        id: &Id,
        options: ContractOptions,
    ) -> Result<CallOutcome<Option<AccountId>>, ConnectionError> {
        self.exec.call("owner_of", &(id.clone(),), options).await
    }

    pub async fn allowance(
        &self,
        owner: &AccountId,
        operator: &AccountId,
        id: Option<&Id>,
        options: ContractOptions,
    ) -> Result<CallOutcome<bool>, ConnectionError> {
        self.exec
            .call("allowance", &(*owner, *operator, id.cloned()), options)
            .await
    }

    pub async fn total_supply(
        &self,
        options: ContractOptions,
    ) -> Result<CallOutcome<Balance>, ConnectionError> {
        self.exec.call("total_supply", &(), options).await
    }
}

/// State-changing methods of the asset program
#[derive(Debug, Clone)]
pub struct AssetTx {
    exec: TxExecutor,
}

impl AssetTx {
    /// Grant or revoke `operator`'s approval, for one token or (with
    /// `id: None`) for the caller's whole holding
    pub async fn approve(
        &self,
        operator: &AccountId,
        id: Option<&Id>,
        approved: bool,
        options: ContractOptions,
    ) -> Result<SubmissionOutcome, ConnectionError> {
        self.exec
            .submit("approve", &(*operator, id.cloned(), approved), options)
            .await
    }

    /// Transfer `value` units to `to`, with an optional auxiliary payload
    /// forwarded to receiver-side checks
    pub async fn transfer(
        &self,
        to: &AccountId,
        value: Balance,
        data: Vec<u8>,
        options: ContractOptions,
    ) -> Result<SubmissionOutcome, ConnectionError> {
        self.exec
            .submit("transfer", &(*to, value, data), options)
            .await
    }
}
