//! Read-only call execution
//!
//! Dry simulation against current state: no mutation, no fee, never a
//! broadcast. Safe to call repeatedly with identical arguments.

use super::decode;
use crate::abi::Abi;
use crate::config::CallDefaults;
use crate::connection::{CallData, CallRequest, ChainClient, ConnectionError};
use crate::errors::CallOutcome;
use crate::types::{AccountId, ContractOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Read-only facade over a binding snapshot
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    abi: Arc<Abi>,
    client: Arc<dyn ChainClient>,
    address: AccountId,
    origin: AccountId,
    defaults: CallDefaults,
}

impl QueryExecutor {
    pub(crate) fn new(
        abi: Arc<Abi>,
        client: Arc<dyn ChainClient>,
        address: AccountId,
        origin: AccountId,
        defaults: CallDefaults,
    ) -> Self {
        Self {
            abi,
            client,
            address,
            origin,
            defaults,
        }
    }

    /// Simulate `method` with `args` and decode the result.
    ///
    /// Argument-encoding failures surface as an invalid outcome before any
    /// network round trip; transport failures of the connection surface as
    /// the outer error.
    pub async fn call<A: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        args: &A,
        options: ContractOptions,
    ) -> Result<CallOutcome<T>, ConnectionError> {
        let input = match self.abi.encode_call(method, args) {
            Ok(input) => input,
            Err(lang) => {
                debug!(method, error = %lang, "argument encoding failed before dispatch");
                return Ok(CallOutcome::Invalid(lang));
            }
        };

        let resolved = options.merged(&self.defaults.options);
        let request = CallRequest {
            origin: self.origin,
            data: CallData::Contract {
                address: self.address,
                input,
                value: resolved.value.unwrap_or(0),
                gas_limit: resolved.gas_limit.unwrap_or(0),
                storage_deposit_limit: resolved.storage_deposit_limit,
            },
        };

        let raw = self.client.simulate(&request).await?;
        let outcome = decode::decode_outcome(&raw);
        debug!(
            method,
            contract = %self.address,
            gas_consumed = raw.gas_consumed,
            outcome = outcome.category(),
            "query simulated"
        );
        Ok(outcome)
    }

    pub fn address(&self) -> AccountId {
        self.address
    }

    /// Account the simulation is evaluated as
    pub fn origin(&self) -> AccountId {
        self.origin
    }
}
