//! Program instantiation
//!
//! Deploys a program instance and hands back a binding to it. Instantiation
//! is a signed submission like any other; the new instance's address comes
//! back in the inclusion receipt.

use crate::abi::Abi;
use crate::binding::ContractBinding;
use crate::config::CallDefaults;
use crate::connection::{CallData, ChainClient, ConnectionError};
use crate::signer::Signer;
use crate::types::ContractOptions;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Instantiates program instances over one connection
#[derive(Debug, Clone)]
pub struct Deployer {
    client: Arc<dyn ChainClient>,
    defaults: CallDefaults,
}

impl Deployer {
    pub fn new(client: Arc<dyn ChainClient>, defaults: CallDefaults) -> Self {
        Self { client, defaults }
    }

    /// Submit an instantiation with the given constructor arguments and bind
    /// to the created instance
    pub async fn instantiate<A: Serialize>(
        &self,
        abi: Arc<Abi>,
        signer: Arc<Signer>,
        constructor_args: &A,
        options: ContractOptions,
    ) -> Result<ContractBinding, ConnectionError> {
        let input = bincode::serialize(constructor_args)
            .map_err(|e| ConnectionError::Codec(format!("constructor arguments: {e}")))?;

        let resolved = options.merged(&self.defaults.options);
        let call = CallData::Instantiate {
            input,
            value: resolved.value.unwrap_or(0),
            gas_limit: resolved.gas_limit.unwrap_or(0),
        };

        let deployer_account = signer.account_id();
        let nonce = self.client.account_nonce(&deployer_account).await?;
        let submission = signer.sign_submission(call, nonce);
        let receipt = self
            .client
            .submit(&submission, self.defaults.policy)
            .await?;

        let address = receipt.instantiated.ok_or_else(|| {
            ConnectionError::transport("instantiation receipt carried no address")
        })?;
        info!(
            deployer = %deployer_account,
            address = %address,
            block = receipt.block.number,
            "program instantiated"
        );

        Ok(ContractBinding::new(
            Arc::clone(&self.client),
            abi,
            address,
            signer,
            self.defaults,
        ))
    }
}
