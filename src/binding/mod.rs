//! Contract binding module
//!
//! An immutable value bundling everything one program interaction needs: the
//! ABI, the chain connection, the program address, the acting signer, and the
//! call defaults. Rebinding swaps exactly one of those out by constructing a
//! new binding; nothing is ever mutated in place, so bindings are safe to
//! hand to concurrent test cases.

use crate::abi::Abi;
use crate::config::CallDefaults;
use crate::connection::ChainClient;
use crate::signer::Signer;
use crate::types::AccountId;
use std::sync::Arc;

// Submodules
pub mod decode;
pub mod query;
pub mod tx;

// Re-exports for convenience
pub use query::QueryExecutor;
pub use tx::{DecodedEvent, SubmissionOutcome, TxExecutor};

/// Immutable binding of an ABI, connection, program address, and signer
#[derive(Debug, Clone)]
pub struct ContractBinding {
    abi: Arc<Abi>,
    client: Arc<dyn ChainClient>,
    address: AccountId,
    signer: Arc<Signer>,
    defaults: CallDefaults,
}

impl ContractBinding {
    pub fn new(
        client: Arc<dyn ChainClient>,
        abi: Arc<Abi>,
        address: AccountId,
        signer: Arc<Signer>,
        defaults: CallDefaults,
    ) -> Self {
        Self {
            abi,
            client,
            address,
            signer,
            defaults,
        }
    }

    /// New binding acting as `signer`; the receiver is unchanged
    pub fn with_signer(&self, signer: Arc<Signer>) -> Self {
        Self {
            signer,
            ..self.clone()
        }
    }

    /// New binding targeting `address`; the receiver is unchanged
    pub fn with_address(&self, address: AccountId) -> Self {
        Self {
            address,
            ..self.clone()
        }
    }

    /// New binding over `client`; the receiver is unchanged. The previous
    /// connection object is left untouched; only the logical view moves.
    pub fn with_client(&self, client: Arc<dyn ChainClient>) -> Self {
        Self {
            client,
            ..self.clone()
        }
    }

    pub fn abi(&self) -> &Arc<Abi> {
        &self.abi
    }

    pub fn client(&self) -> &Arc<dyn ChainClient> {
        &self.client
    }

    pub fn address(&self) -> AccountId {
        self.address
    }

    pub fn signer(&self) -> &Arc<Signer> {
        &self.signer
    }

    pub fn defaults(&self) -> CallDefaults {
        self.defaults
    }

    /// Read-only facade over this binding
    ///
    /// Captures the binding's fields at the moment of access; later rebinds
    /// of the source do not affect an executor already obtained.
    pub fn query(&self) -> QueryExecutor {
        QueryExecutor::new(
            Arc::clone(&self.abi),
            Arc::clone(&self.client),
            self.address,
            self.signer.account_id(),
            self.defaults,
        )
    }

    /// State-changing facade over this binding; same snapshot semantics as
    /// [`ContractBinding::query`]
    pub fn tx(&self) -> TxExecutor {
        TxExecutor::new(
            Arc::clone(&self.abi),
            Arc::clone(&self.client),
            self.address,
            Arc::clone(&self.signer),
            self.defaults,
        )
    }
}
