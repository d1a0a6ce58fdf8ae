//! Typed interaction harness for deployed on-chain programs
//!
//! Builds immutable contract bindings that expose a read-only query facade
//! and a signing/submitting tx facade, decodes call results through a
//! layered outcome model (transport failure vs invocation failure vs
//! program rejection), and drives the on-chain clock deterministically for
//! time-dependent tests.

// Module declarations
pub mod abi;
pub mod asset;
pub mod binding;
pub mod config;
pub mod connection;
pub mod deploy;
pub mod errors;
pub mod signer;
pub mod test_utils;
pub mod time_control;
pub mod types;

// Re-export commonly used types
pub use binding::{ContractBinding, DecodedEvent, QueryExecutor, SubmissionOutcome, TxExecutor};
pub use config::{CallDefaults, HarnessConfig, SignerSet};
pub use connection::{BlockProducer, ChainClient, ConnectionError};
pub use errors::{CallOutcome, ContractError, LangError};
pub use signer::Signer;
pub use time_control::{TimeControlError, TimeController};
pub use types::{AccountId, Balance, ContractOptions, Id, InclusionPolicy, Timestamp};

#[cfg(test)]
mod tests {
    // Include test modules
    mod helpers;

    mod asset_e2e_tests;
    mod binding_tests;
    mod outcome_roundtrip_tests;
    mod query_tests;
    mod time_control_tests;
    mod tx_tests;
}
