//! Chain connection module
//!
//! The node-facing seam of the harness: a trait over the handful of
//! primitives the facade consumes (clock and state queries, dry-run
//! simulation, signed submission with inclusion signaling), plus the wire
//! types those primitives exchange. Everything above this module is
//! connection-agnostic; tests run against the in-memory implementation in
//! `test_utils`.

use crate::types::{
    AccountId, Balance, BlockHash, BlockNumber, BlockRef, InclusionPolicy, Timestamp,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// Submodules
pub mod errors;

// Re-exports for convenience
pub use errors::ConnectionError;

/// Payload of a submittable or simulatable call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallData {
    /// Invoke a method on a deployed program
    Contract {
        address: AccountId,
        /// Selector-prefixed, ABI-encoded call input
        input: Vec<u8>,
        value: Balance,
        gas_limit: u64,
        storage_deposit_limit: Option<Balance>,
    },
    /// Instantiate a new program from constructor input
    Instantiate {
        input: Vec<u8>,
        value: Balance,
        gas_limit: u64,
    },
    /// Privileged: set the chain clock. Only the designated authority may
    /// submit this; the new value becomes observable at the next produced
    /// block.
    SetClock { timestamp: Timestamp },
}

/// A read-only call attempt, evaluated against current state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    /// Account the call is evaluated as
    pub origin: AccountId,
    pub data: CallData,
}

/// A signed, broadcastable submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedSubmission {
    pub call: CallData,
    pub signer: AccountId,
    /// Signer sequence number; enforces per-signer submission ordering
    pub nonce: u64,
    /// ed25519 signature over the canonical (call, nonce) payload
    pub signature: Vec<u8>,
}

/// Execution-engine-level failure of a call attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VmFailure {
    Trapped,
    OutOfGas,
}

/// Raw result of evaluating a call, before any ABI interpretation
///
/// `exec` is `Err` when the engine aborted the invocation outright; `Ok`
/// carries the program's flag-prefixed return bytes, which may themselves
/// encode a value, a defined rejection, or an in-band dispatch failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCallOutcome {
    pub exec: Result<Vec<u8>, VmFailure>,
    pub gas_consumed: u64,
}

/// An event as captured at inclusion, before schema decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Wire tag resolved through the ABI's event schema
    pub tag: u8,
    pub data: Vec<u8>,
}

/// Proof of inclusion for a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionReceipt {
    pub block: BlockRef,
    /// Position of the submission within the block
    pub index: u32,
    /// Dispatch outcome of a contract call; `None` for non-contract
    /// submissions
    pub exec: Option<RawCallOutcome>,
    pub events: Vec<RawEvent>,
    /// Address of the program created by an instantiation
    pub instantiated: Option<AccountId>,
}

/// The network connection a binding operates over
///
/// Shared read-only: rebinding a facade never closes or reconfigures the
/// connection itself, only the logical view bound to it. Implementations
/// block each call until a response or timeout; no retries.
#[async_trait]
pub trait ChainClient: Send + Sync + std::fmt::Debug {
    /// Current on-chain clock value
    async fn clock_now(&self) -> Result<Timestamp, ConnectionError>;

    /// Block-hash-by-number lookup
    async fn block_hash(&self, number: BlockNumber) -> Result<Option<BlockHash>, ConnectionError>;

    /// Generic state query by raw key
    async fn state_query(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ConnectionError>;

    /// Next expected sequence number for an account
    async fn account_nonce(&self, account: &AccountId) -> Result<u64, ConnectionError>;

    /// Dry-run a call against current state; no mutation, no fee, never
    /// broadcast
    async fn simulate(&self, call: &CallRequest) -> Result<RawCallOutcome, ConnectionError>;

    /// Broadcast a signed submission and wait for inclusion per `policy`
    async fn submit(
        &self,
        submission: &SignedSubmission,
        policy: InclusionPolicy,
    ) -> Result<InclusionReceipt, ConnectionError>;
}

/// Abstract "force a block" capability
///
/// Some networks only commit certain state transitions (notably clock
/// changes) when a block is produced. What operation achieves production is
/// implementation-defined; the harness assumes nothing about it.
#[async_trait]
pub trait BlockProducer: Send + Sync + std::fmt::Debug {
    async fn produce_block(&self) -> Result<BlockRef, ConnectionError>;
}
