//! Deterministic time control
//!
//! Moves the on-chain clock and verifies it actually moved. Target networks
//! only commit clock changes when a block is produced, so a naive
//! set-then-read sequence races the block cadence; the protocol here is
//! read, submit the privileged set, force a block through the injected
//! [`BlockProducer`], then re-read and compare. A mismatch is fatal to the
//! calling test and is never retried.

use crate::connection::{BlockProducer, CallData, ChainClient, ConnectionError};
use crate::signer::Signer;
use crate::types::{InclusionPolicy, Timestamp};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Time-control failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeControlError {
    /// The clock did not converge on the requested value after block
    /// production
    #[error("timestamp mismatch: requested {requested}, observed {observed}")]
    TimestampMismatch {
        requested: Timestamp,
        observed: Timestamp,
    },

    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// Harness utility driving the on-chain clock
///
/// Independent of the contract binding; consumed directly by tests. The
/// privileged set is signed by the designated clock authority, and block
/// production is an injected capability with no assumption about which
/// underlying operation achieves it.
#[derive(Debug)]
pub struct TimeController {
    client: Arc<dyn ChainClient>,
    producer: Arc<dyn BlockProducer>,
    authority: Arc<Signer>,
}

impl TimeController {
    pub fn new(
        client: Arc<dyn ChainClient>,
        producer: Arc<dyn BlockProducer>,
        authority: Arc<Signer>,
    ) -> Self {
        Self {
            client,
            producer,
            authority,
        }
    }

    /// Set the on-chain clock to `target` and verify convergence
    pub async fn set_clock(&self, target: Timestamp) -> Result<(), TimeControlError> {
        let current = self.client.clock_now().await?;
        debug!(current, target, "setting on-chain clock");

        let authority_account = self.authority.account_id();
        let nonce = self.client.account_nonce(&authority_account).await?;
        let submission = self
            .authority
            .sign_submission(CallData::SetClock { timestamp: target }, nonce);
        self.client
            .submit(&submission, InclusionPolicy::InBlock)
            .await?;

        // The set only becomes observable once a block is produced
        let block = self.producer.produce_block().await?;
        debug!(block = block.number, "forced block production");

        let observed = self.client.clock_now().await?;
        if observed != target {
            return Err(TimeControlError::TimestampMismatch {
                requested: target,
                observed,
            });
        }
        Ok(())
    }

    /// Advance the on-chain clock by `delta` milliseconds, returning the new
    /// value
    pub async fn advance_clock(&self, delta: u64) -> Result<Timestamp, TimeControlError> {
        let now = self.client.clock_now().await?;
        let target = now + delta;
        debug!(now, delta, target, "advancing on-chain clock");
        self.set_clock(target).await?;
        Ok(target)
    }
}
