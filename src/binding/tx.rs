//! State-changing call execution
//!
//! Signs, submits, and awaits contract calls. Every submission is
//! pre-flight simulated first: a call the simulation already rejects is
//! never broadcast, so no fee is spent on an outcome that is certain.
//! There is no retry and no cancellation once broadcast; a timeout while
//! waiting for inclusion is reported as-is.

use super::decode;
use super::query::QueryExecutor;
use crate::abi::Abi;
use crate::config::CallDefaults;
use crate::connection::{
    CallData, ChainClient, ConnectionError, InclusionReceipt,
};
use crate::errors::CallOutcome;
use crate::signer::Signer;
use crate::types::{AccountId, ContractOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An event decoded against the binding's event schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub name: String,
    pub data: Vec<u8>,
}

impl DecodedEvent {
    /// Decode the payload into a concrete event type
    pub fn parse<T: DeserializeOwned>(&self) -> Option<T> {
        bincode::deserialize(&self.data).ok()
    }
}

/// Result of submitting a state-changing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    /// Layered outcome of the call. A pre-flight rejection or invocation
    /// failure is surfaced here directly, without the call ever having been
    /// broadcast.
    pub outcome: CallOutcome<()>,

    /// Inclusion proof; `None` when pre-flight aborted before broadcast
    pub receipt: Option<InclusionReceipt>,

    /// Events emitted by the call, decoded against the event schema
    pub events: Vec<DecodedEvent>,
}

impl SubmissionOutcome {
    /// Whether the call was broadcast and accepted by the program
    pub fn is_accepted(&self) -> bool {
        self.receipt.is_some() && self.outcome.is_value()
    }

    /// Whether pre-flight aborted the submission before any broadcast
    pub fn aborted_in_preflight(&self) -> bool {
        self.receipt.is_none()
    }

    /// First decoded event with the given schema name
    pub fn event(&self, name: &str) -> Option<&DecodedEvent> {
        self.events.iter().find(|ev| ev.name == name)
    }
}

/// State-changing facade over a binding snapshot
#[derive(Debug, Clone)]
pub struct TxExecutor {
    abi: Arc<Abi>,
    client: Arc<dyn ChainClient>,
    address: AccountId,
    signer: Arc<Signer>,
    defaults: CallDefaults,
}

impl TxExecutor {
    pub(crate) fn new(
        abi: Arc<Abi>,
        client: Arc<dyn ChainClient>,
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

    /// Sign, submit, and await `method` with `args`.
    ///
    /// Pre-flights the equivalent query first and aborts without
    /// broadcasting when simulation already fails. On success the returned
    /// outcome reflects the dispatch result observed at inclusion, together
    /// with the block reference and the decoded events.
    pub async fn submit<A: Serialize>(
        &self,
        method: &str,
        args: &A,
        options: ContractOptions,
    ) -> Result<SubmissionOutcome, ConnectionError> {
        let preflight: CallOutcome<()> = self.preflight_view().call(method, args, options).await?;
        if !preflight.is_value() {
            warn!(
                method,
                contract = %self.address,
                outcome = preflight.category(),
                "pre-flight failed, not broadcasting"
            );
            return Ok(SubmissionOutcome {
                outcome: preflight,
                receipt: None,
                events: Vec::new(),
            });
        }

        let input = match self.abi.encode_call(method, args) {
            Ok(input) => input,
            // Pre-flight already encoded the same arguments, so this arm is
            // unreachable in practice; surface it the same way regardless.
            Err(lang) => {
                return Ok(SubmissionOutcome {
                    outcome: CallOutcome::Invalid(lang),
                    receipt: None,
                    events: Vec::new(),
                })
            }
        };

        let resolved = options.merged(&self.defaults.options);
        let call = CallData::Contract {
            address: self.address,
            input,
            value: resolved.value.unwrap_or(0),
            gas_limit: resolved.gas_limit.unwrap_or(0),
            storage_deposit_limit: resolved.storage_deposit_limit,
        };

        let signer_account = self.signer.account_id();
        let nonce = self.client.account_nonce(&signer_account).await?;
        let submission = self.signer.sign_submission(call, nonce);
        debug!(method, nonce, signer = %signer_account, "broadcasting");

        let receipt = self
            .client
            .submit(&submission, self.defaults.policy)
            .await?;

        let outcome = match &receipt.exec {
            Some(raw) => decode::decode_outcome(raw),
            None => CallOutcome::Value(()),
        };
        let events = self.decode_events(&receipt);
        info!(
            method,
            contract = %self.address,
            block = receipt.block.number,
            outcome = outcome.category(),
            events = events.len(),
            "submission included"
        );

        Ok(SubmissionOutcome {
            outcome,
            receipt: Some(receipt),
            events,
        })
    }

    /// The query view used for pre-flight; evaluated as this executor's
    /// signer
    fn preflight_view(&self) -> QueryExecutor {
        QueryExecutor::new(
            Arc::clone(&self.abi),
            Arc::clone(&self.client),
            self.address,
            self.signer.account_id(),
            self.defaults,
        )
    }

    fn decode_events(&self, receipt: &InclusionReceipt) -> Vec<DecodedEvent> {
        receipt
            .events
            .iter()
            .filter_map(|raw| {
                let name = self.abi.event_name(raw.tag)?;
                Some(DecodedEvent {
                    name: name.to_string(),
                    data: raw.data.clone(),
                })
            })
            .collect()
    }

    pub fn address(&self) -> AccountId {
        self.address
    }

    pub fn signer(&self) -> &Arc<Signer> {
        &self.signer
    }
}
