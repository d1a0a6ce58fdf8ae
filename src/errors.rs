//! Layered call-outcome model
//!
//! Outcomes of a contract call separate into three layers that must never be
//! collapsed into one error kind:
//! - the call could not be meaningfully evaluated ([`LangError`]),
//! - the call ran and the program declared a defined rejection
//!   ([`ContractError`]),
//! - the call ran and produced a value.
//!
//! Transport failures of the connection itself live outside this model, in
//! [`crate::connection::ConnectionError`]: they abort the whole operation
//! before any outcome exists to classify.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire tags for the defined rejection variants.
///
/// Tags outside this range decode to `Custom`, preserving the raw payload
/// instead of discarding it.
const TAG_CUSTOM: u8 = 0;
const TAG_SELF_APPROVE: u8 = 1;
const TAG_NOT_APPROVED: u8 = 2;
const TAG_TOKEN_EXISTS: u8 = 3;
const TAG_TOKEN_NOT_EXISTS: u8 = 4;
const TAG_SAFE_TRANSFER_CHECK_FAILED: u8 = 5;

/// A rejection the program itself declared
///
/// Closed set of defined variants plus the open `Custom` escape variant for
/// program-specific rules the harness has no name for.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ContractError {
    /// Program-specific rejection carried verbatim
    #[error("contract rejected: {0}")]
    Custom(String),

    /// Caller tried to approve themselves as operator
    #[error("self approval is not allowed")]
    SelfApprove,

    /// Caller is not approved to act on the token
    #[error("caller is not approved")]
    NotApproved,

    /// Token already exists
    #[error("token already exists")]
    TokenExists,

    /// Token does not exist
    #[error("token does not exist")]
    TokenNotExists,

    /// Receiver-side transfer check rejected the transfer
    #[error("safe transfer check failed: {0}")]
    SafeTransferCheckFailed(String),
}

impl ContractError {
    /// Encode into the program's stable rejection representation:
    /// a tag byte followed by the UTF-8 payload for the carrying variants.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Custom(msg) => {
                let mut out = vec![TAG_CUSTOM];
                out.extend_from_slice(msg.as_bytes());
                out
            }
            Self::SelfApprove => vec![TAG_SELF_APPROVE],
            Self::NotApproved => vec![TAG_NOT_APPROVED],
            Self::TokenExists => vec![TAG_TOKEN_EXISTS],
            Self::TokenNotExists => vec![TAG_TOKEN_NOT_EXISTS],
            Self::SafeTransferCheckFailed(msg) => {
                let mut out = vec![TAG_SAFE_TRANSFER_CHECK_FAILED];
                out.extend_from_slice(msg.as_bytes());
                out
            }
        }
    }

    /// Decode from the rejection representation.
    ///
    /// Total: unmapped tags fall back to `Custom` carrying the raw payload
    /// (or a hex rendering when the payload is not UTF-8), so no information
    /// is lost on the way through.
    pub fn decode(bytes: &[u8]) -> ContractError {
        let Some((&tag, payload)) = bytes.split_first() else {
            return Self::Custom(String::new());
        };
        match tag {
            TAG_CUSTOM => Self::Custom(Self::payload_text(payload)),
            TAG_SELF_APPROVE => Self::SelfApprove,
            TAG_NOT_APPROVED => Self::NotApproved,
            TAG_TOKEN_EXISTS => Self::TokenExists,
            TAG_TOKEN_NOT_EXISTS => Self::TokenNotExists,
            TAG_SAFE_TRANSFER_CHECK_FAILED => {
                Self::SafeTransferCheckFailed(Self::payload_text(payload))
            }
            unknown => {
                if payload.is_empty() {
                    Self::Custom(format!("unmapped rejection 0x{unknown:02x}"))
                } else {
                    Self::Custom(Self::payload_text(payload))
                }
            }
        }
    }

    fn payload_text(payload: &[u8]) -> String {
        match std::str::from_utf8(payload) {
            Ok(text) => text.to_string(),
            Err(_) => format!("0x{}", hex::encode(payload)),
        }
    }
}

/// Invocation-level failure
///
/// The call reached the execution engine but could not be meaningfully
/// evaluated; opaque to program-defined semantics.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum LangError {
    /// Input or output bytes did not match the ABI
    #[error("codec mismatch against the ABI: {0}")]
    Codec(String),

    /// Execution trapped
    #[error("execution trapped")]
    Trapped,

    /// Execution budget exhausted
    #[error("execution ran out of gas")]
    OutOfGas,

    /// Dispatch failure the harness has no mapping for
    #[error("unrecognized dispatch failure (code {0})")]
    Unknown(u32),
}

impl LangError {
    /// Deterministic mapping from the in-band failure codes the node reports.
    pub fn from_code(code: u32) -> LangError {
        match code {
            1 => Self::Codec("call input could not be read".to_string()),
            2 => Self::Trapped,
            3 => Self::OutOfGas,
            other => Self::Unknown(other),
        }
    }
}

/// Terminal outcome of an evaluated call
///
/// Explicit tagged union over the three shapes a completed call attempt can
/// take; callers must handle all three before extracting a value. The match
/// tells "my call didn't even run" ([`CallOutcome::Invalid`]) apart from "my
/// call ran and the program said no" ([`CallOutcome::Rejected`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome<T> {
    /// Invocation succeeded and produced a value
    Value(T),
    /// Invocation succeeded; the program declared a defined rejection
    Rejected(ContractError),
    /// Invocation could not be meaningfully evaluated
    Invalid(LangError),
}

impl<T> CallOutcome<T> {
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// The produced value, if any
    pub fn value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// The program's rejection, if any
    pub fn rejection(&self) -> Option<&ContractError> {
        match self {
            Self::Rejected(err) => Some(err),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CallOutcome<U> {
        match self {
            Self::Value(v) => CallOutcome::Value(f(v)),
            Self::Rejected(err) => CallOutcome::Rejected(err),
            Self::Invalid(err) => CallOutcome::Invalid(err),
        }
    }

    /// Drop the value, keeping only the shape
    pub fn into_unit(self) -> CallOutcome<()> {
        self.map(|_| ())
    }

    /// Interop with the nested `Result` form of the same three shapes
    pub fn into_nested(self) -> Result<Result<T, ContractError>, LangError> {
        match self {
            Self::Value(v) => Ok(Ok(v)),
            Self::Rejected(err) => Ok(Err(err)),
            Self::Invalid(err) => Err(err),
        }
    }

    pub fn from_nested(nested: Result<Result<T, ContractError>, LangError>) -> CallOutcome<T> {
        match nested {
            Ok(Ok(v)) => Self::Value(v),
            Ok(Err(err)) => Self::Rejected(err),
            Err(err) => Self::Invalid(err),
        }
    }

    /// Category label for logs and assertions
    pub fn category(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::Rejected(_) => "rejected",
            Self::Invalid(_) => "invalid",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_error_display() {
        let err = ContractError::Custom("InsufficientBalance".to_string());
        assert_eq!(err.to_string(), "contract rejected: InsufficientBalance");
        assert_eq!(
            ContractError::SelfApprove.to_string(),
            "self approval is not allowed"
        );
    }

    #[test]
    fn contract_error_round_trips() {
        let variants = [
            ContractError::Custom("x".to_string()),
            ContractError::SelfApprove,
            ContractError::NotApproved,
            ContractError::TokenExists,
            ContractError::TokenNotExists,
            ContractError::SafeTransferCheckFailed("receiver says no".to_string()),
        ];
        for v in variants {
            assert_eq!(ContractError::decode(&v.encode()), v);
        }
    }

    #[test]
    fn unmapped_tag_decodes_to_custom_with_payload() {
        let mut raw = vec![0x2a];
        raw.extend_from_slice(b"NewRuleAddedLater");
        assert_eq!(
            ContractError::decode(&raw),
            ContractError::Custom("NewRuleAddedLater".to_string())
        );
    }

    #[test]
    fn unmapped_tag_without_payload_names_the_tag() {
        match ContractError::decode(&[0x2a]) {
            ContractError::Custom(msg) => assert!(msg.contains("0x2a")),
            other => panic!("expected Custom, got {other:?}"),
        }
    }

    #[test]
    fn lang_error_code_mapping() {
        assert_eq!(LangError::from_code(2), LangError::Trapped);
        assert_eq!(LangError::from_code(3), LangError::OutOfGas);
        assert_eq!(LangError::from_code(99), LangError::Unknown(99));
        assert!(matches!(LangError::from_code(1), LangError::Codec(_)));
    }

    #[test]
    fn outcome_nested_round_trip() {
        let outcomes = [
            CallOutcome::Value(5u32),
            CallOutcome::Rejected(ContractError::NotApproved),
            CallOutcome::Invalid(LangError::Trapped),
        ];
        for outcome in outcomes {
            assert_eq!(
                CallOutcome::from_nested(outcome.clone().into_nested()),
                outcome
            );
        }
    }

    #[test]
    fn outcome_accessors() {
        let value: CallOutcome<u32> = CallOutcome::Value(1);
        assert!(value.is_value());
        assert_eq!(value.category(), "value");
        assert_eq!(value.value(), Some(1));

        let rejected: CallOutcome<u32> = CallOutcome::Rejected(ContractError::TokenExists);
        assert!(rejected.is_rejected());
        assert_eq!(rejected.rejection(), Some(&ContractError::TokenExists));
        assert_eq!(rejected.value(), None);

        let invalid: CallOutcome<u32> = CallOutcome::Invalid(LangError::OutOfGas);
        assert!(invalid.is_invalid());
        assert_eq!(invalid.into_unit(), CallOutcome::Invalid(LangError::OutOfGas));
    }
}
