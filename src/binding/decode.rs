//! Raw-outcome decoding
//!
//! Maps what the node hands back for a call attempt onto the three-layer
//! outcome model. The policy, in order:
//!
//! - engine-level aborts (trap, out-of-gas) become [`LangError`], never
//!   interpreted as business errors;
//! - return bytes that do not parse against the ABI become
//!   [`LangError::Codec`];
//! - a flagged rejection maps deterministically onto a [`ContractError`]
//!   variant, unknown tags falling back to `Custom` with the raw payload;
//! - anything else decodes as the value.

use crate::connection::{RawCallOutcome, VmFailure};
use crate::errors::{CallOutcome, ContractError, LangError};
use serde::de::DeserializeOwned;

/// Return-byte flags the program prefixes its output with
const FLAG_VALUE: u8 = 0;
const FLAG_CONTRACT_ERROR: u8 = 1;
const FLAG_LANG_ERROR: u8 = 2;

/// Decode a raw call outcome into the layered model
pub fn decode_outcome<T: DeserializeOwned>(raw: &RawCallOutcome) -> CallOutcome<T> {
    match &raw.exec {
        Err(VmFailure::Trapped) => CallOutcome::Invalid(LangError::Trapped),
        Err(VmFailure::OutOfGas) => CallOutcome::Invalid(LangError::OutOfGas),
        Ok(bytes) => decode_return_bytes(bytes),
    }
}

/// Decode flag-prefixed return bytes
pub fn decode_return_bytes<T: DeserializeOwned>(bytes: &[u8]) -> CallOutcome<T> {
    let Some((&flag, rest)) = bytes.split_first() else {
        return CallOutcome::Invalid(LangError::Codec("empty return data".to_string()));
    };
    match flag {
        FLAG_VALUE => match bincode::deserialize(rest) {
            Ok(value) => CallOutcome::Value(value),
            Err(e) => CallOutcome::Invalid(LangError::Codec(format!("return value: {e}"))),
        },
        FLAG_CONTRACT_ERROR => CallOutcome::Rejected(ContractError::decode(rest)),
        FLAG_LANG_ERROR => {
            let mut code_bytes = [0u8; 4];
            if rest.len() != 4 {
                return CallOutcome::Invalid(LangError::Codec(
                    "malformed dispatch failure code".to_string(),
                ));
            }
            code_bytes.copy_from_slice(rest);
            CallOutcome::Invalid(LangError::from_code(u32::from_le_bytes(code_bytes)))
        }
        other => CallOutcome::Invalid(LangError::Codec(format!(
            "unrecognized return flag 0x{other:02x}"
        ))),
    }
}

/// Encode a value the way the program returns it; the inverse of
/// [`decode_return_bytes`] for the success shape
pub fn encode_value<T: serde::Serialize>(value: &T) -> Vec<u8> {
    let mut out = vec![FLAG_VALUE];
    out.extend(bincode::serialize(value).unwrap_or_default());
    out
}

/// Encode a defined rejection as return bytes
pub fn encode_rejection(err: &ContractError) -> Vec<u8> {
    let mut out = vec![FLAG_CONTRACT_ERROR];
    out.extend(err.encode());
    out
}

/// Encode an in-band dispatch failure code as return bytes
pub fn encode_lang_failure(code: u32) -> Vec<u8> {
    let mut out = vec![FLAG_LANG_ERROR];
    out.extend(code.to_le_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(bytes: Vec<u8>) -> RawCallOutcome {
        RawCallOutcome {
            exec: Ok(bytes),
            gas_consumed: 0,
        }
    }

    #[test]
    fn engine_aborts_become_lang_errors() {
        let trapped = RawCallOutcome {
            exec: Err(VmFailure::Trapped),
            gas_consumed: 7,
        };
        assert_eq!(
            decode_outcome::<u64>(&trapped),
            CallOutcome::Invalid(LangError::Trapped)
        );

        let exhausted = RawCallOutcome {
            exec: Err(VmFailure::OutOfGas),
            gas_consumed: 7,
        };
        assert_eq!(
            decode_outcome::<u64>(&exhausted),
            CallOutcome::Invalid(LangError::OutOfGas)
        );
    }

    #[test]
    fn value_round_trips() {
        let raw = completed(encode_value(&42u64));
        assert_eq!(decode_outcome::<u64>(&raw), CallOutcome::Value(42));
    }

    #[test]
    fn rejection_round_trips() {
        let raw = completed(encode_rejection(&ContractError::NotApproved));
        assert_eq!(
            decode_outcome::<u64>(&raw),
            CallOutcome::Rejected(ContractError::NotApproved)
        );
    }

    #[test]
    fn in_band_failure_codes_map_deterministically() {
        let raw = completed(encode_lang_failure(3));
        assert_eq!(
            decode_outcome::<u64>(&raw),
            CallOutcome::Invalid(LangError::OutOfGas)
        );

        let raw = completed(encode_lang_failure(500));
        assert_eq!(
            decode_outcome::<u64>(&raw),
            CallOutcome::Invalid(LangError::Unknown(500))
        );
    }

    #[test]
    fn garbage_is_a_codec_error_not_a_rejection() {
        let raw = completed(vec![0x77, 1, 2, 3]);
        match decode_outcome::<u64>(&raw) {
            CallOutcome::Invalid(LangError::Codec(msg)) => assert!(msg.contains("0x77")),
            other => panic!("expected codec error, got {other:?}"),
        }

        let raw = completed(vec![]);
        assert!(matches!(
            decode_outcome::<u64>(&raw),
            CallOutcome::Invalid(LangError::Codec(_))
        ));
    }

    #[test]
    fn undecodable_value_bytes_are_a_codec_error() {
        // A u64 needs 8 bytes; hand it 2
        let raw = completed(vec![FLAG_VALUE, 1, 2]);
        assert!(matches!(
            decode_outcome::<u64>(&raw),
            CallOutcome::Invalid(LangError::Codec(_))
        ));
    }
}
