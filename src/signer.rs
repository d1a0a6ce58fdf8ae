//! Signer management module

use crate::connection::{CallData, SignedSubmission};
use crate::types::AccountId;
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};

/// Thin ed25519 signer
///
/// Key and wallet management proper is out of scope; this wraps one signing
/// key, derives the account id from its verifying key, and signs submission
/// payloads. Test suites get deterministic signers from seed strings.
pub struct Signer {
    key: SigningKey,
}

impl Signer {
    /// Deterministic signer derived from a seed string
    pub fn from_seed(seed: &str) -> Self {
        let digest: [u8; 32] = Sha256::digest(seed.as_bytes()).into();
        Self {
            key: SigningKey::from_bytes(&digest),
        }
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(bytes),
        }
    }

    /// Account id of this signer (the verifying key bytes)
    pub fn account_id(&self) -> AccountId {
        AccountId(self.key.verifying_key().to_bytes())
    }

    /// Sign a call with the given nonce, producing a broadcastable submission
    pub fn sign_submission(&self, call: CallData, nonce: u64) -> SignedSubmission {
        let payload = submission_payload(&call, nonce);
        let signature = self.key.sign(&payload).to_bytes().to_vec();
        SignedSubmission {
            call,
            signer: self.account_id(),
            nonce,
            signature,
        }
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signer({:?})", self.account_id())
    }
}

/// Canonical byte payload a submission signature covers
pub fn submission_payload(call: &CallData, nonce: u64) -> Vec<u8> {
    // Encoding a (call, nonce) tuple binds the signature to the sequence
    // number, so replays with a stale nonce fail verification server-side.
    bincode::serialize(&(call, nonce)).unwrap_or_default()
}

/// Verify a submission signature against the claimed signer account
pub fn verify_submission(submission: &SignedSubmission) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(submission.signer.as_bytes()) else {
        return false;
    };
    let Ok(signature) = ed25519_dalek::Signature::from_slice(&submission.signature) else {
        return false;
    };
    let payload = submission_payload(&submission.call, submission.nonce);
    key.verify_strict(&payload, &signature).is_ok()
}
