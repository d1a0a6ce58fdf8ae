use thiserror::Error;

/// Connection-layer failures
///
/// Everything here aborts an operation before a call outcome exists to
/// classify: the program under call never ran, or its result never reached
/// us. Business rejections and invocation failures live in
/// [`crate::errors`] instead and are never folded into this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// Network/RPC unreachable or the node rejected the request outright
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Request/response bytes could not be encoded or decoded
    #[error("codec error: {0}")]
    Codec(String),

    /// Wait-for-inclusion timed out; reported, never retried automatically
    #[error("timeout after {timeout_ms}ms waiting for {waiting_for}")]
    Timeout { waiting_for: String, timeout_ms: u64 },

    /// The network refused to include a broadcast submission (stale nonce,
    /// bad signature, insufficient fee balance). Distinct from a contract
    /// rejection: the program never ran.
    #[error("inclusion rejected: {reason}")]
    InclusionRejected { reason: String },
}

impl ConnectionError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// The harness itself never retries; callers drive retries and use this
    /// to decide.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Timeout { .. } => true,
            Self::Codec(_) => false,
            Self::InclusionRejected { .. } => false,
        }
    }

    /// Error category for logs and assertions
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Codec(_) => "codec",
            Self::Timeout { .. } => "timeout",
            Self::InclusionRejected { .. } => "inclusion",
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn inclusion_rejected(reason: impl Into<String>) -> Self {
        Self::InclusionRejected {
            reason: reason.into(),
        }
    }
}
