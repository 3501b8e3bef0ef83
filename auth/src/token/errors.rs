use thiserror::Error;

/// Error type for token operations.
///
/// `Expired`, `BadSignature`, and `Malformed` are the three distinct
/// verification outcomes; an expired token must never surface as a
/// signature mismatch.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token signature is invalid")]
    BadSignature,

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Serialized claims exceed {limit} bytes (got {actual})")]
    ClaimsTooLarge { limit: usize, actual: usize },
}
