use thiserror::Error;

/// Reasons a session token failed to decode
///
/// Callers treat every variant as "no session"; the variants exist for logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionCodecError {
    #[error("Session token is malformed")]
    Malformed,

    #[error("Session token has invalid encoding")]
    InvalidEncoding,

    #[error("Session token signature mismatch")]
    InvalidSignature,

    #[error("Session payload is invalid: {0}")]
    InvalidPayload(String),

    #[error("Session has expired")]
    Expired,
}
