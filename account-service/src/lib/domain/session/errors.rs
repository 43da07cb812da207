use thiserror::Error;

/// Error for SessionId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for refresh session state transitions
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session lifetime must be positive")]
    NonPositiveTtl,

    #[error("Session is already revoked")]
    AlreadyRevoked,
}
