use thiserror::Error;

/// Error type for JWT operations.
///
/// Variants are detailed for server-side diagnostics. Callers facing clients
/// collapse them into a single invalid-token outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Failed to decode token: {0}")]
    DecodingFailed(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token issued in the future")]
    IssuedInFuture,

    #[error("Token signature does not match")]
    InvalidSignature,

    #[error("Token algorithm not allowed")]
    AlgorithmNotAllowed,

    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    #[error("Unexpected token type")]
    WrongTokenType,
}
