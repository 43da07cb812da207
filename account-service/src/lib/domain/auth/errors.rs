use thiserror::Error;

use crate::domain::account::errors::AccountIdError;
use crate::domain::account::errors::EmailError;
use crate::domain::errors::RepositoryError;

/// Error for password hashing operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordHashError {
    /// Input rejected before hashing (empty, too long)
    #[error("Password rejected: {0}")]
    InvalidInput(String),

    #[error("Password hashing failed: {0}")]
    Failed(String),
}

/// Error for token generation and validation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token")]
    Invalid,

    #[error("Token signing failed: {0}")]
    SigningFailed(String),
}

/// Top-level error for all authentication use cases
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Input errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Authentication outcomes
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account cannot log in")]
    CannotLogin,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Invalid access token")]
    InvalidAccessToken,

    // Domain-level errors
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Cannot assign role: {0}")]
    CannotAssign(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // Infrastructure errors
    #[error("Storage operation failed")]
    Storage {
        operation: &'static str,
        #[source]
        cause: RepositoryError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<EmailError> for AuthError {
    fn from(err: EmailError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<AccountIdError> for AuthError {
    fn from(err: AccountIdError) -> Self {
        AuthError::Validation(format!("Invalid account ID: {}", err))
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        match err {
            PasswordHashError::InvalidInput(reason) => AuthError::Validation(reason),
            PasswordHashError::Failed(reason) => AuthError::Internal(reason),
        }
    }
}
