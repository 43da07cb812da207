use thiserror::Error;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email is required")]
    Empty,

    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for role assignment and parsing
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role '{0}' (expected 'user' or 'admin')")]
    InvalidValue(String),
}

/// Error for account construction and lifecycle transitions
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Password hash is required")]
    MissingPasswordHash,

    #[error("Unknown account status '{0}'")]
    InvalidStatus(String),

    #[error("Account is deleted")]
    Deleted,
}
