use thiserror::Error;

/// Error surfaced by persistence adapters.
///
/// Shared by every repository port so adapters report failures the same way
/// regardless of the aggregate they store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Stored record is invalid: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(String),
}
