//! Error types for the record store.

use thiserror::Error;

use crate::types::EmployeeId;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error from libSQL.
    #[error("database error: {0}")]
    Database(#[from] libsql::Error),

    /// A unique key is already taken.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// An assessment referenced an employee that does not exist.
    #[error("employee not found: {0}")]
    EmployeeNotFound(EmployeeId),

    /// Invalid data in the database.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Classify a libSQL error, lifting unique-constraint violations into
    /// [`Error::DuplicateKey`].
    pub(crate) fn from_insert(err: libsql::Error, key: &str) -> Self {
        if err.to_string().contains("UNIQUE constraint failed") {
            Self::DuplicateKey(key.to_string())
        } else {
            Self::Database(err)
        }
    }
}
