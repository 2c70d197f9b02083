//! Server error types

use thiserror::Error;
use wellmind_core::storage;

/// Errors that can occur while setting up or running the server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Record store could not be opened
    #[error("store error: {0}")]
    Store(#[from] storage::Error),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}
