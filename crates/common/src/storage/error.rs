//! Storage error types.

use thiserror::Error;

/// Errors produced by the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection could not be established or acquired.
    #[error("connection error: {0}")]
    Connection(String),

    /// Connection acquisition timed out.
    #[error("connection timeout after {0}s")]
    Timeout(u64),

    /// Query execution failed.
    #[error("query error: {0}")]
    Query(String),

    /// Invalid pool configuration.
    #[error("invalid storage configuration: {0}")]
    InvalidConfig(String),

    /// Underlying rusqlite error.
    #[error(transparent)]
    Rusqlite(#[from] rusqlite::Error),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
