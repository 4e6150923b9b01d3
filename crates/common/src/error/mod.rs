//! Common error types shared by the utility modules.

use thiserror::Error;

/// Errors produced by the utility modules in this crate.
///
/// Module-specific errors (e.g. [`crate::storage::StorageError`]) compose
/// with this type rather than duplicating its variants.
#[derive(Debug, Error)]
pub enum CommonError {
    /// Cryptographic key is missing or malformed.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed (tag verification or malformed payload).
    ///
    /// Callers must treat this as a distinct condition from "not found":
    /// it signals possible tampering or a rotated key.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Random generation or encoding failure.
    #[error("crypto failure: {0}")]
    Crypto(String),

    /// Serialization failure.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CommonError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for common utilities.
pub type CommonResult<T> = std::result::Result<T, CommonError>;
