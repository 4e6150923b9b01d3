//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Dayline
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum DaylineError {
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    #[error("Authentication expired for {account}")]
    AuthExpired { account: String },

    #[error("Provider API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Encryption key error: {0}")]
    CryptoKey(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DaylineError {
    /// Stable message suitable for end-user display.
    ///
    /// Keeps provider/library detail out of UI surfaces; the full error is
    /// still available through `Display` for logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired(_) => "This calendar account needs to be connected.".to_string(),
            Self::AuthExpired { account } => {
                format!("Access to {account} has expired. Please reconnect the account.")
            }
            Self::Api { status, .. } => {
                format!("The calendar provider returned an error (HTTP {status}).")
            }
            Self::Network(_) => "Could not reach the calendar provider.".to_string(),
            Self::Parse(_) => "The calendar data could not be read.".to_string(),
            Self::NotFound(_) => "The requested item was not found.".to_string(),
            Self::InvalidUrl(_) => "That does not look like a valid calendar URL.".to_string(),
            Self::CryptoKey(_) | Self::Encryption(_) | Self::Decryption(_) => {
                "Stored credentials could not be unlocked.".to_string()
            }
            Self::Database(_) => "Local storage is unavailable.".to_string(),
            Self::Config(_) => "The application is not configured correctly.".to_string(),
            Self::InvalidInput(_) => "The request was invalid.".to_string(),
            Self::Internal(_) => "Something went wrong.".to_string(),
        }
    }

    /// Stable label for structured logging and metrics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::AuthRequired(_) => "auth_required",
            Self::AuthExpired { .. } => "auth_expired",
            Self::Api { .. } => "api",
            Self::Network(_) => "network",
            Self::Parse(_) => "parse",
            Self::NotFound(_) => "not_found",
            Self::InvalidUrl(_) => "invalid_url",
            Self::CryptoKey(_) => "crypto_key",
            Self::Encryption(_) => "encryption",
            Self::Decryption(_) => "decryption",
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for Dayline operations
pub type Result<T> = std::result::Result<T, DaylineError>;
