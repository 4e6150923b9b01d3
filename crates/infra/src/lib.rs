//! # Dayline Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Database implementations (SQLite repositories, encrypted secret store)
//! - HTTP client implementation
//! - External service integrations (OAuth calendar provider, ICS feeds)
//! - Configuration loading and the source catalog
//! - Background sync scheduling
//!
//! ## Architecture
//! - Implements traits defined in `dayline-core`
//! - Depends on `dayline-common`, `dayline-domain` and `dayline-core`
//! - Contains all "impure" code (I/O, network, clock)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod scheduling;

// Re-export commonly used items
pub use database::{
    DatabaseManager, SqliteEventRepository, SqliteSecretStore, SqliteSyncStateRepository,
};
pub use errors::InfraError;
pub use integrations::calendar::oauth::{AccountManager, AuthorizationRequest, OAuthSettings};
pub use integrations::calendar::providers::{FeedCalendarProvider, GoogleCalendarProvider};
