//! Application configuration and the source catalog.

pub mod catalog;
pub mod loader;

pub use catalog::TomlSourceCatalog;
pub use loader::{AppConfig, DatabaseConfig, OAuthClientConfig, ServerConfig};
