//! SQLite-backed implementations of the storage ports.

pub mod event_repository;
pub mod manager;
pub mod secret_repository;
pub mod sync_state_repository;

pub use event_repository::SqliteEventRepository;
pub use manager::DatabaseManager;
pub use secret_repository::SqliteSecretStore;
pub use sync_state_repository::SqliteSyncStateRepository;
