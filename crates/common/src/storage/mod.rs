//! SQLite connection pooling.

pub mod error;
pub mod pool;

pub use error::{StorageError, StorageResult};
pub use pool::{SqlitePool, SqlitePoolConfig};
