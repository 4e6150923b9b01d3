//! Database lifecycle: pool construction and schema migrations.

use std::path::Path;

use dayline_common::storage::{SqlitePool, SqlitePoolConfig};
use dayline_domain::Result;
use tracing::{info, instrument};

use crate::errors::InfraError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS events (
    id TEXT NOT NULL,
    calendar_id TEXT NOT NULL,
    title TEXT NOT NULL,
    start_ts INTEGER NOT NULL,
    end_ts INTEGER NOT NULL,
    all_day INTEGER NOT NULL DEFAULT 0,
    location TEXT,
    description TEXT,
    source_kind TEXT NOT NULL,
    calendar_name TEXT NOT NULL,
    account TEXT,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (id, calendar_id)
);

CREATE INDEX IF NOT EXISTS idx_events_window
    ON events (calendar_id, start_ts, end_ts);

CREATE TABLE IF NOT EXISTS sync_state (
    calendar_id TEXT PRIMARY KEY,
    last_sync_epoch INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS secrets (
    key TEXT PRIMARY KEY,
    blob TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
";

/// Owns the connection pool and keeps the schema current.
#[derive(Debug, Clone)]
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    /// Open (or create) the database file and run migrations.
    #[instrument(skip(config))]
    pub fn new(path: &Path, config: SqlitePoolConfig) -> Result<Self> {
        let pool = SqlitePool::new(path, config).map_err(InfraError::from)?;
        let manager = Self { pool };
        manager.migrate()?;
        Ok(manager)
    }

    /// In-memory database for tests.
    pub fn in_memory() -> Result<Self> {
        let pool =
            SqlitePool::in_memory(SqlitePoolConfig::default()).map_err(InfraError::from)?;
        let manager = Self { pool };
        manager.migrate()?;
        Ok(manager)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.pool.get().map_err(InfraError::from)?;
        conn.execute_batch(SCHEMA).map_err(InfraError::from)?;
        info!("database schema up to date");
        Ok(())
    }

    /// Handle to the underlying pool.
    #[must_use]
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }
}
