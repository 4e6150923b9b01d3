//! SQLite-backed implementation of the SyncStateRepository port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dayline_common::storage::SqlitePool;
use dayline_core::SyncStateRepository;
use dayline_domain::Result;
use rusqlite::{OptionalExtension, ToSql};
use tracing::{debug, instrument};

use crate::errors::InfraError;

/// SQLite implementation of SyncStateRepository.
///
/// One row per calendar id, overwritten on every successful sync.
pub struct SqliteSyncStateRepository {
    pool: SqlitePool,
}

impl SqliteSyncStateRepository {
    /// Create a new sync state repository.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SyncStateRepository for SqliteSyncStateRepository {
    #[instrument(skip(self))]
    async fn last_sync(&self, calendar_id: &str) -> Result<Option<DateTime<Utc>>> {
        let conn = self.pool.get().map_err(InfraError::from)?;

        let epoch: Option<i64> = conn
            .query_row(
                "SELECT last_sync_epoch FROM sync_state WHERE calendar_id = ?1",
                [calendar_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(InfraError::from)?;

        Ok(epoch.and_then(|ts| DateTime::from_timestamp(ts, 0)))
    }

    #[instrument(skip(self))]
    async fn record_sync(&self, calendar_id: &str, at: DateTime<Utc>) -> Result<()> {
        let conn = self.pool.get().map_err(InfraError::from)?;

        conn.execute(
            "INSERT INTO sync_state (calendar_id, last_sync_epoch) VALUES (?1, ?2)
             ON CONFLICT(calendar_id) DO UPDATE SET last_sync_epoch = excluded.last_sync_epoch",
            [&calendar_id as &dyn ToSql, &at.timestamp()].as_ref(),
        )
        .map_err(InfraError::from)?;

        debug!(calendar_id, "recorded sync stamp");

        Ok(())
    }
}
