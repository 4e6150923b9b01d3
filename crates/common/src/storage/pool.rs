//! SQLite connection pool.
//!
//! r2d2-based pooling with WAL and busy-timeout pragmas applied to every
//! connection. Schema migrations are the application layer's responsibility.

use std::path::Path;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::{debug, info, instrument};

use super::error::{StorageError, StorageResult};

/// Pool configuration.
#[derive(Debug, Clone)]
pub struct SqlitePoolConfig {
    /// Maximum number of pooled connections.
    pub max_size: u32,
    /// How long to wait for a free connection.
    pub connection_timeout: Duration,
    /// SQLite busy timeout applied per connection.
    pub busy_timeout: Duration,
}

impl Default for SqlitePoolConfig {
    fn default() -> Self {
        Self {
            max_size: 10,
            connection_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Pooled SQLite database handle.
///
/// Connections come back with WAL mode, foreign keys and a busy timeout
/// already applied.
#[derive(Debug, Clone)]
pub struct SqlitePool {
    pool: Pool<SqliteConnectionManager>,
    config: SqlitePoolConfig,
}

impl SqlitePool {
    /// Create a pool for a database file, creating the file if missing.
    #[instrument(skip_all, fields(db_path = ?path, pool_size = config.max_size))]
    pub fn new(path: &Path, config: SqlitePoolConfig) -> StorageResult<Self> {
        let pool_config = config.clone();
        let manager = SqliteConnectionManager::file(path)
            .with_init(move |conn| apply_connection_pragmas(conn, &pool_config));

        Self::build(manager, config)
    }

    /// Create an in-memory pool sharing one database across connections.
    ///
    /// Test-oriented; uses a single connection so every handle sees the same
    /// data.
    pub fn in_memory(config: SqlitePoolConfig) -> StorageResult<Self> {
        let pool_config = SqlitePoolConfig { max_size: 1, ..config };
        let init_config = pool_config.clone();
        let manager = SqliteConnectionManager::memory()
            .with_init(move |conn| apply_connection_pragmas(conn, &init_config));

        Self::build(manager, pool_config)
    }

    fn build(manager: SqliteConnectionManager, config: SqlitePoolConfig) -> StorageResult<Self> {
        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .map_err(|e| StorageError::Connection(format!("failed to create pool: {e}")))?;

        info!(pool_size = config.max_size, "sqlite pool created");

        Ok(Self { pool, config })
    }

    /// Acquire a connection from the pool.
    pub fn get(&self) -> StorageResult<PooledConnection<SqliteConnectionManager>> {
        match self.pool.get() {
            Ok(conn) => Ok(conn),
            Err(e) => {
                let message = e.to_string();
                if message.to_lowercase().contains("timed out") {
                    Err(StorageError::Timeout(self.config.connection_timeout.as_secs()))
                } else {
                    Err(StorageError::Connection(format!("failed to get connection: {e}")))
                }
            }
        }
    }
}

fn apply_connection_pragmas(
    conn: &mut Connection,
    config: &SqlitePoolConfig,
) -> Result<(), rusqlite::Error> {
    conn.busy_timeout(config.busy_timeout)?;
    // WAL keeps readers unblocked while a sync transaction writes.
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    debug!("connection pragmas applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Unit tests for storage::pool.
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn pool_creates_database_and_serves_connections() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let pool = SqlitePool::new(&db_path, SqlitePoolConfig::default()).unwrap();
        let conn = pool.get().unwrap();

        conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", []).unwrap();
        conn.execute("INSERT INTO t (id) VALUES (1)", []).unwrap();

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0)).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn concurrent_writers_share_the_pool() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = SqlitePool::new(&db_path, SqlitePoolConfig::default()).unwrap();

        {
            let conn = pool.get().unwrap();
            conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, value TEXT)", []).unwrap();
        }

        let mut handles = vec![];
        for i in 0..5 {
            let pool = pool.clone();
            handles.push(std::thread::spawn(move || {
                let conn = pool.get().unwrap();
                conn.execute(
                    "INSERT INTO t (value) VALUES (?1)",
                    [format!("thread_{i}")],
                )
                .unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let conn = pool.get().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0)).unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn in_memory_pool_shares_state_across_handles() {
        let pool = SqlitePool::in_memory(SqlitePoolConfig::default()).unwrap();

        {
            let conn = pool.get().unwrap();
            conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", []).unwrap();
        }

        let conn = pool.get().unwrap();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM sqlite_master WHERE name = 't'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
    }
}
