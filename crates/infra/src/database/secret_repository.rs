//! Encrypted-at-rest secret store over the `secrets` table.
//!
//! Values are encrypted with AES-256-GCM before they touch the database;
//! only the base64 `nonce || ciphertext || tag` blob is persisted. The key is
//! injected at construction time so tests can run with fixed keys.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dayline_common::crypto::EncryptionService;
use dayline_common::storage::SqlitePool;
use dayline_core::SecretStore;
use dayline_domain::Result;
use rusqlite::{OptionalExtension, ToSql};
use tracing::{debug, instrument};

use crate::errors::InfraError;

/// SQLite implementation of the SecretStore port.
pub struct SqliteSecretStore {
    pool: SqlitePool,
    crypto: Arc<EncryptionService>,
}

impl SqliteSecretStore {
    /// Create a new secret store with the given encryption service.
    #[must_use]
    pub fn new(pool: SqlitePool, crypto: Arc<EncryptionService>) -> Self {
        Self { pool, crypto }
    }
}

#[async_trait]
impl SecretStore for SqliteSecretStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.pool.get().map_err(InfraError::from)?;

        let blob: Option<String> = conn
            .query_row("SELECT blob FROM secrets WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .map_err(InfraError::from)?;

        match blob {
            // A failed decryption must surface as an error, not as "not
            // found": it signals tampering or a rotated key.
            Some(blob) => {
                let plaintext =
                    self.crypto.decrypt_blob_to_string(&blob).map_err(InfraError::from)?;
                Ok(Some(plaintext))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let blob = self.crypto.encrypt_to_blob(value.as_bytes()).map_err(InfraError::from)?;
        let now = Utc::now().timestamp();

        let conn = self.pool.get().map_err(InfraError::from)?;
        conn.execute(
            "INSERT INTO secrets (key, blob, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET blob = excluded.blob,
                                            updated_at = excluded.updated_at",
            [&key as &dyn ToSql, &blob, &now].as_ref(),
        )
        .map_err(InfraError::from)?;

        debug!(key, "secret stored");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<()> {
        let conn = self.pool.get().map_err(InfraError::from)?;
        conn.execute("DELETE FROM secrets WHERE key = ?1", [key]).map_err(InfraError::from)?;
        debug!(key, "secret deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn exists(&self, key: &str) -> Result<bool> {
        let conn = self.pool.get().map_err(InfraError::from)?;

        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM secrets WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .map_err(InfraError::from)?;

        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use dayline_domain::DaylineError;

    use super::*;
    use crate::database::manager::DatabaseManager;

    fn store() -> SqliteSecretStore {
        let manager = DatabaseManager::in_memory().unwrap();
        let crypto = Arc::new(EncryptionService::new(&EncryptionService::generate_key()).unwrap());
        SqliteSecretStore::new(manager.pool(), crypto)
    }

    #[tokio::test]
    async fn set_get_round_trip() {
        let store = store();

        store.set("oauth.tokens.me@example.com", "token-payload").await.unwrap();

        let value = store.get("oauth.tokens.me@example.com").await.unwrap();
        assert_eq!(value, Some("token-payload".to_string()));
        assert!(store.exists("oauth.tokens.me@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = store();
        assert_eq!(store.get("nope").await.unwrap(), None);
        assert!(!store.exists("nope").await.unwrap());
    }

    #[tokio::test]
    async fn set_replaces_existing_value() {
        let store = store();
        store.set("k", "first").await.unwrap();
        store.set("k", "second").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn delete_removes_the_secret() {
        let store = store();
        store.set("k", "value").await.unwrap();
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);

        // Deleting a missing key is not an error.
        store.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn plaintext_never_reaches_the_database() {
        let store = store();
        store.set("k", "super-secret-token").await.unwrap();

        let conn = store.pool.get().unwrap();
        let blob: String =
            conn.query_row("SELECT blob FROM secrets WHERE key = 'k'", [], |row| row.get(0))
                .unwrap();

        assert!(!blob.contains("super-secret-token"));
    }

    #[tokio::test]
    async fn rotated_key_fails_closed_instead_of_returning_garbage() {
        let manager = DatabaseManager::in_memory().unwrap();
        let first = Arc::new(EncryptionService::new(&EncryptionService::generate_key()).unwrap());
        let store = SqliteSecretStore::new(manager.pool(), first);
        store.set("k", "value").await.unwrap();

        let rotated =
            Arc::new(EncryptionService::new(&EncryptionService::generate_key()).unwrap());
        let store = SqliteSecretStore::new(manager.pool(), rotated);

        let result = store.get("k").await;
        assert!(matches!(result, Err(DaylineError::Decryption(_))));
    }
}
