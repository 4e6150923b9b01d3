//! TOML-backed implementation of the SourceCatalog port.
//!
//! Calendar sources live in a small standalone TOML file so the rest of the
//! configuration stays read-only at runtime. Registration rewrites the file
//! atomically via a temp-and-rename.

use std::path::PathBuf;

use async_trait::async_trait;
use dayline_core::SourceCatalog;
use dayline_domain::{CalendarSource, DaylineError, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SourcesFile {
    #[serde(default)]
    sources: Vec<CalendarSource>,
}

/// File-backed source catalog.
pub struct TomlSourceCatalog {
    path: PathBuf,
    sources: RwLock<Vec<CalendarSource>>,
}

impl TomlSourceCatalog {
    /// Load the catalog, treating a missing file as an empty catalog.
    pub fn load(path: PathBuf) -> Result<Self> {
        let sources = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| DaylineError::Config(format!("failed to read sources file: {e}")))?;
            let file: SourcesFile = toml::from_str(&contents)
                .map_err(|e| DaylineError::Config(format!("invalid sources file: {e}")))?;
            file.sources
        } else {
            Vec::new()
        };

        info!(path = %path.display(), count = sources.len(), "source catalog loaded");

        Ok(Self { path, sources: RwLock::new(sources) })
    }

    /// In-memory catalog for tests; registrations are not persisted to disk.
    pub fn ephemeral(sources: Vec<CalendarSource>) -> Self {
        Self { path: PathBuf::new(), sources: RwLock::new(sources) }
    }

    fn save(&self, sources: &[CalendarSource]) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }

        let file = SourcesFile { sources: sources.to_vec() };
        let contents = toml::to_string_pretty(&file)
            .map_err(|e| DaylineError::Internal(format!("failed to serialize sources: {e}")))?;

        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, contents)
            .map_err(|e| DaylineError::Config(format!("failed to write sources file: {e}")))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| DaylineError::Config(format!("failed to replace sources file: {e}")))?;

        debug!(path = %self.path.display(), "source catalog saved");

        Ok(())
    }
}

#[async_trait]
impl SourceCatalog for TomlSourceCatalog {
    async fn sources(&self) -> Result<Vec<CalendarSource>> {
        Ok(self.sources.read().await.clone())
    }

    async fn register(&self, source: CalendarSource) -> Result<()> {
        let mut guard = self.sources.write().await;

        if guard.iter().any(|existing| existing.id == source.id) {
            return Err(DaylineError::InvalidInput(format!(
                "source {} is already registered",
                source.id
            )));
        }

        guard.push(source);
        self.save(&guard)
    }
}
