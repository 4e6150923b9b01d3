//! Port interfaces implemented by the infrastructure layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dayline_domain::{
    CalendarSource, Event, FeedProbe, ProviderCalendar, Result, TimeWindow,
};

/// Trait for calendar provider operations.
///
/// One implementation exists per source kind: an OAuth-backed API client and
/// a read-only ICS feed fetcher.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// List the calendars this provider can see for the given source.
    async fn list_calendars(&self, source: &CalendarSource) -> Result<Vec<ProviderCalendar>>;

    /// Fetch events for the source that intersect the window.
    async fn fetch_events(&self, source: &CalendarSource, window: &TimeWindow)
        -> Result<Vec<Event>>;
}

/// Cached event storage keyed by `(event id, calendar id)`.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Replace a calendar's events wholesale via upsert.
    ///
    /// The whole batch must be applied in one atomic transaction.
    async fn upsert_events(&self, calendar_id: &str, events: &[Event]) -> Result<usize>;

    /// Events for one calendar intersecting the window, sorted by start.
    async fn events_in_window(&self, calendar_id: &str, window: &TimeWindow)
        -> Result<Vec<Event>>;

    /// Remove all cached events for a calendar (source removal).
    async fn delete_for_calendar(&self, calendar_id: &str) -> Result<usize>;
}

/// Per-calendar last-successful-sync bookkeeping.
#[async_trait]
pub trait SyncStateRepository: Send + Sync {
    /// Last successful sync instant, or `None` if never synced.
    async fn last_sync(&self, calendar_id: &str) -> Result<Option<DateTime<Utc>>>;

    /// Record a successful sync. Overwrites any previous row.
    async fn record_sync(&self, calendar_id: &str, at: DateTime<Utc>) -> Result<()>;
}

/// Encrypted-at-rest storage for small secrets (tokens, API keys).
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch and decrypt a secret.
    ///
    /// `Ok(None)` means no such secret; a decryption failure is an error,
    /// never `None`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Encrypt and store a secret, replacing any existing value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a secret. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Whether a secret exists, without decrypting it.
    async fn exists(&self, key: &str) -> Result<bool>;
}

/// Read access to the configured calendar sources.
///
/// Configuration storage itself is an external collaborator; the engine only
/// needs to enumerate sources and register newly discovered ones.
#[async_trait]
pub trait SourceCatalog: Send + Sync {
    /// All configured sources, enabled or not.
    async fn sources(&self) -> Result<Vec<CalendarSource>>;

    /// Enabled sources only.
    async fn enabled_sources(&self) -> Result<Vec<CalendarSource>> {
        Ok(self.sources().await?.into_iter().filter(|s| s.enabled).collect())
    }

    /// Persist a newly registered source.
    async fn register(&self, source: CalendarSource) -> Result<()>;
}

/// Probe support for feed registration.
///
/// Implemented by the feed provider; separated from [`CalendarProvider`]
/// because probing happens before a source exists.
#[async_trait]
pub trait FeedProber: Send + Sync {
    /// Fetch and parse the document at `url`, returning its default display
    /// name and event count.
    async fn probe(&self, url: &str) -> Result<FeedProbe>;
}
