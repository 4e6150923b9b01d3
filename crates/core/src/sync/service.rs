//! Sync orchestrator.
//!
//! Decides cache vs. provider fetch per calendar, reconciles the cache, and
//! aggregates per-calendar outcomes without letting one failure abort its
//! siblings.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dayline_domain::{
    BulkSyncReport, CalendarFailure, CalendarSource, CalendarSyncOutcome, Event, FeedProbe,
    RangeReadOutcome, Result, SourceKind, TimeWindow,
};
use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use super::ports::{
    CalendarProvider, EventRepository, FeedProber, SourceCatalog, SyncStateRepository,
};

/// Calendar sync orchestrator.
///
/// Generic over the ports; all dependencies are injected so the service can
/// run against in-memory fakes in tests.
pub struct SyncService {
    oauth_provider: Arc<dyn CalendarProvider>,
    feed_provider: Arc<dyn CalendarProvider>,
    feed_prober: Arc<dyn FeedProber>,
    events: Arc<dyn EventRepository>,
    sync_state: Arc<dyn SyncStateRepository>,
    catalog: Arc<dyn SourceCatalog>,
    cache_ttl: Duration,
}

impl SyncService {
    /// Create a new sync service with the default cache TTL.
    pub fn new(
        oauth_provider: Arc<dyn CalendarProvider>,
        feed_provider: Arc<dyn CalendarProvider>,
        feed_prober: Arc<dyn FeedProber>,
        events: Arc<dyn EventRepository>,
        sync_state: Arc<dyn SyncStateRepository>,
        catalog: Arc<dyn SourceCatalog>,
    ) -> Self {
        Self {
            oauth_provider,
            feed_provider,
            feed_prober,
            events,
            sync_state,
            catalog,
            cache_ttl: dayline_domain::constants::cache_ttl(),
        }
    }

    /// Override the cache TTL (tests).
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    fn provider_for(&self, source: &CalendarSource) -> &Arc<dyn CalendarProvider> {
        match source.kind() {
            SourceKind::OAuth => &self.oauth_provider,
            SourceKind::Feed => &self.feed_provider,
        }
    }

    /// Whether a calendar's cache is stale at `now`.
    ///
    /// Absent sync state forces a fetch. A calendar synced exactly
    /// `cache_ttl` ago is still fresh; strictly older is stale.
    fn is_stale(&self, last_sync: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_sync {
            Some(last) => now - last > self.cache_ttl,
            None => true,
        }
    }

    /// Fetch from the provider and reconcile the cache.
    async fn refresh_calendar(
        &self,
        source: &CalendarSource,
        window: &TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let fetched = self.provider_for(source).fetch_events(source, window).await?;
        let count = self.events.upsert_events(&source.id, &fetched).await?;
        self.sync_state.record_sync(&source.id, now).await?;

        debug!(calendar_id = %source.id, count, "calendar refreshed");

        Ok(count)
    }

    /// Sync a single calendar, honoring the staleness check.
    ///
    /// A fresh calendar is left untouched and reported with `fetched: false`.
    #[instrument(skip(self, source), fields(calendar_id = %source.id))]
    pub async fn sync_calendar(
        &self,
        source: &CalendarSource,
        window: &TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<CalendarSyncOutcome> {
        let last_sync = self.sync_state.last_sync(&source.id).await?;

        if !self.is_stale(last_sync, now) {
            debug!(calendar_id = %source.id, "cache fresh, skipping fetch");
            return Ok(CalendarSyncOutcome {
                calendar_id: source.id.clone(),
                events_synced: 0,
                fetched: false,
            });
        }

        let events_synced = self.refresh_calendar(source, window, now).await?;

        Ok(CalendarSyncOutcome { calendar_id: source.id.clone(), events_synced, fetched: true })
    }

    /// Sync all enabled calendars concurrently.
    ///
    /// Each calendar's outcome is collected independently; a failure in one
    /// never cancels or blocks the others. With `force`, the staleness check
    /// is skipped and every calendar is fetched.
    #[instrument(skip(self))]
    pub async fn sync_all(
        &self,
        window: &TimeWindow,
        now: DateTime<Utc>,
        force: bool,
    ) -> Result<BulkSyncReport> {
        let sources = self.catalog.enabled_sources().await?;
        let total_count = sources.len();

        let outcomes = join_all(sources.iter().map(|source| async move {
            let result = if force {
                self.refresh_calendar(source, window, now).await.map(|events_synced| {
                    CalendarSyncOutcome {
                        calendar_id: source.id.clone(),
                        events_synced,
                        fetched: true,
                    }
                })
            } else {
                self.sync_calendar(source, window, now).await
            };
            (source, result)
        }))
        .await;

        let mut success_count = 0;
        let mut error_calendars = Vec::new();

        for (source, result) in outcomes {
            match result {
                Ok(outcome) => {
                    success_count += 1;
                    debug!(
                        calendar_id = %outcome.calendar_id,
                        events_synced = outcome.events_synced,
                        fetched = outcome.fetched,
                        "calendar sync succeeded"
                    );
                }
                Err(error) => {
                    warn!(calendar_id = %source.id, error = %error, "calendar sync failed");
                    error_calendars.push(CalendarFailure {
                        calendar_id: source.id.clone(),
                        name: source.name.clone(),
                        error,
                    });
                }
            }
        }

        info!(success_count, total_count, failed = error_calendars.len(), "bulk sync finished");

        Ok(BulkSyncReport { success_count, total_count, error_calendars })
    }

    /// Read one calendar's events, refreshing first when stale.
    ///
    /// A provider failure falls back to whatever the cache already holds for
    /// the window; the failure is reported alongside the (possibly stale)
    /// data instead of failing the read. When nothing is cached yet, the
    /// calendar contributes an empty list plus its failure entry.
    async fn read_calendar(
        &self,
        source: &CalendarSource,
        window: &TimeWindow,
        now: DateTime<Utc>,
    ) -> (Vec<Event>, Option<DateTime<Utc>>, Option<CalendarFailure>) {
        let failure_for = |error| {
            Some(CalendarFailure {
                calendar_id: source.id.clone(),
                name: source.name.clone(),
                error,
            })
        };

        let last_sync = match self.sync_state.last_sync(&source.id).await {
            Ok(last_sync) => last_sync,
            Err(error) => return (Vec::new(), None, failure_for(error)),
        };

        let mut failure = None;
        let mut effective_last_sync = last_sync;

        if self.is_stale(last_sync, now) {
            match self.refresh_calendar(source, window, now).await {
                Ok(_) => effective_last_sync = Some(now),
                Err(error) => {
                    warn!(
                        calendar_id = %source.id,
                        error = %error,
                        "provider fetch failed, falling back to cache"
                    );
                    failure = failure_for(error);
                }
            }
        }

        match self.events.events_in_window(&source.id, window).await {
            Ok(events) => (events, effective_last_sync, failure),
            // A cache read failure outranks any provider failure: nothing can
            // be returned for this calendar.
            Err(error) => (Vec::new(), effective_last_sync, failure_for(error)),
        }
    }

    /// Read path: merged events for a window across all enabled calendars.
    ///
    /// Per-calendar results are concatenated and sorted by start ascending.
    /// `last_sync` reports the oldest stamp among calendars that have synced,
    /// the most conservative freshness signal for the whole response.
    #[instrument(skip(self))]
    pub async fn events_for_window(
        &self,
        window: &TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<RangeReadOutcome> {
        let sources = self.catalog.enabled_sources().await?;

        let reads = join_all(
            sources.iter().map(|source| self.read_calendar(source, window, now)),
        )
        .await;

        let mut events = Vec::new();
        let mut failures = Vec::new();
        let mut last_sync: Option<DateTime<Utc>> = None;

        for (calendar_events, calendar_last_sync, failure) in reads {
            events.extend(calendar_events);
            failures.extend(failure);
            last_sync = match (last_sync, calendar_last_sync) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
        }

        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

        debug!(events = events.len(), failed = failures.len(), "range read complete");

        Ok(RangeReadOutcome { events, last_sync, failures })
    }

    /// Probe a feed URL before registration.
    pub async fn probe_feed(&self, url: &str) -> Result<FeedProbe> {
        self.feed_prober.probe(url).await
    }

    /// Register a source in the catalog.
    pub async fn register_source(&self, source: CalendarSource) -> Result<()> {
        self.catalog.register(source).await
    }
}
