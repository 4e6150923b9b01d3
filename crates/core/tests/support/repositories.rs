//! In-memory mock repository implementations.
//!
//! Deterministic stand-ins for the storage ports, enabling sync service
//! tests without database dependencies.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dayline_core::sync::ports::{EventRepository, SourceCatalog, SyncStateRepository};
use dayline_domain::{CalendarSource, Event, Result, TimeWindow};

/// In-memory mock for `EventRepository`.
///
/// Events are keyed by `(calendar id, event id)` like the real table.
#[derive(Default)]
pub struct MockEventRepository {
    events: Mutex<HashMap<String, BTreeMap<String, Event>>>,
}

impl MockEventRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Seed the cache outside of a sync cycle.
    pub fn with_cached(&self, events: Vec<Event>) -> &Self {
        let mut guard = self.events.lock().unwrap();
        for event in events {
            guard
                .entry(event.calendar_id.clone())
                .or_default()
                .insert(event.id.clone(), event);
        }
        self
    }

    /// Snapshot of one calendar's cached events, sorted by event id.
    pub fn cached(&self, calendar_id: &str) -> Vec<Event> {
        self.events
            .lock()
            .unwrap()
            .get(calendar_id)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventRepository for MockEventRepository {
    async fn upsert_events(&self, calendar_id: &str, events: &[Event]) -> Result<usize> {
        let mut guard = self.events.lock().unwrap();
        let calendar = guard.entry(calendar_id.to_string()).or_default();
        for event in events {
            calendar.insert(event.id.clone(), event.clone());
        }
        Ok(events.len())
    }

    async fn events_in_window(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = self
            .events
            .lock()
            .unwrap()
            .get(calendar_id)
            .map(|m| {
                m.values()
                    .filter(|e| window.intersects(e.start, e.end))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        events.sort_by(|a, b| a.start.cmp(&b.start));
        Ok(events)
    }

    async fn delete_for_calendar(&self, calendar_id: &str) -> Result<usize> {
        let removed = self
            .events
            .lock()
            .unwrap()
            .remove(calendar_id)
            .map(|m| m.len())
            .unwrap_or_default();
        Ok(removed)
    }
}

/// In-memory mock for `SyncStateRepository`.
#[derive(Default)]
pub struct MockSyncStateRepository {
    state: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl MockSyncStateRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Seed a last-sync stamp.
    pub fn with_last_sync(&self, calendar_id: &str, at: DateTime<Utc>) -> &Self {
        self.state.lock().unwrap().insert(calendar_id.to_string(), at);
        self
    }
}

#[async_trait]
impl SyncStateRepository for MockSyncStateRepository {
    async fn last_sync(&self, calendar_id: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.state.lock().unwrap().get(calendar_id).copied())
    }

    async fn record_sync(&self, calendar_id: &str, at: DateTime<Utc>) -> Result<()> {
        self.state.lock().unwrap().insert(calendar_id.to_string(), at);
        Ok(())
    }
}

/// In-memory mock for `SourceCatalog`.
#[derive(Default)]
pub struct MockCatalog {
    sources: Mutex<Vec<CalendarSource>>,
}

impl MockCatalog {
    pub fn new(sources: Vec<CalendarSource>) -> Arc<Self> {
        Arc::new(Self { sources: Mutex::new(sources) })
    }
}

#[async_trait]
impl SourceCatalog for MockCatalog {
    async fn sources(&self) -> Result<Vec<CalendarSource>> {
        Ok(self.sources.lock().unwrap().clone())
    }

    async fn register(&self, source: CalendarSource) -> Result<()> {
        self.sources.lock().unwrap().push(source);
        Ok(())
    }
}
