//! In-memory mock providers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dayline_core::sync::ports::{CalendarProvider, FeedProber};
use dayline_domain::{
    CalendarSource, DaylineError, Event, FeedProbe, ProviderCalendar, Result, TimeWindow,
};

/// Mock calendar provider with per-calendar canned responses.
///
/// Calendars without a configured response return an empty event list.
#[derive(Default)]
pub struct MockProvider {
    responses: Mutex<HashMap<String, std::result::Result<Vec<Event>, DaylineError>>>,
    fetch_count: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Configure the events returned for one calendar.
    pub fn with_events(&self, calendar_id: &str, events: Vec<Event>) -> &Self {
        self.responses.lock().unwrap().insert(calendar_id.to_string(), Ok(events));
        self
    }

    /// Configure a failure for one calendar.
    pub fn with_failure(&self, calendar_id: &str, error: DaylineError) -> &Self {
        self.responses.lock().unwrap().insert(calendar_id.to_string(), Err(error));
        self
    }

    /// Number of fetch_events calls across all calendars.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CalendarProvider for MockProvider {
    async fn list_calendars(&self, _source: &CalendarSource) -> Result<Vec<ProviderCalendar>> {
        Ok(Vec::new())
    }

    async fn fetch_events(
        &self,
        source: &CalendarSource,
        window: &TimeWindow,
    ) -> Result<Vec<Event>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        match self.responses.lock().unwrap().get(&source.id) {
            Some(Ok(events)) => Ok(events
                .iter()
                .filter(|e| window.intersects(e.start, e.end))
                .cloned()
                .collect()),
            Some(Err(error)) => Err(error.clone()),
            None => Ok(Vec::new()),
        }
    }
}

/// Mock feed prober returning a fixed probe result.
pub struct MockProber {
    pub probe: FeedProbe,
}

impl MockProber {
    pub fn new(name: &str, event_count: usize) -> Arc<Self> {
        Arc::new(Self { probe: FeedProbe { name: name.to_string(), event_count } })
    }
}

#[async_trait]
impl FeedProber for MockProber {
    async fn probe(&self, _url: &str) -> Result<FeedProbe> {
        Ok(self.probe.clone())
    }
}
