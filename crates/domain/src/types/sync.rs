//! Sync bookkeeping types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::Event;
use crate::errors::DaylineError;

/// Per-calendar last-successful-sync marker.
///
/// One row per calendar id; an absent row means the calendar has never been
/// synced and forces a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub calendar_id: String,
    pub last_sync: DateTime<Utc>,
}

/// A per-calendar failure surfaced alongside (possibly stale) data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarFailure {
    pub calendar_id: String,
    pub name: String,
    pub error: DaylineError,
}

/// Outcome of syncing a single calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSyncOutcome {
    pub calendar_id: String,
    /// Number of events written to the cache.
    pub events_synced: usize,
    /// False when the cache was fresh and no provider call was made.
    pub fetched: bool,
}

/// Aggregate result of a bulk sync across all enabled calendars.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSyncReport {
    pub success_count: usize,
    pub total_count: usize,
    pub error_calendars: Vec<CalendarFailure>,
}

/// Result of the read path: merged events plus per-calendar failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeReadOutcome {
    /// Events across all enabled calendars, sorted by start ascending.
    pub events: Vec<Event>,
    /// Oldest last-sync stamp among the calendars read, if any have synced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
    /// Calendars whose provider fetch failed; their cached events (possibly
    /// stale or empty) are still included in `events`.
    pub failures: Vec<CalendarFailure>,
}
