//! Cached calendar events and time windows.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::calendar::SourceKind;

/// Where an event came from, denormalized for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    /// Source kind (`oauth` or `feed`).
    pub kind: SourceKind,
    /// Display name of the owning calendar.
    pub calendar_name: String,
    /// Account identity for OAuth-backed events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

/// A calendar event as cached locally.
///
/// Immutable once constructed; sync replaces events wholesale via upsert.
/// Timestamps serialize as ISO-8601 (chrono's serde default for UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Provider-scoped event id.
    pub id: String,
    /// Id of the owning calendar source.
    pub calendar_id: String,
    /// Event title.
    pub title: String,
    /// Start instant (UTC). Invariant: `start <= end`.
    pub start: DateTime<Utc>,
    /// End instant (UTC).
    pub end: DateTime<Utc>,
    /// Whether this is an all-day event.
    pub all_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Denormalized source descriptor.
    pub source: EventSource,
}

impl Event {
    /// Event duration. Zero-length events are legal.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Inclusive time window used for range queries and provider fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Construct a window, normalizing a reversed pair.
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// Midnight-to-midnight window for the day containing `now`.
    #[must_use]
    pub fn today(now: DateTime<Utc>) -> Self {
        let start = midnight_of(now);
        Self { start, end: start + Duration::days(1) }
    }

    /// Seven-day window starting at the day containing `now`.
    #[must_use]
    pub fn week(now: DateTime<Utc>) -> Self {
        let start = midnight_of(now);
        Self { start, end: start + Duration::days(7) }
    }

    /// Whether an event interval intersects this window.
    ///
    /// An event is outside the window only if it ends before the window start
    /// or starts after the window end.
    #[must_use]
    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        !(end < self.start || start > self.end)
    }
}

fn midnight_of(now: DateTime<Utc>) -> DateTime<Utc> {
    // Midnight always exists for a UTC date; fall back to `now` to keep the
    // function total.
    now.date_naive().and_hms_opt(0, 0, 0).map_or(now, |dt| dt.and_utc())
}
