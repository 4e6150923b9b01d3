//! Shared test support for core service tests.

pub mod providers;
pub mod repositories;

use chrono::{DateTime, TimeZone, Utc};
use dayline_domain::{CalendarSource, Event, EventSource, SourceDetail, SourceKind};

/// Fixed reference instant used across tests.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).single().unwrap()
}

/// Build a timed event owned by `calendar_id`.
pub fn event(calendar_id: &str, id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
    Event {
        id: id.to_string(),
        calendar_id: calendar_id.to_string(),
        title: format!("event {id}"),
        start,
        end,
        all_day: false,
        location: None,
        description: None,
        source: EventSource {
            kind: SourceKind::Feed,
            calendar_name: calendar_id.to_string(),
            account: None,
        },
    }
}

/// Build an enabled feed source.
pub fn feed_source(id: &str) -> CalendarSource {
    CalendarSource {
        id: id.to_string(),
        name: format!("calendar {id}"),
        enabled: true,
        color: None,
        detail: SourceDetail::Feed { url: format!("https://example.com/{id}.ics") },
    }
}
