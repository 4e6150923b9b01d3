//! Derived timeline structures.
//!
//! Never persisted; recomputed on every render pass relative to a supplied
//! "now".

use serde::{Deserialize, Serialize};

use super::event::Event;

/// Time-relative classification of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Past,
    Current,
    /// The earliest future timed event; exactly one per timeline.
    Next,
    Future,
}

/// An event plus its computed layout slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    #[serde(flatten)]
    pub event: Event,
    /// Display column index within the event's overlap group.
    pub column: usize,
    /// Width the overlap group must reserve; at least `column + 1`.
    pub total_columns: usize,
    pub status: EventStatus,
}

/// Render-ready timeline: all-day lane plus stacked timed events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub all_day: Vec<TimelineEvent>,
    pub timed: Vec<TimelineEvent>,
}
