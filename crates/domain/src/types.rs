//! Domain data types.
//!
//! Split by concern: calendar sources, cached events, sync bookkeeping, and
//! derived timeline structures.

pub mod calendar;
pub mod event;
pub mod sync;
pub mod timeline;

pub use calendar::{CalendarSource, FeedProbe, ProviderCalendar, SourceDetail, SourceKind};
pub use event::{Event, EventSource, TimeWindow};
pub use sync::{BulkSyncReport, CalendarFailure, CalendarSyncOutcome, RangeReadOutcome, SyncState};
pub use timeline::{EventStatus, Timeline, TimelineEvent};
