//! Greedy interval layout and time-relative status classification.

use chrono::{DateTime, Utc};
use dayline_domain::{Event, EventStatus, Timeline, TimelineEvent};

/// Whether two timed events overlap.
///
/// Touching boundaries (one ends exactly when the other starts) do not count
/// as overlap.
#[must_use]
pub fn overlaps(a: &Event, b: &Event) -> bool {
    a.start < b.end && b.start < a.end
}

/// Assign display columns via greedy interval coloring.
///
/// `events` must be sorted by start ascending. Per column we track the end
/// time of its current occupant; each event reuses the lowest-numbered column
/// that has ended by its start, or opens a new one. This uses the minimum
/// number of columns for any overlap clique, in O(n·k) for k open columns.
fn assign_columns(events: &[Event]) -> Vec<usize> {
    let mut column_ends: Vec<DateTime<Utc>> = Vec::new();
    let mut columns = Vec::with_capacity(events.len());

    for event in events {
        let slot = column_ends.iter().position(|end| *end <= event.start);
        match slot {
            Some(column) => {
                column_ends[column] = event.end;
                columns.push(column);
            }
            None => {
                column_ends.push(event.end);
                columns.push(column_ends.len() - 1);
            }
        }
    }

    columns
}

/// Width each event's overlap group must reserve.
///
/// For every event: 1 + the maximum column index among all events that
/// pairwise overlap it (including itself). Distinct from the event's own
/// column index.
fn total_columns(events: &[Event], columns: &[usize]) -> Vec<usize> {
    events
        .iter()
        .enumerate()
        .map(|(i, event)| {
            let max_column = events
                .iter()
                .enumerate()
                .filter(|(j, other)| i == *j || overlaps(event, other))
                .map(|(j, _)| columns[j])
                .max()
                .unwrap_or(0);
            max_column + 1
        })
        .collect()
}

/// Classify an event relative to `now`, without `Next` promotion.
fn base_status(event: &Event, now: DateTime<Utc>) -> EventStatus {
    if event.end <= now {
        EventStatus::Past
    } else if event.start <= now {
        EventStatus::Current
    } else {
        EventStatus::Future
    }
}

/// Build the render-ready timeline for a flat event list.
///
/// Events are partitioned into all-day and timed; timed events get stacked
/// columns and, among future events, exactly the earliest is promoted to
/// `Next`. All-day events keep column 0 / width 1 and never become `Next`.
#[must_use]
pub fn build_timeline(events: Vec<Event>, now: DateTime<Utc>) -> Timeline {
    let (all_day, mut timed): (Vec<Event>, Vec<Event>) =
        events.into_iter().partition(|event| event.all_day);

    timed.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.end.cmp(&b.end)));

    let columns = assign_columns(&timed);
    let widths = total_columns(&timed, &columns);

    let mut statuses: Vec<EventStatus> =
        timed.iter().map(|event| base_status(event, now)).collect();

    // Timed events are start-sorted, so the first Future is the earliest.
    if let Some(next_index) = statuses.iter().position(|s| *s == EventStatus::Future) {
        statuses[next_index] = EventStatus::Next;
    }

    let timed = timed
        .into_iter()
        .zip(columns)
        .zip(widths)
        .zip(statuses)
        .map(|(((event, column), total_columns), status)| TimelineEvent {
            event,
            column,
            total_columns,
            status,
        })
        .collect();

    let all_day = all_day
        .into_iter()
        .map(|event| {
            let status = base_status(&event, now);
            TimelineEvent { event, column: 0, total_columns: 1, status }
        })
        .collect();

    Timeline { all_day, timed }
}
