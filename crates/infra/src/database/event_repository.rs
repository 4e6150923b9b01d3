//! SQLite-backed implementation of the EventRepository port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dayline_common::storage::SqlitePool;
use dayline_core::EventRepository;
use dayline_domain::{DaylineError, Event, EventSource, Result, SourceKind, TimeWindow};
use rusqlite::{Row, ToSql};
use tracing::{debug, instrument};

use crate::errors::InfraError;

/// SQLite implementation of EventRepository.
pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    /// Create a new event repository.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn timestamp(ts: i64) -> DateTime<Utc> {
    // Epoch seconds written by this repository; out-of-range is unreachable.
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

fn row_to_event(row: &Row<'_>) -> rusqlite::Result<Event> {
    let kind_str: String = row.get(8)?;
    let kind = match kind_str.as_str() {
        "oauth" => SourceKind::OAuth,
        "feed" => SourceKind::Feed,
        other => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                8,
                rusqlite::types::Type::Text,
                Box::new(DaylineError::Database(format!("unknown source kind: {other}"))),
            ))
        }
    };

    Ok(Event {
        id: row.get(0)?,
        calendar_id: row.get(1)?,
        title: row.get(2)?,
        start: timestamp(row.get(3)?),
        end: timestamp(row.get(4)?),
        all_day: row.get(5)?,
        location: row.get(6)?,
        description: row.get(7)?,
        source: EventSource {
            kind,
            calendar_name: row.get(9)?,
            account: row.get(10)?,
        },
    })
}

const EVENT_COLUMNS: &str = "id, calendar_id, title, start_ts, end_ts, all_day,
        location, description, source_kind, calendar_name, account";

#[async_trait]
impl EventRepository for SqliteEventRepository {
    #[instrument(skip(self, events), fields(calendar_id, count = events.len()))]
    async fn upsert_events(&self, calendar_id: &str, events: &[Event]) -> Result<usize> {
        let mut conn = self.pool.get().map_err(InfraError::from)?;
        let now = Utc::now().timestamp();

        // One transaction per batch: a calendar's events become visible
        // all-or-nothing.
        let tx = conn.transaction().map_err(InfraError::from)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO events (
                        id, calendar_id, title, start_ts, end_ts, all_day,
                        location, description, source_kind, calendar_name, account,
                        updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                    ON CONFLICT(id, calendar_id) DO UPDATE SET
                        title = excluded.title,
                        start_ts = excluded.start_ts,
                        end_ts = excluded.end_ts,
                        all_day = excluded.all_day,
                        location = excluded.location,
                        description = excluded.description,
                        source_kind = excluded.source_kind,
                        calendar_name = excluded.calendar_name,
                        account = excluded.account,
                        updated_at = excluded.updated_at",
                )
                .map_err(InfraError::from)?;

            for event in events {
                stmt.execute(
                    [
                        &event.id as &dyn ToSql,
                        &calendar_id,
                        &event.title,
                        &event.start.timestamp(),
                        &event.end.timestamp(),
                        &event.all_day,
                        &event.location,
                        &event.description,
                        &event.source.kind.as_str(),
                        &event.source.calendar_name,
                        &event.source.account,
                        &now,
                    ]
                    .as_ref(),
                )
                .map_err(InfraError::from)?;
            }
        }
        tx.commit().map_err(InfraError::from)?;

        debug!(calendar_id, count = events.len(), "upserted calendar events");

        Ok(events.len())
    }

    #[instrument(skip(self))]
    async fn events_in_window(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Event>> {
        let conn = self.pool.get().map_err(InfraError::from)?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {EVENT_COLUMNS}
                 FROM events
                 WHERE calendar_id = ?1 AND end_ts >= ?2 AND start_ts <= ?3
                 ORDER BY start_ts ASC, id ASC"
            ))
            .map_err(InfraError::from)?;

        let rows = stmt
            .query_map(
                [
                    &calendar_id as &dyn ToSql,
                    &window.start.timestamp(),
                    &window.end.timestamp(),
                ]
                .as_ref(),
                row_to_event,
            )
            .map_err(InfraError::from)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row.map_err(InfraError::from)?);
        }

        debug!(calendar_id, count = events.len(), "retrieved cached events");

        Ok(events)
    }

    #[instrument(skip(self))]
    async fn delete_for_calendar(&self, calendar_id: &str) -> Result<usize> {
        let conn = self.pool.get().map_err(InfraError::from)?;

        let deleted = conn
            .execute("DELETE FROM events WHERE calendar_id = ?1", [calendar_id])
            .map_err(InfraError::from)?;

        debug!(calendar_id, deleted, "deleted cached events for calendar");

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::database::manager::DatabaseManager;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, h, m, 0).single().unwrap()
    }

    fn event(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        Event {
            id: id.to_string(),
            calendar_id: "cal-1".to_string(),
            title: format!("event {id}"),
            start,
            end,
            all_day: false,
            location: Some("room 3".to_string()),
            description: None,
            source: EventSource {
                kind: SourceKind::OAuth,
                calendar_name: "Work".to_string(),
                account: Some("me@example.com".to_string()),
            },
        }
    }

    fn repo() -> SqliteEventRepository {
        let manager = DatabaseManager::in_memory().unwrap();
        SqliteEventRepository::new(manager.pool())
    }

    #[tokio::test]
    async fn round_trips_all_event_fields() {
        let repo = repo();
        let original = event("e1", at(9, 0), at(10, 0));

        repo.upsert_events("cal-1", std::slice::from_ref(&original)).await.unwrap();

        let window = TimeWindow::new(at(0, 0), at(23, 0));
        let events = repo.events_in_window("cal-1", &window).await.unwrap();
        assert_eq!(events, vec![original]);
    }

    #[tokio::test]
    async fn upsert_is_idempotent_for_identical_data() {
        let repo = repo();
        let batch = vec![event("e1", at(9, 0), at(10, 0)), event("e2", at(11, 0), at(12, 0))];

        repo.upsert_events("cal-1", &batch).await.unwrap();
        let window = TimeWindow::new(at(0, 0), at(23, 0));
        let first = repo.events_in_window("cal-1", &window).await.unwrap();

        repo.upsert_events("cal-1", &batch).await.unwrap();
        let second = repo.events_in_window("cal-1", &window).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn upsert_replaces_changed_fields() {
        let repo = repo();
        repo.upsert_events("cal-1", &[event("e1", at(9, 0), at(10, 0))]).await.unwrap();

        let mut updated = event("e1", at(9, 30), at(10, 30));
        updated.title = "moved meeting".to_string();
        repo.upsert_events("cal-1", std::slice::from_ref(&updated)).await.unwrap();

        let window = TimeWindow::new(at(0, 0), at(23, 0));
        let events = repo.events_in_window("cal-1", &window).await.unwrap();
        assert_eq!(events, vec![updated]);
    }

    #[tokio::test]
    async fn same_event_id_in_different_calendars_does_not_collide() {
        let repo = repo();
        let a = event("shared", at(9, 0), at(10, 0));
        let mut b = a.clone();
        b.calendar_id = "cal-2".to_string();

        repo.upsert_events("cal-1", std::slice::from_ref(&a)).await.unwrap();
        repo.upsert_events("cal-2", std::slice::from_ref(&b)).await.unwrap();

        let window = TimeWindow::new(at(0, 0), at(23, 0));
        assert_eq!(repo.events_in_window("cal-1", &window).await.unwrap().len(), 1);
        assert_eq!(repo.events_in_window("cal-2", &window).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn window_query_keeps_boundary_events() {
        let repo = repo();
        repo.upsert_events(
            "cal-1",
            &[
                event("before", at(6, 0), at(7, 0)),
                event("ends-at-start", at(7, 0), at(9, 0)),
                event("inside", at(10, 0), at(11, 0)),
                event("starts-at-end", at(17, 0), at(18, 0)),
                event("after", at(18, 30), at(19, 0)),
            ],
        )
        .await
        .unwrap();

        let window = TimeWindow::new(at(9, 0), at(17, 0));
        let ids: Vec<_> = repo
            .events_in_window("cal-1", &window)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();

        assert_eq!(ids, vec!["ends-at-start", "inside", "starts-at-end"]);
    }

    #[tokio::test]
    async fn delete_for_calendar_is_scoped() {
        let repo = repo();
        let a = event("e1", at(9, 0), at(10, 0));
        let mut b = a.clone();
        b.calendar_id = "cal-2".to_string();

        repo.upsert_events("cal-1", std::slice::from_ref(&a)).await.unwrap();
        repo.upsert_events("cal-2", std::slice::from_ref(&b)).await.unwrap();

        assert_eq!(repo.delete_for_calendar("cal-1").await.unwrap(), 1);

        let window = TimeWindow::new(at(0, 0), at(23, 0));
        assert!(repo.events_in_window("cal-1", &window).await.unwrap().is_empty());
        assert_eq!(repo.events_in_window("cal-2", &window).await.unwrap().len(), 1);
    }
}
