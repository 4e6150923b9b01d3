//! Event read endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use dayline_core::build_timeline;
use dayline_domain::{Event, TimeWindow, TimelineEvent};
use serde::{Deserialize, Serialize};

use super::{ApiError, FailureBody};
use crate::context::AppContext;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Range {
    #[default]
    Today,
    Week,
}

impl Range {
    fn window(self, now: DateTime<Utc>) -> TimeWindow {
        match self {
            Self::Today => TimeWindow::today(now),
            Self::Week => TimeWindow::week(now),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    #[serde(default)]
    pub range: Range,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub events: Vec<Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
    pub failures: Vec<FailureBody>,
}

/// `GET /events?range=today|week` — merged events for the window.
pub async fn list(
    State(context): State<Arc<AppContext>>,
    Query(params): Query<RangeParams>,
) -> Result<Json<EventsResponse>, ApiError> {
    let now = Utc::now();
    let window = params.range.window(now);

    let outcome = context.sync.events_for_window(&window, now).await?;

    Ok(Json(EventsResponse {
        events: outcome.events,
        last_sync: outcome.last_sync,
        failures: outcome.failures.iter().map(FailureBody::from).collect(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineResponse {
    pub all_day: Vec<TimelineEvent>,
    pub timed: Vec<TimelineEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
    pub failures: Vec<FailureBody>,
}

/// `GET /timeline?range=today|week` — read path plus the layout pass.
pub async fn timeline(
    State(context): State<Arc<AppContext>>,
    Query(params): Query<RangeParams>,
) -> Result<Json<TimelineResponse>, ApiError> {
    let now = Utc::now();
    let window = params.range.window(now);

    let outcome = context.sync.events_for_window(&window, now).await?;
    let timeline = build_timeline(outcome.events, now);

    Ok(Json(TimelineResponse {
        all_day: timeline.all_day,
        timed: timeline.timed,
        last_sync: outcome.last_sync,
        failures: outcome.failures.iter().map(FailureBody::from).collect(),
    }))
}
