//! Calendar management endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use dayline_domain::{CalendarSource, SourceDetail, TimeWindow};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiError, FailureBody};
use crate::context::AppContext;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success_count: usize,
    pub total_count: usize,
    pub error_calendars: Vec<FailureBody>,
}

/// `POST /calendars/sync` — force a bulk sync of all enabled calendars.
pub async fn sync(
    State(context): State<Arc<AppContext>>,
) -> Result<Json<SyncResponse>, ApiError> {
    let now = Utc::now();
    let window = TimeWindow::week(now);

    let report = context.sync.sync_all(&window, now, true).await?;

    Ok(Json(SyncResponse {
        success_count: report.success_count,
        total_count: report.total_count,
        error_calendars: report.error_calendars.iter().map(FailureBody::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RegisterFeedBody {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFeedResponse {
    pub id: String,
    pub name: String,
    pub event_count: usize,
}

/// `POST /calendars/feed` — probe and register a feed source.
///
/// The probe fetch runs before anything is persisted, so a dead URL never
/// lands in the catalog.
pub async fn register_feed(
    State(context): State<Arc<AppContext>>,
    Json(body): Json<RegisterFeedBody>,
) -> Result<Json<RegisterFeedResponse>, ApiError> {
    let probe = context.sync.probe_feed(&body.url).await?;

    let source = CalendarSource {
        id: uuid::Uuid::now_v7().to_string(),
        name: body.name.unwrap_or_else(|| probe.name.clone()),
        enabled: true,
        color: None,
        detail: SourceDetail::Feed { url: body.url },
    };

    let response = RegisterFeedResponse {
        id: source.id.clone(),
        name: source.name.clone(),
        event_count: probe.event_count,
    };

    context.sync.register_source(source).await?;

    info!(id = %response.id, name = %response.name, "feed source registered");

    Ok(Json(response))
}
