//! HTTP route handlers.
//!
//! Thin wrappers over the engine: parse the request, call one service
//! operation, serialize the result. No business logic lives here.

pub mod calendars;
pub mod events;
pub mod oauth;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dayline_domain::{CalendarFailure, DaylineError};
use serde::Serialize;

use crate::context::AppContext;

/// Build the application router.
pub fn router(context: Arc<AppContext>) -> Router {
    Router::new()
        .route("/oauth/start", post(oauth::start))
        .route("/oauth/callback", get(oauth::callback))
        .route("/events", get(events::list))
        .route("/timeline", get(events::timeline))
        .route("/calendars/sync", post(calendars::sync))
        .route("/calendars/feed", post(calendars::register_feed))
        .with_state(context)
}

/// Domain error wrapper with an HTTP mapping.
#[derive(Debug)]
pub struct ApiError(pub DaylineError);

impl From<DaylineError> for ApiError {
    fn from(value: DaylineError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DaylineError::AuthRequired(_) | DaylineError::AuthExpired { .. } => {
                StatusCode::UNAUTHORIZED
            }
            DaylineError::NotFound(_) => StatusCode::NOT_FOUND,
            DaylineError::InvalidUrl(_) | DaylineError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.0.label(),
            "message": self.0.user_message(),
        });

        (status, Json(body)).into_response()
    }
}

/// Per-calendar failure as exposed over HTTP.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureBody {
    pub calendar_id: String,
    pub name: String,
    pub error_message: String,
}

impl From<&CalendarFailure> for FailureBody {
    fn from(failure: &CalendarFailure) -> Self {
        Self {
            calendar_id: failure.calendar_id.clone(),
            name: failure.name.clone(),
            error_message: failure.error.user_message(),
        }
    }
}
