//! OAuth flow endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use dayline_domain::ProviderCalendar;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ApiError;
use crate::context::{register_discovered_calendars, AppContext};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub auth_url: String,
    /// The caller holds the verifier client-side for the callback window.
    pub verifier: String,
    pub state: String,
}

/// `POST /oauth/start` — begin the authorization flow.
pub async fn start(
    State(context): State<Arc<AppContext>>,
) -> Result<Json<StartResponse>, ApiError> {
    let accounts = context.accounts()?;
    let request = accounts.begin_authorization();

    Ok(Json(StartResponse {
        auth_url: request.auth_url,
        verifier: request.verifier,
        state: request.state,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: String,
    /// Verifier returned by `/oauth/start`, held client-side meanwhile.
    pub verifier: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackResponse {
    pub account: String,
    pub calendars: Vec<ProviderCalendar>,
    pub registered: usize,
}

/// `GET /oauth/callback` — complete authorization and register the
/// discovered calendars as sources.
pub async fn callback(
    State(context): State<Arc<AppContext>>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<CallbackResponse>, ApiError> {
    let accounts = context.accounts()?;

    let (account, calendars) =
        accounts.complete_authorization(&params.code, &params.verifier).await?;

    let registered =
        register_discovered_calendars(context.catalog.as_ref(), &account, &calendars).await?;

    info!(account = %account, registered, "account connected");

    Ok(Json(CallbackResponse { account, calendars, registered }))
}
