//! Google Calendar provider implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dayline_core::CalendarProvider;
use dayline_domain::{
    CalendarSource, DaylineError, Event, EventSource, ProviderCalendar, Result, SourceDetail,
    SourceKind, TimeWindow,
};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::http::HttpClient;
use crate::integrations::calendar::oauth::AccountManager;

/// Google Calendar API client implementing the provider port.
pub struct GoogleCalendarProvider {
    accounts: Arc<AccountManager>,
    http: HttpClient,
    api_base: String,
}

impl GoogleCalendarProvider {
    /// Create a provider backed by the given account manager.
    pub fn new(accounts: Arc<AccountManager>, http: HttpClient, api_base: String) -> Self {
        Self { accounts, http, api_base }
    }

    fn oauth_fields<'a>(source: &'a CalendarSource) -> Result<(&'a str, &'a str)> {
        match &source.detail {
            SourceDetail::OAuth { account, provider_calendar_id } => {
                Ok((account, provider_calendar_id))
            }
            SourceDetail::Feed { .. } => Err(DaylineError::InvalidInput(format!(
                "source {} is not an OAuth calendar",
                source.id
            ))),
        }
    }

    /// Map non-success API statuses, tying auth failures to the account so
    /// the orchestrator can flag exactly that account for re-auth.
    fn api_error(status: u16, body: String, account: &str) -> DaylineError {
        match status {
            401 | 403 => DaylineError::AuthExpired { account: account.to_string() },
            _ => DaylineError::Api { status, message: body },
        }
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    #[instrument(skip(self, source), fields(source_id = %source.id))]
    async fn list_calendars(&self, source: &CalendarSource) -> Result<Vec<ProviderCalendar>> {
        let (account, _) = Self::oauth_fields(source)?;
        let access_token = self.accounts.ensure_fresh_token(account).await?;
        fetch_calendar_list(&self.http, &self.api_base, &access_token).await
    }

    #[instrument(skip(self, source), fields(source_id = %source.id))]
    async fn fetch_events(
        &self,
        source: &CalendarSource,
        window: &TimeWindow,
    ) -> Result<Vec<Event>> {
        let (account, provider_calendar_id) = Self::oauth_fields(source)?;
        let access_token = self.accounts.ensure_fresh_token(account).await?;

        let url = format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(provider_calendar_id)
        );

        let request = self
            .http
            .request(Method::GET, url)
            .bearer_auth(&access_token)
            .query(&[
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("timeMin", window.start.to_rfc3339()),
                ("timeMax", window.end.to_rfc3339()),
                ("timeZone", "UTC".to_string()),
            ]);

        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(Self::api_error(status.as_u16(), body, account));
        }

        let payload: GoogleEventsResponse = response
            .json()
            .await
            .map_err(|e| DaylineError::Parse(format!("failed to parse events response: {e}")))?;

        let mut events = Vec::with_capacity(payload.items.len());
        for item in payload.items {
            let (start, all_day) = parse_event_time(&item.start, "start")?;
            let (end, _) = parse_event_time(&item.end, "end")?;

            events.push(Event {
                id: item.id,
                calendar_id: source.id.clone(),
                title: item
                    .summary
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| "(No title)".to_string()),
                start,
                end,
                all_day,
                location: item.location,
                description: item.description,
                source: EventSource {
                    kind: SourceKind::OAuth,
                    calendar_name: source.name.clone(),
                    account: Some(account.to_string()),
                },
            });
        }

        debug!(count = events.len(), "fetched events from calendar API");

        Ok(events)
    }
}

/// Fetch the account's calendar list.
///
/// Shared with the authorization flow, which lists calendars right after the
/// first token exchange so they can be registered as sources.
pub(crate) async fn fetch_calendar_list(
    http: &HttpClient,
    api_base: &str,
    access_token: &str,
) -> Result<Vec<ProviderCalendar>> {
    let url = format!("{api_base}/users/me/calendarList");

    let request = http.request(Method::GET, url).bearer_auth(access_token);
    let response = http.send(request).await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
        return Err(DaylineError::Api { status: status.as_u16(), message: body });
    }

    let payload: GoogleCalendarListResponse = response
        .json()
        .await
        .map_err(|e| DaylineError::Parse(format!("failed to parse calendar list: {e}")))?;

    Ok(payload
        .items
        .into_iter()
        .map(|item| ProviderCalendar {
            id: item.id,
            name: item.summary.unwrap_or_else(|| "(Unnamed calendar)".to_string()),
            primary: item.primary.unwrap_or(false),
        })
        .collect())
}

fn parse_event_time(value: &GoogleEventTime, field: &str) -> Result<(DateTime<Utc>, bool)> {
    if let Some(date_time) = &value.date_time {
        let parsed = DateTime::parse_from_rfc3339(date_time).map_err(|e| {
            DaylineError::Parse(format!("invalid {field} timestamp '{date_time}': {e}"))
        })?;
        return Ok((parsed.with_timezone(&Utc), false));
    }

    if let Some(date) = &value.date {
        let parsed = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| DaylineError::Parse(format!("invalid {field} date '{date}': {e}")))?;
        let midnight = parsed.and_hms_opt(0, 0, 0).ok_or_else(|| {
            DaylineError::Parse(format!("invalid {field} date '{date}': no midnight"))
        })?;
        return Ok((midnight.and_utc(), true));
    }

    Err(DaylineError::Parse(format!("event {field} has neither dateTime nor date")))
}

#[derive(Debug, Deserialize)]
struct GoogleEventsResponse {
    #[serde(default)]
    items: Vec<GoogleEventItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleEventItem {
    id: String,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    start: GoogleEventTime,
    end: GoogleEventTime,
}

#[derive(Debug, Deserialize)]
struct GoogleEventTime {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleCalendarListResponse {
    #[serde(default)]
    items: Vec<GoogleCalendarListItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleCalendarListItem {
    id: String,
    summary: Option<String>,
    primary: Option<bool>,
}
