//! Read-only ICS feed provider.
//!
//! Fetches a remote calendar document with a bounded timeout, parses its
//! VEVENTs, and keeps only events intersecting the requested window. No
//! authentication involved.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use dayline_core::sync::ports::{CalendarProvider, FeedProber};
use dayline_domain::{
    CalendarSource, DaylineError, Event, EventSource, FeedProbe, ProviderCalendar, Result,
    SourceDetail, SourceKind, TimeWindow,
};
use icalendar::parser;
use icalendar::{CalendarDateTime, DatePerhapsTime};
use reqwest::Method;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::http::HttpClient;

/// ICS feed provider.
pub struct FeedCalendarProvider {
    http: HttpClient,
}

impl FeedCalendarProvider {
    /// Create a feed provider using the shared HTTP client.
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    fn feed_url(source: &CalendarSource) -> Result<&str> {
        match &source.detail {
            SourceDetail::Feed { url } => Ok(url),
            SourceDetail::OAuth { .. } => Err(DaylineError::InvalidInput(format!(
                "source {} is not a feed calendar",
                source.id
            ))),
        }
    }

    async fn fetch_document(&self, raw_url: &str) -> Result<String> {
        let url = Url::parse(raw_url)
            .map_err(|e| DaylineError::InvalidUrl(format!("{raw_url}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DaylineError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let response = self.http.send(self.http.request(Method::GET, url)).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(DaylineError::Api { status: status.as_u16(), message: body });
        }

        response
            .text()
            .await
            .map_err(|e| DaylineError::Network(format!("failed to read feed body: {e}")))
    }
}

#[async_trait]
impl CalendarProvider for FeedCalendarProvider {
    #[instrument(skip(self, source), fields(source_id = %source.id))]
    async fn list_calendars(&self, source: &CalendarSource) -> Result<Vec<ProviderCalendar>> {
        let url = Self::feed_url(source)?;
        let document = self.fetch_document(url).await?;
        let feed = parse_feed(&document)?;

        Ok(vec![ProviderCalendar {
            id: source.id.clone(),
            name: feed.name.unwrap_or_else(|| source.name.clone()),
            primary: false,
        }])
    }

    #[instrument(skip(self, source), fields(source_id = %source.id))]
    async fn fetch_events(
        &self,
        source: &CalendarSource,
        window: &TimeWindow,
    ) -> Result<Vec<Event>> {
        let url = Self::feed_url(source)?;
        let document = self.fetch_document(url).await?;
        let feed = parse_feed(&document)?;

        let events: Vec<Event> = feed
            .events
            .into_iter()
            .filter(|parsed| window.intersects(parsed.start, parsed.end))
            .map(|parsed| Event {
                id: parsed.uid,
                calendar_id: source.id.clone(),
                title: parsed.summary,
                start: parsed.start,
                end: parsed.end,
                all_day: parsed.all_day,
                location: parsed.location,
                description: parsed.description,
                source: EventSource {
                    kind: SourceKind::Feed,
                    calendar_name: source.name.clone(),
                    account: None,
                },
            })
            .collect();

        debug!(count = events.len(), "parsed feed events in window");

        Ok(events)
    }
}

#[async_trait]
impl FeedProber for FeedCalendarProvider {
    /// Probe a feed URL before registration: resolve a default display name
    /// and count the document's events.
    async fn probe(&self, raw_url: &str) -> Result<FeedProbe> {
        let document = self.fetch_document(raw_url).await?;
        let feed = parse_feed(&document)?;

        let name = feed.name.unwrap_or_else(|| {
            Url::parse(raw_url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| "Calendar feed".to_string())
        });

        Ok(FeedProbe { name, event_count: feed.events.len() })
    }
}

struct ParsedFeed {
    name: Option<String>,
    events: Vec<ParsedVevent>,
}

struct ParsedVevent {
    uid: String,
    summary: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    all_day: bool,
    location: Option<String>,
    description: Option<String>,
}

/// Parse an ICS document.
///
/// An unreadable document is a parse error; individually malformed VEVENTs
/// are skipped so one bad component does not take down the whole feed.
fn parse_feed(content: &str) -> Result<ParsedFeed> {
    let unfolded = parser::unfold(content);
    let calendar = parser::read_calendar(&unfolded)
        .map_err(|e| DaylineError::Parse(format!("invalid calendar document: {e}")))?;

    let name = calendar
        .properties
        .iter()
        .find(|p| p.name == "X-WR-CALNAME")
        .map(|p| p.val.to_string());

    let mut events = Vec::new();
    for component in &calendar.components {
        if component.name != "VEVENT" {
            continue;
        }
        match parse_vevent(component) {
            Some(event) => events.push(event),
            None => warn!("skipping malformed VEVENT in feed"),
        }
    }

    Ok(ParsedFeed { name, events })
}

fn parse_vevent(vevent: &parser::Component<'_>) -> Option<ParsedVevent> {
    let uid = vevent.find_prop("UID")?.val.to_string();
    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .unwrap_or_else(|| "(No title)".to_string());

    let start_raw = DatePerhapsTime::try_from(vevent.find_prop("DTSTART")?).ok()?;
    let (start, all_day) = to_utc(start_raw)?;

    let end = match vevent.find_prop("DTEND").and_then(|p| DatePerhapsTime::try_from(p).ok()) {
        Some(raw) => to_utc(raw)?.0,
        // DTEND is optional: all-day events span their day, point events
        // collapse to their start.
        None if all_day => start + Duration::days(1),
        None => start,
    };

    if end < start {
        return None;
    }

    let description = vevent.find_prop("DESCRIPTION").map(|p| p.val.to_string());
    let location = vevent.find_prop("LOCATION").map(|p| p.val.to_string());

    Some(ParsedVevent { uid, summary, start, end, all_day, location, description })
}

/// Resolve icalendar's date-or-datetime to UTC.
fn to_utc(value: DatePerhapsTime) -> Option<(DateTime<Utc>, bool)> {
    match value {
        DatePerhapsTime::Date(date) => Some((date.and_hms_opt(0, 0, 0)?.and_utc(), true)),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => Some((dt, false)),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            Some((naive.and_utc(), false))
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            let tz: chrono_tz::Tz = tzid.parse().ok()?;
            let local = tz.from_local_datetime(&date_time).earliest()?;
            Some((local.with_timezone(&Utc), false))
        }
    }
}
