//! Calendar source types.
//!
//! A `CalendarSource` is owned by the configuration store; the engine only
//! reads it. Kind-specific fields live in [`SourceDetail`] so an OAuth source
//! cannot exist without an account and a feed source cannot exist without a
//! URL.

use serde::{Deserialize, Serialize};

/// Kind of calendar source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// OAuth-authenticated provider calendar.
    OAuth,
    /// URL-based read-only feed (ICS).
    Feed,
}

impl SourceKind {
    /// Stable lowercase label for logs and serialization outside serde.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OAuth => "oauth",
            Self::Feed => "feed",
        }
    }
}

/// Kind-specific fields of a calendar source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceDetail {
    /// OAuth-backed provider calendar.
    OAuth {
        /// External account identity (email).
        account: String,
        /// Provider-side calendar id within that account.
        provider_calendar_id: String,
    },
    /// Remote ICS feed.
    Feed {
        /// Source document URL.
        url: String,
    },
}

/// A configured calendar source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSource {
    /// Opaque source id, unique across all sources.
    pub id: String,
    /// Display name shown in the timeline.
    pub name: String,
    /// Disabled sources are skipped by sync and the read path.
    pub enabled: bool,
    /// Optional display color (CSS hex string).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Kind-specific fields.
    #[serde(flatten)]
    pub detail: SourceDetail,
}

impl CalendarSource {
    /// The kind of this source, derived from its detail.
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self.detail {
            SourceDetail::OAuth { .. } => SourceKind::OAuth,
            SourceDetail::Feed { .. } => SourceKind::Feed,
        }
    }

    /// Account identity for OAuth sources, `None` for feeds.
    #[must_use]
    pub fn account(&self) -> Option<&str> {
        match &self.detail {
            SourceDetail::OAuth { account, .. } => Some(account),
            SourceDetail::Feed { .. } => None,
        }
    }
}

/// A calendar as reported by a provider's calendar listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCalendar {
    /// Provider-side calendar id.
    pub id: String,
    /// Provider-side display name.
    pub name: String,
    /// Whether this is the account's primary calendar.
    #[serde(default)]
    pub primary: bool,
}

/// Result of probing a feed URL before registering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedProbe {
    /// Default display name derived from the document or URL host.
    pub name: String,
    /// Number of events in the document at probe time.
    pub event_count: usize,
}
