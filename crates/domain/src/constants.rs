//! Domain-wide constants.

use chrono::Duration;

/// Maximum age of a calendar's cache before a sync is forced.
///
/// A calendar last synced exactly this long ago is still fresh; one second
/// older is stale.
#[must_use]
pub fn cache_ttl() -> Duration {
    Duration::hours(1)
}

/// Refresh an access token when it expires within this buffer.
pub const TOKEN_REFRESH_BUFFER_SECONDS: i64 = 300;

/// Per-request timeout for provider HTTP calls, in seconds.
///
/// Each provider call fails fast on its own rather than hanging a bulk sync.
pub const PROVIDER_REQUEST_TIMEOUT_SECONDS: u64 = 15;

/// Length in bytes of the secret-store encryption key.
pub const SECRET_KEY_LEN: usize = 32;
