//! OAuth 2.0 token types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth 2.0 access and refresh tokens with expiry metadata.
///
/// One token set belongs to one external account identity. Never persisted
/// in plaintext; the secret store encrypts the serialized form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token for API authentication.
    pub access_token: String,

    /// Refresh token for obtaining new access tokens.
    /// Optional because some providers don't issue them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// ID token (JWT) containing user claims (OpenID Connect).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Absolute expiration timestamp (UTC), calculated from the provider's
    /// `expires_in` at creation/refresh time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenSet {
    /// Create a token set, deriving `expires_at` from a lifetime in seconds.
    #[must_use]
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        id_token: Option<String>,
        expires_in: i64,
    ) -> Self {
        let expires_at =
            (expires_in > 0).then(|| Utc::now() + chrono::Duration::seconds(expires_in));
        Self { access_token, refresh_token, id_token, expires_at }
    }

    /// Whether the access token is expired or expires within the threshold.
    ///
    /// Tokens without an expiry are assumed valid.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + chrono::Duration::seconds(threshold_seconds) >= expires_at,
            None => false,
        }
    }

    /// Seconds until expiry, or `None` when no expiry is set.
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - Utc::now()).num_seconds())
    }

    /// Merge a refresh response into this set.
    ///
    /// Providers often omit the refresh token on refresh; the existing one is
    /// kept in that case.
    #[must_use]
    pub fn refreshed(self, response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(self.refresh_token),
            id_token: response.id_token.or(self.id_token),
            expires_at: (response.expires_in > 0)
                .then(|| Utc::now() + chrono::Duration::seconds(response.expires_in)),
        }
    }
}

/// OAuth token response from an authorization server (RFC 6749).
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub expires_in: i64,
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        Self::new(
            response.access_token,
            response.refresh_token,
            response.id_token,
            response.expires_in,
        )
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::types.
    use super::*;

    #[test]
    fn token_set_derives_expiry() {
        let tokens =
            TokenSet::new("access".to_string(), Some("refresh".to_string()), None, 3600);
        assert!(tokens.expires_at.is_some());

        let secs = tokens.seconds_until_expiry().unwrap();
        assert!(secs > 3590 && secs <= 3600);
    }

    #[test]
    fn expiry_check_honors_threshold() {
        let tokens = TokenSet::new("access".to_string(), None, None, 3600);
        assert!(!tokens.is_expired(300));
        assert!(tokens.is_expired(7200));
    }

    #[test]
    fn no_expiry_means_never_expired() {
        let tokens = TokenSet::new("access".to_string(), None, None, 0);
        assert!(tokens.expires_at.is_none());
        assert!(!tokens.is_expired(300));
        assert!(tokens.seconds_until_expiry().is_none());
    }

    #[test]
    fn refreshed_keeps_existing_refresh_token() {
        let tokens = TokenSet::new(
            "old-access".to_string(),
            Some("long-lived-refresh".to_string()),
            None,
            60,
        );

        let refreshed = tokens.refreshed(TokenResponse {
            access_token: "new-access".to_string(),
            refresh_token: None,
            id_token: None,
            expires_in: 3600,
        });

        assert_eq!(refreshed.access_token, "new-access");
        assert_eq!(refreshed.refresh_token, Some("long-lived-refresh".to_string()));
        assert!(!refreshed.is_expired(300));
    }

    #[test]
    fn token_response_converts_to_token_set() {
        let response = TokenResponse {
            access_token: "access123".to_string(),
            refresh_token: Some("refresh456".to_string()),
            id_token: Some("id789".to_string()),
            expires_in: 3600,
        };

        let tokens: TokenSet = response.into();
        assert_eq!(tokens.access_token, "access123");
        assert_eq!(tokens.refresh_token, Some("refresh456".to_string()));
        assert!(tokens.expires_at.is_some());
    }
}
