//! OAuth 2.0 account management for calendar providers.
//!
//! Drives the PKCE authorization flow, exchanges codes for tokens, detects
//! expiry and refreshes tokens. Token sets are persisted through the secret
//! store keyed by the external account identity (email), never in plaintext.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use dayline_common::auth::pkce::PkceChallenge;
use dayline_common::auth::types::{TokenResponse, TokenSet};
use dayline_core::SecretStore;
use dayline_domain::{constants, DaylineError, ProviderCalendar, Result};
use reqwest::Method;
use tracing::{debug, info, instrument, warn};

use super::providers::google::fetch_calendar_list;
use crate::http::HttpClient;

const TOKEN_KEY_PREFIX: &str = "oauth.tokens.";

/// Configuration for an OAuth calendar provider.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    /// Base URL of the provider's calendar API.
    pub api_base: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub extra_authorize_params: Vec<(String, String)>,
}

impl OAuthSettings {
    /// Google OAuth settings with read-only calendar scopes.
    pub fn google(
        client_id: impl Into<String>,
        client_secret: Option<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            authorization_endpoint: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_endpoint: "https://oauth2.googleapis.com/token".to_string(),
            api_base: "https://www.googleapis.com/calendar/v3".to_string(),
            redirect_uri: redirect_uri.into(),
            scopes: vec![
                "https://www.googleapis.com/auth/calendar.readonly".to_string(),
                "openid".to_string(),
                "email".to_string(),
            ],
            extra_authorize_params: vec![
                ("access_type".to_string(), "offline".to_string()),
                ("prompt".to_string(), "consent".to_string()),
            ],
        }
    }
}

/// An authorization request handed to the caller.
///
/// The caller holds `verifier` and `state` for the callback window; they are
/// session-scoped and never persisted long-term.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// URL to open in the user's browser.
    pub auth_url: String,
    /// PKCE code verifier, required again at the token exchange.
    pub verifier: String,
    /// Anti-forgery state token, echoed back in the callback.
    pub state: String,
}

/// OAuth token lifecycle manager for calendar accounts.
pub struct AccountManager {
    settings: OAuthSettings,
    http: HttpClient,
    secrets: Arc<dyn SecretStore>,
}

impl AccountManager {
    /// Create a new account manager.
    pub fn new(settings: OAuthSettings, http: HttpClient, secrets: Arc<dyn SecretStore>) -> Self {
        Self { settings, http, secrets }
    }

    fn token_key(account: &str) -> String {
        format!("{TOKEN_KEY_PREFIX}{account}")
    }

    /// Begin the authorization flow.
    ///
    /// Generates a PKCE verifier/challenge pair plus a state token and builds
    /// the provider authorization URL.
    #[must_use]
    pub fn begin_authorization(&self) -> AuthorizationRequest {
        let challenge = PkceChallenge::generate();

        let mut params = vec![
            ("response_type".to_string(), "code".to_string()),
            ("client_id".to_string(), self.settings.client_id.clone()),
            ("redirect_uri".to_string(), self.settings.redirect_uri.clone()),
            ("scope".to_string(), self.settings.scopes.join(" ")),
            ("state".to_string(), challenge.state.clone()),
            ("code_challenge".to_string(), challenge.code_challenge.clone()),
            ("code_challenge_method".to_string(), challenge.challenge_method().to_string()),
        ];
        params.extend(self.settings.extra_authorize_params.iter().cloned());

        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let auth_url = format!("{}?{}", self.settings.authorization_endpoint, query);

        info!("generated authorization URL");

        AuthorizationRequest {
            auth_url,
            verifier: challenge.code_verifier,
            state: challenge.state,
        }
    }

    /// Complete the authorization flow.
    ///
    /// Exchanges code+verifier for tokens, resolves the account identity from
    /// the ID token, persists the token set, and returns the identity plus
    /// the provider calendars discovered for it.
    #[instrument(skip_all)]
    pub async fn complete_authorization(
        &self,
        code: &str,
        verifier: &str,
    ) -> Result<(String, Vec<ProviderCalendar>)> {
        let mut form = vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
            ("code_verifier", verifier.to_string()),
            ("client_id", self.settings.client_id.clone()),
            ("redirect_uri", self.settings.redirect_uri.clone()),
        ];
        if let Some(secret) = &self.settings.client_secret {
            form.push(("client_secret", secret.clone()));
        }

        let response = self.token_request(&form).await?;
        let tokens: TokenSet = response.into();

        let id_token = tokens.id_token.clone().ok_or_else(|| {
            DaylineError::AuthRequired("provider did not return an ID token".to_string())
        })?;
        let account = extract_email_from_id_token(&id_token)?;

        self.store_tokens(&account, &tokens).await?;

        let calendars =
            fetch_calendar_list(&self.http, &self.settings.api_base, &tokens.access_token).await?;

        info!(account = %account, calendars = calendars.len(), "authorization completed");

        Ok((account, calendars))
    }

    /// Return a valid access token for the account, refreshing when needed.
    ///
    /// Refreshes when the stored token expires within the five-minute buffer.
    /// A rejected refresh token surfaces as `AuthExpired` carrying the
    /// account identity; it is not retried because it requires user
    /// re-consent.
    #[instrument(skip(self))]
    pub async fn ensure_fresh_token(&self, account: &str) -> Result<String> {
        let tokens = self.load_tokens(account).await?.ok_or_else(|| {
            DaylineError::AuthRequired(format!("no stored tokens for {account}"))
        })?;

        if !tokens.is_expired(constants::TOKEN_REFRESH_BUFFER_SECONDS) {
            return Ok(tokens.access_token);
        }

        debug!(account, "access token near expiry, refreshing");

        let Some(refresh_token) = tokens.refresh_token.clone() else {
            return Err(DaylineError::AuthExpired { account: account.to_string() });
        };

        let mut form = vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token),
            ("client_id", self.settings.client_id.clone()),
        ];
        if let Some(secret) = &self.settings.client_secret {
            form.push(("client_secret", secret.clone()));
        }

        match self.token_request(&form).await {
            Ok(response) => {
                let refreshed = tokens.refreshed(response);
                self.store_tokens(account, &refreshed).await?;
                info!(account, "access token refreshed");
                Ok(refreshed.access_token)
            }
            // The provider rejected the refresh token itself: only a new
            // user consent can fix this.
            Err(DaylineError::Api { status: 400 | 401 | 403, .. })
            | Err(DaylineError::AuthRequired(_)) => {
                warn!(account, "refresh token rejected");
                Err(DaylineError::AuthExpired { account: account.to_string() })
            }
            Err(other) => Err(other),
        }
    }

    /// Whether tokens are stored for the account.
    pub async fn is_authenticated(&self, account: &str) -> Result<bool> {
        self.secrets.exists(&Self::token_key(account)).await
    }

    /// Remove the stored token set for an account.
    pub async fn remove_account(&self, account: &str) -> Result<()> {
        self.secrets.delete(&Self::token_key(account)).await
    }

    async fn token_request(&self, form: &[(&str, String)]) -> Result<TokenResponse> {
        let request =
            self.http.request(Method::POST, self.settings.token_endpoint.as_str()).form(form);
        let response = self.http.send(request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(DaylineError::Api { status: status.as_u16(), message: body });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| DaylineError::Parse(format!("failed to parse token response: {e}")))
    }

    async fn load_tokens(&self, account: &str) -> Result<Option<TokenSet>> {
        match self.secrets.get(&Self::token_key(account)).await? {
            Some(raw) => {
                let tokens = serde_json::from_str(&raw).map_err(|e| {
                    DaylineError::Parse(format!("stored token set is malformed: {e}"))
                })?;
                Ok(Some(tokens))
            }
            None => Ok(None),
        }
    }

    async fn store_tokens(&self, account: &str, tokens: &TokenSet) -> Result<()> {
        let raw = serde_json::to_string(tokens)
            .map_err(|e| DaylineError::Internal(format!("failed to serialize tokens: {e}")))?;
        self.secrets.set(&Self::token_key(account), &raw).await
    }
}

/// Extract the `email` claim from an ID token (JWT) without verification.
///
/// The token arrives over TLS directly from the provider's token endpoint,
/// so signature verification is not required to trust the claim.
pub fn extract_email_from_id_token(id_token: &str) -> Result<String> {
    let parts: Vec<&str> = id_token.split('.').collect();
    if parts.len() != 3 {
        return Err(DaylineError::Parse("invalid ID token format".into()));
    }

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| DaylineError::Parse(format!("failed to decode ID token payload: {e}")))?;

    let payload: serde_json::Value = serde_json::from_slice(&payload_bytes)
        .map_err(|e| DaylineError::Parse(format!("failed to parse ID token payload: {e}")))?;

    payload
        .get("email")
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .ok_or_else(|| DaylineError::Parse("email claim missing from ID token".into()))
}
