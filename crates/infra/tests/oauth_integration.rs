//! Integration tests for the OAuth account manager against a mock provider.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use dayline_common::auth::types::TokenSet;
use dayline_common::crypto::EncryptionService;
use dayline_core::SecretStore;
use dayline_domain::DaylineError;
use dayline_infra::http::HttpClient;
use dayline_infra::{AccountManager, DatabaseManager, OAuthSettings, SqliteSecretStore};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fake_id_token(email: &str) -> String {
    let payload = format!(r#"{{"email":"{email}","sub":"12345"}}"#);
    format!("eyJhbGciOiJSUzI1NiJ9.{}.c2ln", URL_SAFE_NO_PAD.encode(payload.as_bytes()))
}

fn settings(server: &MockServer) -> OAuthSettings {
    OAuthSettings {
        client_id: "client-123".to_string(),
        client_secret: None,
        authorization_endpoint: format!("{}/authorize", server.uri()),
        token_endpoint: format!("{}/token", server.uri()),
        api_base: server.uri(),
        redirect_uri: "http://127.0.0.1:7400/oauth/callback".to_string(),
        scopes: vec!["calendar.readonly".to_string(), "openid".to_string()],
        extra_authorize_params: vec![("access_type".to_string(), "offline".to_string())],
    }
}

fn secret_store() -> Arc<SqliteSecretStore> {
    let manager = DatabaseManager::in_memory().unwrap();
    let crypto = Arc::new(EncryptionService::new(&EncryptionService::generate_key()).unwrap());
    Arc::new(SqliteSecretStore::new(manager.pool(), crypto))
}

fn manager(server: &MockServer, secrets: Arc<SqliteSecretStore>) -> AccountManager {
    let http = HttpClient::with_timeout(Duration::from_secs(2)).unwrap();
    AccountManager::new(settings(server), http, secrets)
}

#[test]
fn authorization_url_carries_pkce_and_state() {
    let settings = OAuthSettings::google("client-123", None, "http://127.0.0.1:7400/cb");
    let http = HttpClient::with_timeout(Duration::from_secs(2)).unwrap();
    let account_manager = AccountManager::new(settings, http, secret_store());

    let request = account_manager.begin_authorization();

    assert!(request.auth_url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    assert!(request.auth_url.contains("code_challenge="));
    assert!(request.auth_url.contains("code_challenge_method=S256"));
    assert!(request.auth_url.contains(&format!("state={}", request.state)));
    // The verifier itself must never appear in the URL.
    assert!(!request.auth_url.contains(&request.verifier));
}

#[tokio::test]
async fn complete_authorization_resolves_account_and_lists_calendars() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code_verifier=verifier-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "id_token": fake_id_token("me@example.com"),
            "expires_in": 3600
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/me/calendarList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                { "id": "primary", "summary": "me@example.com", "primary": true },
                { "id": "team-cal", "summary": "Team" }
            ]
        })))
        .mount(&server)
        .await;

    let secrets = secret_store();
    let account_manager = manager(&server, secrets.clone());

    let (account, calendars) =
        account_manager.complete_authorization("code-xyz", "verifier-abc").await.unwrap();

    assert_eq!(account, "me@example.com");
    assert_eq!(calendars.len(), 2);
    assert!(calendars[0].primary);

    // Tokens are persisted encrypted under the account identity.
    assert!(secrets.exists("oauth.tokens.me@example.com").await.unwrap());
    assert!(account_manager.is_authenticated("me@example.com").await.unwrap());
}

#[tokio::test]
async fn fresh_token_is_returned_without_a_refresh_call() {
    let server = MockServer::start().await;
    let secrets = secret_store();

    let tokens = TokenSet::new("still-valid".to_string(), Some("r".to_string()), None, 3600);
    secrets
        .set("oauth.tokens.me@example.com", &serde_json::to_string(&tokens).unwrap())
        .await
        .unwrap();

    let account_manager = manager(&server, secrets);
    let token = account_manager.ensure_fresh_token("me@example.com").await.unwrap();

    assert_eq!(token, "still-valid");
    // No HTTP mocks mounted: any request would have failed the test.
}

#[tokio::test]
async fn near_expiry_token_is_refreshed_and_persisted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "access-2",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;

    let secrets = secret_store();
    // Expires in 60s, inside the 5-minute refresh buffer.
    let tokens = TokenSet::new("access-1".to_string(), Some("refresh-1".to_string()), None, 60);
    secrets
        .set("oauth.tokens.me@example.com", &serde_json::to_string(&tokens).unwrap())
        .await
        .unwrap();

    let account_manager = manager(&server, secrets.clone());
    let token = account_manager.ensure_fresh_token("me@example.com").await.unwrap();

    assert_eq!(token, "access-2");

    // The stored set now carries the new access token and keeps the old
    // refresh token.
    let stored: TokenSet = serde_json::from_str(
        &secrets.get("oauth.tokens.me@example.com").await.unwrap().unwrap(),
    )
    .unwrap();
    assert_eq!(stored.access_token, "access-2");
    assert_eq!(stored.refresh_token, Some("refresh-1".to_string()));
}

#[tokio::test]
async fn rejected_refresh_token_surfaces_auth_expired_for_that_account() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        })))
        .mount(&server)
        .await;

    let secrets = secret_store();
    let tokens = TokenSet::new("old".to_string(), Some("revoked".to_string()), None, 10);
    secrets
        .set("oauth.tokens.me@example.com", &serde_json::to_string(&tokens).unwrap())
        .await
        .unwrap();

    let account_manager = manager(&server, secrets);
    let result = account_manager.ensure_fresh_token("me@example.com").await;

    assert!(matches!(
        result,
        Err(DaylineError::AuthExpired { account }) if account == "me@example.com"
    ));
}

#[tokio::test]
async fn unknown_account_requires_authentication() {
    let server = MockServer::start().await;
    let account_manager = manager(&server, secret_store());

    let result = account_manager.ensure_fresh_token("nobody@example.com").await;
    assert!(matches!(result, Err(DaylineError::AuthRequired(_))));
}

#[tokio::test]
async fn remove_account_deletes_stored_tokens() {
    let server = MockServer::start().await;
    let secrets = secret_store();

    let tokens = TokenSet::new("access".to_string(), None, None, 3600);
    secrets
        .set("oauth.tokens.me@example.com", &serde_json::to_string(&tokens).unwrap())
        .await
        .unwrap();

    let account_manager = manager(&server, secrets.clone());
    account_manager.remove_account("me@example.com").await.unwrap();

    assert!(!secrets.exists("oauth.tokens.me@example.com").await.unwrap());
}
