//! Application context: dependency wiring for the HTTP layer.
//!
//! All dependencies are constructed here and passed down explicitly; nothing
//! reads configuration or keys from hidden globals.

use std::sync::Arc;

use async_trait::async_trait;
use dayline_common::crypto::EncryptionService;
use dayline_common::storage::SqlitePoolConfig;
use dayline_core::sync::ports::CalendarProvider;
use dayline_core::{SourceCatalog, SyncService};
use dayline_domain::{
    CalendarSource, DaylineError, Event, ProviderCalendar, Result, TimeWindow,
};
use dayline_infra::config::{AppConfig, TomlSourceCatalog};
use dayline_infra::http::HttpClient;
use dayline_infra::{
    AccountManager, DatabaseManager, FeedCalendarProvider, GoogleCalendarProvider, OAuthSettings,
    SqliteEventRepository, SqliteSecretStore, SqliteSyncStateRepository,
};

/// Shared application state handed to every route handler.
pub struct AppContext {
    pub sync: Arc<SyncService>,
    pub accounts: Option<Arc<AccountManager>>,
    pub catalog: Arc<TomlSourceCatalog>,
}

impl AppContext {
    /// Wire the full dependency graph from configuration.
    pub fn initialize(config: &AppConfig) -> Result<Self> {
        let crypto = Arc::new(
            EncryptionService::new(&config.secret_key)
                .map_err(|e| DaylineError::CryptoKey(e.to_string()))?,
        );

        let manager = DatabaseManager::new(
            &config.database.path,
            SqlitePoolConfig { max_size: config.database.pool_size, ..Default::default() },
        )?;

        let events = Arc::new(SqliteEventRepository::new(manager.pool()));
        let sync_state = Arc::new(SqliteSyncStateRepository::new(manager.pool()));
        let secrets = Arc::new(SqliteSecretStore::new(manager.pool(), crypto));

        let http = HttpClient::new()?;
        let catalog = Arc::new(TomlSourceCatalog::load(config.sources_path.clone())?);

        let accounts = config.oauth.as_ref().map(|oauth| {
            Arc::new(AccountManager::new(
                OAuthSettings::google(
                    oauth.client_id.clone(),
                    oauth.client_secret.clone(),
                    oauth.redirect_uri.clone(),
                ),
                http.clone(),
                secrets.clone() as Arc<dyn dayline_core::SecretStore>,
            ))
        });

        let oauth_provider: Arc<dyn CalendarProvider> = match &accounts {
            Some(accounts) => Arc::new(GoogleCalendarProvider::new(
                accounts.clone(),
                http.clone(),
                "https://www.googleapis.com/calendar/v3".to_string(),
            )),
            None => Arc::new(UnconfiguredOAuthProvider),
        };

        let feed_provider = Arc::new(FeedCalendarProvider::new(http));

        let sync = Arc::new(SyncService::new(
            oauth_provider,
            feed_provider.clone(),
            feed_provider,
            events,
            sync_state,
            catalog.clone(),
        ));

        Ok(Self { sync, accounts, catalog })
    }

    /// The account manager, or an error when OAuth is not configured.
    pub fn accounts(&self) -> Result<&Arc<AccountManager>> {
        self.accounts.as_ref().ok_or_else(|| {
            DaylineError::AuthRequired("OAuth is not configured for this deployment".to_string())
        })
    }
}

/// Placeholder provider used when no OAuth client is configured.
///
/// Keeps feed-only deployments working while OAuth sources fail with a
/// per-calendar auth error instead of taking the whole read down.
struct UnconfiguredOAuthProvider;

#[async_trait]
impl CalendarProvider for UnconfiguredOAuthProvider {
    async fn list_calendars(&self, _source: &CalendarSource) -> Result<Vec<ProviderCalendar>> {
        Err(DaylineError::AuthRequired("OAuth is not configured".to_string()))
    }

    async fn fetch_events(
        &self,
        _source: &CalendarSource,
        _window: &TimeWindow,
    ) -> Result<Vec<Event>> {
        Err(DaylineError::AuthRequired("OAuth is not configured".to_string()))
    }
}

/// Register calendars discovered during authorization as OAuth sources.
///
/// Calendars already present for the same account are skipped so re-running
/// the consent flow does not duplicate sources. The account's primary
/// calendar starts enabled, the rest start disabled.
pub async fn register_discovered_calendars(
    catalog: &dyn SourceCatalog,
    account: &str,
    calendars: &[ProviderCalendar],
) -> Result<usize> {
    let existing = catalog.sources().await?;
    let mut registered = 0;

    for calendar in calendars {
        let already_known = existing.iter().any(|source| match &source.detail {
            dayline_domain::SourceDetail::OAuth { account: a, provider_calendar_id } => {
                a == account && provider_calendar_id == &calendar.id
            }
            dayline_domain::SourceDetail::Feed { .. } => false,
        });
        if already_known {
            continue;
        }

        catalog
            .register(CalendarSource {
                id: uuid::Uuid::now_v7().to_string(),
                name: calendar.name.clone(),
                enabled: calendar.primary,
                color: None,
                detail: dayline_domain::SourceDetail::OAuth {
                    account: account.to_string(),
                    provider_calendar_id: calendar.id.clone(),
                },
            })
            .await?;
        registered += 1;
    }

    Ok(registered)
}
