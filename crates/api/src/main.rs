//! Dayline server entry point.

use std::sync::Arc;

use dayline_app::{router, AppContext};
use dayline_domain::DaylineError;
use dayline_infra::config::loader;
use dayline_infra::scheduling::{SyncScheduler, SyncSchedulerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), DaylineError> {
    // .env is optional; real environments set variables directly.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = loader::load()?;
    let context = Arc::new(AppContext::initialize(&config)?);

    let mut scheduler =
        SyncScheduler::new(context.sync.clone(), SyncSchedulerConfig::default());
    scheduler.start();

    let app = router(context);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .map_err(|e| {
            DaylineError::Config(format!("failed to bind {}: {e}", config.server.bind_addr))
        })?;

    info!(addr = %config.server.bind_addr, "dayline listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| DaylineError::Internal(format!("server error: {e}")))?;

    scheduler.stop().await;

    Ok(())
}
