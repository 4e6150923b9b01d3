//! Periodic calendar sync scheduler.
//!
//! Sync is pull-based: this scheduler wakes on a fixed interval and runs a
//! bulk sync over all enabled calendars. Per-calendar failures are logged
//! and never stop the loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dayline_core::SyncService;
use dayline_domain::TimeWindow;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SyncSchedulerConfig {
    /// Time between bulk sync passes.
    pub interval: Duration,
}

impl Default for SyncSchedulerConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(15 * 60) }
    }
}

/// Interval-based background sync driver.
pub struct SyncScheduler {
    service: Arc<SyncService>,
    config: SyncSchedulerConfig,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SyncScheduler {
    /// Create a stopped scheduler.
    pub fn new(service: Arc<SyncService>, config: SyncSchedulerConfig) -> Self {
        Self { service, config, cancel: CancellationToken::new(), handle: None }
    }

    /// Start the background loop.
    ///
    /// The first pass runs after one full interval, not immediately, so
    /// startup is not delayed by provider calls.
    pub fn start(&mut self) {
        let service = Arc::clone(&self.service);
        let interval = self.config.interval;
        let cancel = self.cancel.clone();

        info!(interval_secs = interval.as_secs(), "starting sync scheduler");

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            ticker.tick().await; // first tick completes immediately

            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        info!("sync scheduler stopped");
                        return;
                    }
                    _ = ticker.tick() => {}
                }

                let now = Utc::now();
                let window = TimeWindow::week(now);

                match service.sync_all(&window, now, false).await {
                    Ok(report) => {
                        info!(
                            success = report.success_count,
                            total = report.total_count,
                            failed = report.error_calendars.len(),
                            "scheduled sync pass complete"
                        );
                        for failure in &report.error_calendars {
                            warn!(
                                calendar_id = %failure.calendar_id,
                                error = %failure.error,
                                "calendar failed during scheduled sync"
                            );
                        }
                    }
                    Err(error) => {
                        warn!(error = %error, "scheduled sync pass failed");
                    }
                }
            }
        }));
    }

    /// Stop the background loop and wait for it to exit.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
