//! Shared HTTP client with timeout and bounded retry.

use std::time::Duration;

use dayline_domain::{constants, DaylineError};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with built-in retry and timeout support.
///
/// Every request carries its own fixed timeout so a slow provider fails fast
/// instead of hanging a whole sync batch.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Create a client with the default provider timeout.
    pub fn new() -> Result<Self, DaylineError> {
        Self::with_timeout(Duration::from_secs(constants::PROVIDER_REQUEST_TIMEOUT_SECONDS))
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, DaylineError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DaylineError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, max_attempts: 2, base_backoff: Duration::from_millis(250) })
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// Retries transient transport failures and 5xx responses; the request
    /// body must be cloneable (buffered) for retries to work.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, DaylineError> {
        let attempts = self.max_attempts.max(1);

        for attempt in 0..attempts {
            let cloned_builder = builder.try_clone().ok_or_else(|| {
                DaylineError::Internal(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;

            match cloned_builder.send().await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt = attempt + 1, %status, "received HTTP response");

                    if status.is_server_error() && attempt + 1 < attempts {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(err) => {
                    debug!(attempt = attempt + 1, error = %err, "HTTP request failed");

                    if attempt + 1 < attempts && (err.is_timeout() || err.is_connect()) {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    let infra: InfraError = err.into();
                    return Err(DaylineError::from(infra));
                }
            }
        }

        Err(DaylineError::Internal("retry loop exhausted without a response".into()))
    }

    async fn sleep_with_backoff(&self, attempt: usize) {
        let backoff = self.base_backoff * attempt as u32;
        tokio::time::sleep(backoff).await;
    }
}
