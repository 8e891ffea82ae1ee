//! Batch delivery transports.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use tracking_core::{Error, Result, TrackingEvent};
use url::Url;

/// Timeout for one delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers one batch of events to an ingest endpoint.
///
/// Implementations return an error for network failures and non-success
/// responses alike; the queue re-buffers the batch either way.
#[async_trait]
pub trait EventTransport: Send + Sync {
    async fn send(&self, endpoint: &str, events: &[TrackingEvent]) -> Result<()>;
}

#[derive(Serialize)]
struct BatchBody<'a> {
    events: &'a [TrackingEvent],
}

/// HTTP transport posting `{ "events": [...] }` as JSON.
#[derive(Clone)]
pub struct HttpTransport {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Transport resolving relative endpoints against `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::validation(format!("invalid base URL {}: {}", base_url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    /// Absolute URL for `endpoint`. Absolute endpoints are used as is.
    pub fn resolve(&self, endpoint: &str) -> Result<Url> {
        self.base_url
            .join(endpoint)
            .map_err(|e| Error::validation(format!("invalid endpoint {}: {}", endpoint, e)))
    }
}

#[async_trait]
impl EventTransport for HttpTransport {
    async fn send(&self, endpoint: &str, events: &[TrackingEvent]) -> Result<()> {
        let url = self.resolve(endpoint)?;
        debug!(url = %url, count = events.len(), "Sending batch");

        let response = self
            .client
            .post(url)
            .json(&BatchBody { events })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Batch request failed");
                Error::transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Ingest endpoint returned error");
            return Err(Error::transport(format!("ingest returned {}: {}", status, body)));
        }

        Ok(())
    }
}
