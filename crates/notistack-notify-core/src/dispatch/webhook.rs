//! Webhook delivery with bounded retries.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{DeliveryError, DispatchError};

use super::broker::DeliveryTask;

/// POSTs event bodies to subscription endpoints.
#[derive(Debug, Clone)]
pub struct WebhookDeliverer {
    client: reqwest::Client,
    max_attempts: u32,
    backoff: Duration,
}

impl WebhookDeliverer {
    /// Build a deliverer with a per-attempt `timeout`. Attempt `n` is
    /// followed by a pause of `n * backoff` before the next one.
    pub fn new(timeout: Duration, max_attempts: u32, backoff: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            max_attempts: max_attempts.max(1),
            backoff,
        })
    }

    /// Deliver `task`, retrying until it succeeds or attempts run out.
    /// Returns the number of attempts used on success.
    pub async fn deliver(&self, task: &DeliveryTask) -> Result<u32, DeliveryError> {
        let url = normalize_uri(&task.uri);
        let mut attempt = 1;
        loop {
            match self.attempt(&url, &task.body).await {
                Ok(()) => {
                    debug!(%url, attempt, "webhook delivered");
                    return Ok(attempt);
                }
                Err(e) if attempt < self.max_attempts => {
                    debug!(%url, attempt, error = %e, "webhook attempt failed, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(%url, attempts = attempt, error = %e, "webhook delivery abandoned");
                    return Err(e);
                }
            }
        }
    }

    async fn attempt(&self, url: &str, body: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(url)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body.to_owned())
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Status(status))
        }
    }
}

/// Prefix `http://` when `uri` has no scheme.
#[must_use]
pub fn normalize_uri(uri: &str) -> String {
    if uri.contains("://") {
        uri.to_owned()
    } else {
        format!("http://{uri}")
    }
}
