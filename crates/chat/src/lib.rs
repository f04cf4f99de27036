//! Chat webhook infrastructure adapter.
//!
//! Implements [`relay::ChatDelivery`] by POSTing the serialised
//! [`relay::ChatMessage`] as JSON to a Slack-compatible incoming-webhook URL.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport and status handling live here. Each message
//! is sent exactly once; a failed POST is reported, never retried.

use std::time::Duration;

use async_trait::async_trait;
use relay::{ChatDelivery, ChatMessage, DeliveryError};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors raised while constructing a [`WebhookClient`].
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The URL has no `http://` or `https://` scheme.
    #[error("webhook URL '{0}' must start with http:// or https://")]
    InvalidUrl(String),

    /// The TLS backend could not be initialised.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Incoming-webhook client bound to one target URL.
#[derive(Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    url: String,
}

impl WebhookClient {
    /// Creates a client posting to `url`, failing each request after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, WebhookError> {
        let url = url.into();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(WebhookError::InvalidUrl(url));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url })
    }
}

// The webhook URL embeds its secret; keep it out of debug output.
impl std::fmt::Debug for WebhookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookClient").finish_non_exhaustive()
    }
}

#[async_trait]
impl ChatDelivery for WebhookClient {
    #[instrument(skip_all)]
    async fn deliver(&self, message: &ChatMessage) -> Result<(), DeliveryError> {
        let response = self
            .http
            .post(&self.url)
            .json(message)
            .send()
            .await
            .map_err(|e| DeliveryError::Network {
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "webhook accepted message");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
