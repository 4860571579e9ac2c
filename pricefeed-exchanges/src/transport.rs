use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, header};
use serde_json::Value;

use pricefeed_core::{PollError, Transport};

/// Timeout applied to each request by [`ReqwestTransport::new`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `reqwest`-backed [`Transport`].
///
/// `reqwest::Client` is `Clone + Send + Sync`, so no external locking is needed.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Client with [`DEFAULT_REQUEST_TIMEOUT`].
    ///
    /// # Errors
    /// Returns `PollError::InvalidConfig` if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, PollError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PollError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_err(e: &reqwest::Error, url: &str) -> PollError {
    if e.is_timeout() {
        PollError::network(format!("request timed out: {url}"))
    } else if e.is_connect() {
        PollError::network(format!("failed to connect: {url}"))
    } else {
        PollError::network(format!("failed to fetch {url}: {e}"))
    }
}

fn map_status(status: StatusCode, url: &str) -> PollError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return PollError::RateLimited(format!("429 Too Many Requests: {url}"));
    }
    PollError::Http {
        status: status.as_u16(),
        msg: status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string(),
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch_json(&self, url: &str, user_agent: &str) -> Result<Value, PollError> {
        let resp = self
            .client
            .get(url)
            .header(header::USER_AGENT, user_agent)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| map_reqwest_err(&e, url))?;

        let status = resp.status();
        if !status.is_success() {
            #[cfg(feature = "tracing")]
            tracing::debug!(target = "pricefeed::http", %url, status = status.as_u16(), "non-success status");
            return Err(map_status(status, url));
        }

        let body = resp.bytes().await.map_err(|e| map_reqwest_err(&e, url))?;
        serde_json::from_slice(&body).map_err(|e| PollError::InvalidJson(e.to_string()))
    }
}
