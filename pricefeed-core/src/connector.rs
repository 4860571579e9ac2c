use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::PollError;
pub use pricefeed_types::ProviderKey;
use pricefeed_types::Ticker;

/// One upstream price source.
///
/// An adapter knows how to address a ticker on its exchange and how to pull
/// the price for that ticker back out of a decoded response. It performs no
/// I/O itself; the engine fetches through a [`Transport`].
pub trait ProviderAdapter: Send + Sync {
    /// Registry key, matched against `SubscriptionOptions::api`.
    fn key(&self) -> ProviderKey;

    /// Human-readable exchange name used in error context (e.g. "Kraken").
    fn name(&self) -> &'static str;

    /// Minimum delay between polls of this provider.
    fn interval(&self) -> Duration;

    /// URL to request for `ticker`.
    ///
    /// Several tickers may map to the same URL; the engine fetches each URL
    /// once per refresh and asks [`extract_price`](Self::extract_price) for
    /// every ticker that shares it.
    fn build_request_url(&self, ticker: &Ticker) -> String;

    /// Extract the price for `ticker` from a decoded response.
    ///
    /// # Errors
    /// Returns `PollError::Parse` when the response is missing the value or
    /// the exchange reported an error in its payload.
    fn extract_price(&self, response: &Value, ticker: &Ticker) -> Result<f64, PollError>;

    /// Ticker offered when a subscriber has not chosen one.
    fn default_ticker(&self) -> Ticker {
        Ticker::new("BTC", "USD")
    }

    /// Short label such as `Kraken ETH/EUR`.
    fn label(&self, ticker: &Ticker) -> String {
        format!("{} {}/{}", self.name(), ticker.base, ticker.quote)
    }

    /// Links to the upstream API documentation as `(title, url)` pairs.
    fn api_docs(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }
}

/// HTTP collaborator performing one GET-and-decode round trip.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url` and decode the body as JSON.
    ///
    /// # Errors
    /// Implementations report `PollError::RateLimited` for explicit rate-limit
    /// responses, `PollError::Network` when no response arrived, and
    /// `PollError::InvalidJson` when the body could not be decoded.
    async fn fetch_json(&self, url: &str, user_agent: &str) -> Result<Value, PollError>;
}
