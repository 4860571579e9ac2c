use std::time::Duration;

use serde_json::Value;

use pricefeed_core::{PollError, ProviderAdapter, ProviderKey, Ticker};

use crate::util::{CAUTIOUS_INTERVAL_SECS, field, price, with_query};

/// CryptoCompare single-symbol price.
#[derive(Debug, Clone, Copy, Default)]
pub struct CryptoCompare;

impl CryptoCompare {
    /// Registry key.
    pub const KEY: ProviderKey = ProviderKey::new("cryptocompare");
}

impl ProviderAdapter for CryptoCompare {
    fn key(&self) -> ProviderKey {
        Self::KEY
    }

    fn name(&self) -> &'static str {
        "CryptoCompare"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(CAUTIOUS_INTERVAL_SECS)
    }

    fn build_request_url(&self, ticker: &Ticker) -> String {
        with_query(
            "https://min-api.cryptocompare.com/data/price",
            &[("fsym", &ticker.base), ("tsyms", &ticker.quote)],
        )
    }

    fn extract_price(&self, response: &Value, ticker: &Ticker) -> Result<f64, PollError> {
        if response.get("Response").and_then(Value::as_str) == Some("Error") {
            let msg = response
                .get("Message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(PollError::api(msg));
        }
        price(
            field(response, &ticker.quote, "quote", &ticker.quote)?,
            "quote",
            &ticker.quote,
        )
    }

    fn api_docs(&self) -> &'static [(&'static str, &'static str)] {
        &[("API Docs", "https://min-api.cryptocompare.com/documentation")]
    }
}
