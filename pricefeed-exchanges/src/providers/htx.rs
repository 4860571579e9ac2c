use std::time::Duration;

use serde_json::Value;

use pricefeed_core::{PollError, ProviderAdapter, ProviderKey, Ticker};

use crate::util::{CAUTIOUS_INTERVAL_SECS, field, first, price};

/// HTX merged market detail; reports the best bid.
#[derive(Debug, Clone, Copy, Default)]
pub struct Htx;

impl Htx {
    /// Registry key.
    pub const KEY: ProviderKey = ProviderKey::new("htx");
}

impl ProviderAdapter for Htx {
    fn key(&self) -> ProviderKey {
        Self::KEY
    }

    fn name(&self) -> &'static str {
        "HTX"
    }

    // 100 requests per 10 seconds per key.
    fn interval(&self) -> Duration {
        Duration::from_secs(CAUTIOUS_INTERVAL_SECS)
    }

    fn build_request_url(&self, ticker: &Ticker) -> String {
        format!(
            "https://api.htx.com/market/detail/merged?symbol={}{}",
            ticker.base, ticker.quote
        )
        .to_lowercase()
    }

    fn extract_price(&self, response: &Value, ticker: &Ticker) -> Result<f64, PollError> {
        if response.get("status").and_then(Value::as_str) == Some("error") {
            let msg = response
                .get("err-msg")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(PollError::api(msg));
        }
        let symbol = format!("{}{}", ticker.base, ticker.quote).to_lowercase();
        let tick = field(response, "tick", "symbol", &symbol)?;
        let bid = field(tick, "bid", "symbol", &symbol)?;
        price(first(bid, "symbol", &symbol)?, "bid", &symbol)
    }

    fn default_ticker(&self) -> Ticker {
        Ticker::new("btc", "usdt")
    }

    fn api_docs(&self) -> &'static [(&'static str, &'static str)] {
        &[("API Docs", "https://www.htx.com/en-us/opend/newApiPages/")]
    }
}
