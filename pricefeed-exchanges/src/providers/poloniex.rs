use std::time::Duration;

use serde_json::Value;

use pricefeed_core::{PollError, ProviderAdapter, ProviderKey, Ticker};

use crate::util::{STANDARD_INTERVAL_SECS, field, price};

const TICKER_URL: &str = "https://api.poloniex.com/markets/ticker24h";

/// Poloniex 24h tickers. One request serves every pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct Poloniex;

impl Poloniex {
    /// Registry key.
    pub const KEY: ProviderKey = ProviderKey::new("poloniex");
}

impl ProviderAdapter for Poloniex {
    fn key(&self) -> ProviderKey {
        Self::KEY
    }

    fn name(&self) -> &'static str {
        "Poloniex"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(STANDARD_INTERVAL_SECS)
    }

    fn build_request_url(&self, _ticker: &Ticker) -> String {
        TICKER_URL.to_string()
    }

    fn extract_price(&self, response: &Value, ticker: &Ticker) -> Result<f64, PollError> {
        let pair = format!("{}_{}", ticker.base, ticker.quote);
        let entry = response
            .as_array()
            .and_then(|all| {
                all.iter()
                    .find(|t| t.get("symbol").and_then(Value::as_str) == Some(pair.as_str()))
            })
            .ok_or_else(|| PollError::no_data("pair", &pair))?;
        price(field(entry, "close", "pair", &pair)?, "pair", &pair)
    }

    fn default_ticker(&self) -> Ticker {
        Ticker::new("BTC", "USDT")
    }

    fn api_docs(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("API Docs", "https://api-docs.poloniex.com/"),
            (
                "Market Data",
                "https://api-docs.poloniex.com/spot/api/public/market-data",
            ),
        ]
    }
}
