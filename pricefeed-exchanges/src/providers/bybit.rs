use std::time::Duration;

use serde_json::Value;

use pricefeed_core::{PollError, ProviderAdapter, ProviderKey, Ticker};

use crate::util::{STANDARD_INTERVAL_SECS, field, first, format_symbol, price, with_query};

const DOCS: &[(&str, &str)] = &[
    (
        "API Docs",
        "https://bybit-exchange.github.io/docs/v5/market/tickers",
    ),
    ("Symbols", "https://bybit-exchange.github.io/docs/v5/enum#symbol"),
];

/// Bybit v5 market tickers, parameterized by trading category.
#[derive(Debug, Clone, Copy)]
pub struct Bybit {
    key: ProviderKey,
    name: &'static str,
    category: &'static str,
}

impl Bybit {
    /// Registry key for spot.
    pub const SPOT_KEY: ProviderKey = ProviderKey::new("bybit");
    /// Registry key for linear perpetuals.
    pub const PERPETUAL_KEY: ProviderKey = ProviderKey::new("bybitPerpetual");

    /// Spot market.
    #[must_use]
    pub const fn spot() -> Self {
        Self {
            key: Self::SPOT_KEY,
            name: "Bybit",
            category: "spot",
        }
    }

    /// Linear perpetual contracts.
    #[must_use]
    pub const fn perpetual() -> Self {
        Self {
            key: Self::PERPETUAL_KEY,
            name: "Bybit Perpetual",
            category: "linear",
        }
    }
}

impl ProviderAdapter for Bybit {
    fn key(&self) -> ProviderKey {
        self.key
    }

    fn name(&self) -> &'static str {
        self.name
    }

    // No more than 120 requests in any 5-second window.
    fn interval(&self) -> Duration {
        Duration::from_secs(STANDARD_INTERVAL_SECS)
    }

    fn build_request_url(&self, ticker: &Ticker) -> String {
        let symbol = format_symbol(&ticker.base, &ticker.quote);
        with_query(
            "https://api.bybit.com/v5/market/tickers",
            &[("category", self.category), ("symbol", &symbol)],
        )
    }

    fn extract_price(&self, response: &Value, ticker: &Ticker) -> Result<f64, PollError> {
        let symbol = format_symbol(&ticker.base, &ticker.quote);
        match response.get("retMsg").and_then(Value::as_str) {
            Some("OK") => {}
            Some(msg) => return Err(PollError::api(msg)),
            None => return Err(PollError::api("unknown error")),
        }
        let list = field(field(response, "result", "symbol", &symbol)?, "list", "symbol", &symbol)?;
        let entry = first(list, "symbol", &symbol)?;
        price(field(entry, "lastPrice", "symbol", &symbol)?, "lastPrice", &symbol)
    }

    fn default_ticker(&self) -> Ticker {
        Ticker::new("BTC", "USDT")
    }

    fn api_docs(&self) -> &'static [(&'static str, &'static str)] {
        DOCS
    }
}
