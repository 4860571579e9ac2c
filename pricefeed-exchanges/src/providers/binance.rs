use std::time::Duration;

use serde_json::Value;

use pricefeed_core::{PollError, ProviderAdapter, ProviderKey, Ticker};

use crate::util::{CAUTIOUS_INTERVAL_SECS, field, format_symbol, price};

fn last_price(response: &Value, ticker: &Ticker) -> Result<f64, PollError> {
    let symbol = format_symbol(&ticker.base, &ticker.quote);
    if let Some(msg) = response.get("msg").and_then(Value::as_str) {
        return Err(PollError::api(msg));
    }
    price(field(response, "price", "price", &symbol)?, "price", &symbol)
}

/// Binance spot symbol price ticker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Binance;

impl Binance {
    /// Registry key.
    pub const KEY: ProviderKey = ProviderKey::new("binance");
}

impl ProviderAdapter for Binance {
    fn key(&self) -> ProviderKey {
        Self::KEY
    }

    fn name(&self) -> &'static str {
        "Binance"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(CAUTIOUS_INTERVAL_SECS)
    }

    fn build_request_url(&self, ticker: &Ticker) -> String {
        format!(
            "https://api.binance.com/api/v3/ticker/price?symbol={}",
            format_symbol(&ticker.base, &ticker.quote)
        )
    }

    fn extract_price(&self, response: &Value, ticker: &Ticker) -> Result<f64, PollError> {
        last_price(response, ticker)
    }

    fn default_ticker(&self) -> Ticker {
        Ticker::new("BTC", "USDT")
    }

    fn api_docs(&self) -> &'static [(&'static str, &'static str)] {
        &[(
            "API Docs",
            "https://binance-docs.github.io/apidocs/spot/en/#symbol-price-ticker",
        )]
    }
}

/// Binance USD-M futures symbol price ticker.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinanceFutures;

impl BinanceFutures {
    /// Registry key.
    pub const KEY: ProviderKey = ProviderKey::new("binanceFutures");
}

impl ProviderAdapter for BinanceFutures {
    fn key(&self) -> ProviderKey {
        Self::KEY
    }

    fn name(&self) -> &'static str {
        "Binance Futures"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(CAUTIOUS_INTERVAL_SECS)
    }

    fn build_request_url(&self, ticker: &Ticker) -> String {
        format!(
            "https://fapi.binance.com/fapi/v1/ticker/price?symbol={}",
            format_symbol(&ticker.base, &ticker.quote)
        )
    }

    fn extract_price(&self, response: &Value, ticker: &Ticker) -> Result<f64, PollError> {
        last_price(response, ticker)
    }

    fn default_ticker(&self) -> Ticker {
        Ticker::new("BTC", "USDT")
    }

    fn api_docs(&self) -> &'static [(&'static str, &'static str)] {
        &[(
            "API Docs",
            "https://binance-docs.github.io/apidocs/futures/en/#24hr-ticker-price-change-statistics-market_data",
        )]
    }
}
