use std::time::Duration;

use serde_json::Value;

use pricefeed_core::{PollError, ProviderAdapter, ProviderKey, Ticker};

use crate::util::{RELAXED_INTERVAL_SECS, field, price};

/// Coinbase exchange rates: one request per base, every quote in the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coinbase;

impl Coinbase {
    /// Registry key.
    pub const KEY: ProviderKey = ProviderKey::new("coinbase");
}

impl ProviderAdapter for Coinbase {
    fn key(&self) -> ProviderKey {
        Self::KEY
    }

    fn name(&self) -> &'static str {
        "Coinbase"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(RELAXED_INTERVAL_SECS)
    }

    fn build_request_url(&self, ticker: &Ticker) -> String {
        format!(
            "https://api.coinbase.com/v2/exchange-rates?currency={}",
            ticker.base.to_uppercase()
        )
    }

    fn extract_price(&self, response: &Value, ticker: &Ticker) -> Result<f64, PollError> {
        let rates = response
            .get("data")
            .and_then(|d| d.get("rates"))
            .ok_or_else(|| PollError::parse("invalid response"))?;
        let quote = ticker.quote.to_uppercase();
        price(field(rates, &quote, "quote", &ticker.quote)?, "quote", &ticker.quote)
    }

    fn api_docs(&self) -> &'static [(&'static str, &'static str)] {
        &[(
            "API Docs",
            "https://developers.coinbase.com/api/v2#exchange-rates",
        )]
    }
}
