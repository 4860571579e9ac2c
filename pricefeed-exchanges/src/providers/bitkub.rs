use std::time::Duration;

use serde_json::Value;

use pricefeed_core::{PollError, ProviderAdapter, ProviderKey, Ticker};

use crate::util::{RELAXED_INTERVAL_SECS, field, price};

/// Bitkub market ticker. Pairs are written quote first, e.g. `THB_BTC`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bitkub;

impl Bitkub {
    /// Registry key.
    pub const KEY: ProviderKey = ProviderKey::new("bitkub");

    fn symbol(ticker: &Ticker) -> String {
        format!("{}_{}", ticker.quote, ticker.base).to_uppercase()
    }
}

impl ProviderAdapter for Bitkub {
    fn key(&self) -> ProviderKey {
        Self::KEY
    }

    fn name(&self) -> &'static str {
        "Bitkub"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(RELAXED_INTERVAL_SECS)
    }

    fn build_request_url(&self, ticker: &Ticker) -> String {
        format!(
            "https://api.bitkub.com/api/market/ticker?sym={}",
            Self::symbol(ticker)
        )
    }

    fn extract_price(&self, response: &Value, ticker: &Ticker) -> Result<f64, PollError> {
        let key = Self::symbol(ticker);
        let entry = field(response, &key, "pair", &key)?;
        price(field(entry, "last", "pair", &key)?, "pair", &key)
    }

    fn default_ticker(&self) -> Ticker {
        Ticker::new("BTC", "THB")
    }

    fn api_docs(&self) -> &'static [(&'static str, &'static str)] {
        &[(
            "API Docs",
            "https://github.com/bitkub/bitkub-official-api-docs/blob/master/restful-api.md#get-apimarketbids",
        )]
    }
}
