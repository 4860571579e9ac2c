use std::time::Duration;

use serde_json::Value;

use pricefeed_core::{PollError, ProviderAdapter, ProviderKey, Ticker};

use crate::util::{STANDARD_INTERVAL_SECS, field, first, format_symbol, price};

/// Kraken public ticker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Kraken;

impl Kraken {
    /// Registry key.
    pub const KEY: ProviderKey = ProviderKey::new("kraken");
}

impl ProviderAdapter for Kraken {
    fn key(&self) -> ProviderKey {
        Self::KEY
    }

    fn name(&self) -> &'static str {
        "Kraken"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(STANDARD_INTERVAL_SECS)
    }

    fn build_request_url(&self, ticker: &Ticker) -> String {
        format!(
            "https://api.kraken.com/0/public/Ticker?pair={}",
            format_symbol(&ticker.base, &ticker.quote)
        )
    }

    fn extract_price(&self, response: &Value, ticker: &Ticker) -> Result<f64, PollError> {
        if let Some(first_err) = response
            .get("error")
            .and_then(Value::as_array)
            .and_then(|errs| errs.first())
        {
            return Err(PollError::api(first_err.as_str().unwrap_or("unknown error")));
        }
        let pair = format_symbol(&ticker.base, &ticker.quote);
        let result = field(response, "result", "pair", &pair)?;
        let entry = field(result, &pair, "pair", &pair)?;
        let close = field(entry, "c", "pair", &pair)?;
        price(first(close, "pair", &pair)?, "pair", &pair)
    }

    fn default_ticker(&self) -> Ticker {
        Ticker::new("XXBT", "ZUSD")
    }

    fn api_docs(&self) -> &'static [(&'static str, &'static str)] {
        &[
            (
                "API Docs",
                "https://www.kraken.com/help/api#public-market-data",
            ),
            (
                "Asset Pairs (JSON)",
                "https://api.kraken.com/0/public/AssetPairs",
            ),
        ]
    }
}
