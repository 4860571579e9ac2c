use std::time::Duration;

use serde_json::Value;

use pricefeed_core::{PollError, ProviderAdapter, ProviderKey, Ticker};

use crate::util::{RELAXED_INTERVAL_SECS, field, price};

/// BitPay reference rates for one base currency.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitPay;

impl BitPay {
    /// Registry key.
    pub const KEY: ProviderKey = ProviderKey::new("bitpay");
}

impl ProviderAdapter for BitPay {
    fn key(&self) -> ProviderKey {
        Self::KEY
    }

    fn name(&self) -> &'static str {
        "BitPay"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(RELAXED_INTERVAL_SECS)
    }

    fn build_request_url(&self, ticker: &Ticker) -> String {
        format!("https://bitpay.com/api/rates/{}", ticker.base)
    }

    fn extract_price(&self, response: &Value, ticker: &Ticker) -> Result<f64, PollError> {
        // Older deployments wrap the list in `data`.
        let rates = response
            .as_array()
            .or_else(|| response.get("data").and_then(Value::as_array))
            .ok_or_else(|| PollError::no_data("quote", &ticker.quote))?;
        let entry = rates
            .iter()
            .find(|r| r.get("code").and_then(Value::as_str) == Some(ticker.quote.as_str()))
            .ok_or_else(|| PollError::no_data("quote", &ticker.quote))?;
        price(field(entry, "rate", "quote", &ticker.quote)?, "quote", &ticker.quote)
    }

    fn api_docs(&self) -> &'static [(&'static str, &'static str)] {
        &[("API Docs", "https://bitpay.com/api")]
    }
}
