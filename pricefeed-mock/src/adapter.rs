use std::time::Duration;

use serde_json::{Map, Value};

use pricefeed_core::{PollError, ProviderAdapter, ProviderKey, Ticker};

/// Adapter over a fictional exchange.
///
/// One URL per base asset; the body lists rates against every quote:
/// `{"rates": {"USD": 64000.5, "EUR": "59000.1"}}`. Tickers sharing a base
/// therefore share a request.
#[derive(Debug, Clone)]
pub struct MockAdapter {
    key: &'static str,
    name: &'static str,
    interval: Duration,
}

impl MockAdapter {
    /// Adapter registered under `key` polling every `interval_secs`.
    #[must_use]
    pub const fn new(key: &'static str, interval_secs: u64) -> Self {
        Self {
            key,
            name: "MockExchange",
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Override the display name used in error context.
    #[must_use]
    pub const fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// URL this adapter builds for `base`.
    #[must_use]
    pub fn url_for(&self, base: &str) -> String {
        format!("https://mock.exchange/{}/rates?base={}", self.key, base.to_uppercase())
    }

    /// Response body quoting each `(quote, price)` pair.
    #[must_use]
    pub fn rates_response(rates: &[(&str, f64)]) -> Value {
        let map: Map<String, Value> = rates
            .iter()
            .map(|(quote, price)| ((*quote).to_string(), Value::from(*price)))
            .collect();
        serde_json::json!({ "rates": map })
    }
}

impl ProviderAdapter for MockAdapter {
    fn key(&self) -> ProviderKey {
        ProviderKey::new(self.key)
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn build_request_url(&self, ticker: &Ticker) -> String {
        self.url_for(&ticker.base)
    }

    fn extract_price(&self, response: &Value, ticker: &Ticker) -> Result<f64, PollError> {
        let quote = ticker.quote.to_uppercase();
        match response.get("rates").and_then(|r| r.get(&quote)) {
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| PollError::no_data("rate", &quote)),
            Some(Value::String(s)) => s
                .parse::<f64>()
                .map_err(|_| PollError::no_data("rate", &quote)),
            _ => Err(PollError::no_data("rate", &quote)),
        }
    }

    fn default_ticker(&self) -> Ticker {
        Ticker::new("BTC", "USD")
    }
}
