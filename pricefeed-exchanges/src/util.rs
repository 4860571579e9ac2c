//! Helpers shared by the exchange adapters.

use serde_json::Value;
use url::form_urlencoded;

use pricefeed_core::PollError;

/// Poll interval for exchanges with generous public limits.
pub const STANDARD_INTERVAL_SECS: u64 = 10;
/// Poll interval for exchanges with tighter or undocumented limits.
pub const CAUTIOUS_INTERVAL_SECS: u64 = 15;
/// Poll interval for slow-moving reference rates.
pub const RELAXED_INTERVAL_SECS: u64 = 60;

/// `base` and `quote` concatenated and uppercased, e.g. `BTCUSDT`.
#[must_use]
pub fn format_symbol(base: &str, quote: &str) -> String {
    format!("{base}{quote}").to_uppercase()
}

/// `base?k=v&...` with form-encoded parameters.
#[must_use]
pub fn with_query(base: &str, params: &[(&str, &str)]) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{base}?{query}")
}

/// Look up `key` in an object, failing with "no data for {field} {value}".
pub fn field<'a>(
    value: &'a Value,
    key: &str,
    field: &str,
    label: &str,
) -> Result<&'a Value, PollError> {
    value
        .get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| PollError::no_data(field, label))
}

/// A price carried either as a JSON number or a numeric string.
pub fn price(value: &Value, field: &str, label: &str) -> Result<f64, PollError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| PollError::no_data(field, label)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| PollError::parse(format!("invalid number {s:?} for {field} {label}"))),
        _ => Err(PollError::no_data(field, label)),
    }
}

/// First element of a JSON array.
pub fn first<'a>(value: &'a Value, field: &str, label: &str) -> Result<&'a Value, PollError> {
    value
        .as_array()
        .and_then(|a| a.first())
        .ok_or_else(|| PollError::no_data(field, label))
}
