//! Trading pairs, subscription requests, and price points.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A canonical trading pair.
///
/// Equality and hashing are by value, so two tickers built from the same
/// base and quote are interchangeable as map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ticker {
    /// Base asset, e.g. `BTC`.
    pub base: String,
    /// Quote asset, e.g. `USD`.
    pub quote: String,
}

impl Ticker {
    /// Build a ticker from its two legs.
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Default display attribute for new subscriptions.
pub const DEFAULT_ATTRIBUTE: &str = "last";
/// Default display format for new subscriptions.
pub const DEFAULT_FORMAT: &str = "{v} {qs}";

/// A subscriber's declared interest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionOptions {
    /// Provider key; must name a registered provider.
    pub api: String,
    /// Base asset.
    pub base: String,
    /// Quote asset.
    pub quote: String,
    /// Which price attribute the subscriber displays.
    pub attribute: String,
    /// Display format template. Opaque to the engine.
    pub format: String,
}

impl SubscriptionOptions {
    /// Options for `base/quote` on `api` with default attribute and format.
    pub fn new(api: impl Into<String>, base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            api: api.into(),
            base: base.into(),
            quote: quote.into(),
            attribute: DEFAULT_ATTRIBUTE.to_string(),
            format: DEFAULT_FORMAT.to_string(),
        }
    }

    /// The ticker this subscription resolves to.
    #[must_use]
    pub fn ticker(&self) -> Ticker {
        Ticker::new(self.base.clone(), self.quote.clone())
    }
}

/// One observed price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// When the response carrying this value was received.
    pub timestamp: DateTime<Utc>,
    /// The price.
    pub value: f64,
}
