use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::PollError;
use pricefeed_types::{PricePoint, Ticker};

/// Entries kept per ticker unless configured otherwise.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Bounded per-ticker price series.
///
/// Each ticker keeps at most `capacity` points keyed by timestamp. Snapshots
/// are returned newest first, so timestamps are strictly decreasing.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    capacity: usize,
    series: HashMap<Ticker, BTreeMap<DateTime<Utc>, f64>>,
}

impl Default for PriceHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl PriceHistory {
    /// Create an empty history keeping `capacity` points per ticker (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            series: HashMap::new(),
        }
    }

    /// Record `value` for `ticker` at `timestamp` and return the updated series.
    ///
    /// A second value at an existing timestamp replaces the first. Points
    /// beyond the capacity are evicted oldest first.
    ///
    /// # Errors
    /// Returns `PollError::InvalidValue` for NaN; nothing is recorded.
    pub fn add_value(
        &mut self,
        ticker: &Ticker,
        timestamp: DateTime<Utc>,
        value: f64,
    ) -> Result<Vec<PricePoint>, PollError> {
        if value.is_nan() {
            return Err(PollError::InvalidValue(format!(
                "invalid price value for {ticker}"
            )));
        }
        let series = self.series.entry(ticker.clone()).or_default();
        series.insert(timestamp, value);
        while series.len() > self.capacity {
            series.pop_first();
        }
        Ok(snapshot(series))
    }

    /// Current series for `ticker`, newest first.
    #[must_use]
    pub fn get(&self, ticker: &Ticker) -> Vec<PricePoint> {
        self.series.get(ticker).map(snapshot).unwrap_or_default()
    }

    /// Maximum points kept per ticker.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

fn snapshot(series: &BTreeMap<DateTime<Utc>, f64>) -> Vec<PricePoint> {
    series
        .iter()
        .rev()
        .map(|(timestamp, value)| PricePoint {
            timestamp: *timestamp,
            value: *value,
        })
        .collect()
}
