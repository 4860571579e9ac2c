use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::time::Instant;

/// Last known response for one URL.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Monotonic receive time; drives staleness ordering.
    pub fetched_at: Instant,
    /// Wall-clock receive time; stamped onto price history.
    pub timestamp: DateTime<Utc>,
    /// Decoded response body.
    pub response: Arc<Value>,
}

impl CacheEntry {
    /// Entry for a response received now.
    #[must_use]
    pub fn now(response: Value) -> Self {
        Self {
            fetched_at: Instant::now(),
            timestamp: Utc::now(),
            response: Arc::new(response),
        }
    }
}

/// Per-provider map from URL to its last response.
///
/// No expiry is enforced here; the scheduler decides what is stale.
#[derive(Debug, Default, Clone)]
pub struct RequestCache {
    entries: HashMap<String, CacheEntry>,
}

impl RequestCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `url`, if any.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<&CacheEntry> {
        self.entries.get(url)
    }

    /// Store `entry` for `url`, replacing any previous one.
    pub fn put(&mut self, url: impl Into<String>, entry: CacheEntry) {
        self.entries.insert(url.into(), entry);
    }

    /// Remove the entry for `url`.
    pub fn delete(&mut self, url: &str) -> Option<CacheEntry> {
        self.entries.remove(url)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether `url` has an entry.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    /// Number of cached URLs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Among `urls`, the cached one with the oldest receive time.
    ///
    /// Ties go to the URL listed first.
    #[must_use]
    pub fn oldest<'a>(&self, urls: &'a [String]) -> Option<&'a str> {
        let mut best: Option<(&'a str, Instant)> = None;
        for url in urls {
            let Some(entry) = self.entries.get(url) else {
                continue;
            };
            match best {
                Some((_, at)) if at <= entry.fetched_at => {}
                _ => best = Some((url.as_str(), entry.fetched_at)),
            }
        }
        best.map(|(url, _)| url)
    }
}
