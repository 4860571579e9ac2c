use std::sync::Arc;

use pricefeed_core::{ProviderAdapter, ProviderKey, Subscriber, Ticker};

/// One subscriber resolved against its provider.
#[derive(Clone)]
pub struct Subscription {
    /// The registered listener.
    pub subscriber: Arc<dyn Subscriber>,
    /// Effective ticker (the adapter's default fills a blank base or quote).
    pub ticker: Ticker,
    /// URL the adapter builds for `ticker`.
    pub url: String,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("api", &self.subscriber.options().api)
            .field("ticker", &self.ticker)
            .field("url", &self.url)
            .finish()
    }
}

/// Criteria for [`SubscriptionSet::filter`]. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Filter<'a> {
    /// Provider whose key the subscriber's `api` must match.
    pub provider: Option<ProviderKey>,
    /// Resolved request URL.
    pub url: Option<&'a str>,
    /// Resolved ticker.
    pub ticker: Option<&'a Ticker>,
}

impl<'a> Filter<'a> {
    /// Match everything.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            provider: None,
            url: None,
            ticker: None,
        }
    }

    /// Restrict to subscribers whose `api` names `key`.
    #[must_use]
    pub const fn provider(mut self, key: ProviderKey) -> Self {
        self.provider = Some(key);
        self
    }

    /// Restrict to subscribers polling `url`.
    #[must_use]
    pub const fn url(mut self, url: &'a str) -> Self {
        self.url = Some(url);
        self
    }

    /// Restrict to subscribers of `ticker`.
    #[must_use]
    pub const fn ticker(mut self, ticker: &'a Ticker) -> Self {
        self.ticker = Some(ticker);
        self
    }

    fn matches(&self, s: &Subscription) -> bool {
        self.provider
            .is_none_or(|key| key.matches(&s.subscriber.options().api))
            && self.url.is_none_or(|url| s.url == url)
            && self.ticker.is_none_or(|t| &s.ticker == t)
    }
}

/// The subscribers one provider serves, with their derived URL set.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionSet {
    entries: Vec<Subscription>,
    urls: Vec<String>,
}

impl SubscriptionSet {
    /// Keep the subscribers of `all` whose `api` names `adapter`, resolving
    /// each to its ticker and URL.
    #[must_use]
    pub fn for_provider(all: &[Arc<dyn Subscriber>], adapter: &dyn ProviderAdapter) -> Self {
        let key = adapter.key();
        let entries: Vec<Subscription> = all
            .iter()
            .filter(|s| key.matches(&s.options().api))
            .map(|s| {
                let ticker = effective_ticker(s.as_ref(), adapter);
                let url = adapter.build_request_url(&ticker);
                Subscription {
                    subscriber: Arc::clone(s),
                    ticker,
                    url,
                }
            })
            .collect();

        let mut urls: Vec<String> = Vec::new();
        for e in &entries {
            if !urls.contains(&e.url) {
                urls.push(e.url.clone());
            }
        }
        Self { entries, urls }
    }

    /// Distinct URLs in first-seen order.
    #[must_use]
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Distinct tickers served by `url`, in first-seen order.
    #[must_use]
    pub fn tickers_for(&self, url: &str) -> Vec<Ticker> {
        let mut out: Vec<Ticker> = Vec::new();
        for e in self.entries.iter().filter(|e| e.url == url) {
            if !out.contains(&e.ticker) {
                out.push(e.ticker.clone());
            }
        }
        out
    }

    /// Subscribers matching `filter`.
    #[must_use]
    pub fn filter(&self, filter: &Filter<'_>) -> Vec<Arc<dyn Subscriber>> {
        self.entries
            .iter()
            .filter(|e| filter.matches(e))
            .map(|e| Arc::clone(&e.subscriber))
            .collect()
    }

    /// All resolved entries.
    #[must_use]
    pub fn entries(&self) -> &[Subscription] {
        &self.entries
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the provider has no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn effective_ticker(s: &dyn Subscriber, adapter: &dyn ProviderAdapter) -> Ticker {
    let opts = s.options();
    if opts.base.is_empty() || opts.quote.is_empty() {
        let fallback = adapter.default_ticker();
        Ticker::new(
            if opts.base.is_empty() { fallback.base } else { opts.base.clone() },
            if opts.quote.is_empty() { fallback.quote } else { opts.quote.clone() },
        )
    } else {
        opts.ticker()
    }
}
