use std::sync::Arc;

use pricefeed_core::{
    CacheEntry, ErrorContext, GenerationToken, PollError, PricePoint, Subscriber, Ticker,
    is_rate_limited, wrap_with_context,
};

use super::backoff::retry_delay;
use super::controller::SchedulerShared;
use crate::router::fanout::fan_out;
use crate::router::subscriptions::Filter;

type TickerOutcome = (Ticker, Vec<Arc<dyn Subscriber>>, Result<Vec<PricePoint>, PollError>);

impl SchedulerShared {
    fn url_subscribers(&self, url: &str) -> Vec<Arc<dyn Subscriber>> {
        self.lock().subscriptions.filter(&Filter::any().url(url))
    }

    /// Deliver `error` to every current subscriber of `url`.
    pub(super) fn dispatch_error(&self, url: &str, error: &PollError) {
        let subs = self.url_subscribers(url);
        fan_out(&subs, |s| s.on_update_error(error, None));
    }

    /// Extract, record, and fan out one price per ticker served by `url`.
    ///
    /// A ticker whose extraction fails gets its own error; the others are
    /// still delivered.
    pub(super) fn dispatch_response(&self, url: &str, entry: &CacheEntry) {
        let mut outcomes: Vec<TickerOutcome> = Vec::new();
        {
            let mut guard = self.lock();
            let st = &mut *guard;
            for ticker in st.subscriptions.tickers_for(url) {
                let subs = st
                    .subscriptions
                    .filter(&Filter::any().url(url).ticker(&ticker));
                let result = self
                    .adapter
                    .extract_price(&entry.response, &ticker)
                    .and_then(|value| st.history.add_value(&ticker, entry.timestamp, value));
                outcomes.push((ticker, subs, result));
            }
        }

        for (ticker, subs, result) in outcomes {
            match result {
                Ok(history) => {
                    fan_out(&subs, |s| s.on_update_price_data(&history));
                }
                Err(e) => {
                    let ctx = ErrorContext::new()
                        .provider(self.adapter.name())
                        .ticker(&ticker)
                        .url(url);
                    let wrapped = wrap_with_context(e, &ctx);
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        provider = %self.adapter.key(),
                        %url,
                        pair = %ticker,
                        error = ?wrapped,
                        "price extraction failed"
                    );
                    fan_out(&subs, |s| s.on_update_error(&wrapped, Some(&ticker)));
                }
            }
        }
    }

    /// One refresh of `url` under generation `token`.
    ///
    /// Every effect after an await is skipped once `token` is stale.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "pricefeed::scheduler::refresh",
            skip(self, cached, token),
            fields(provider = %self.adapter.key(), cached = cached.is_some()),
        )
    )]
    pub(super) async fn refresh(&self, url: &str, cached: Option<CacheEntry>, token: GenerationToken) {
        if !self.generation.is_current(token) {
            return;
        }
        if let Some(entry) = cached {
            self.dispatch_response(url, &entry);
            return;
        }

        fan_out(&self.url_subscribers(url), |s| s.on_update_start());

        if let Some(error) = self.guard.permanent_error() {
            self.dispatch_error(url, &error);
            return;
        }
        if self.guard.is_open() {
            let error = PollError::ProviderDisabled {
                provider: self.adapter.name().to_string(),
            };
            self.dispatch_error(url, &error);
            return;
        }

        let ctx = ErrorContext::new().provider(self.adapter.name()).url(url);
        let retry = self.config.retry;
        let max_attempts = retry.max_attempts.max(1);

        for attempt in 0..max_attempts {
            let result = self
                .transport
                .fetch_json(url, &self.config.user_agent)
                .await;
            if !self.generation.is_current(token) {
                return;
            }

            let err = match result {
                Ok(body) => {
                    let entry = CacheEntry::now(body);
                    let committed = self.commit(token, |st| {
                        st.cache.put(url, entry.clone());
                        self.guard.record_success();
                    });
                    if committed.is_some() {
                        self.dispatch_response(url, &entry);
                    }
                    return;
                }
                Err(err) => err,
            };

            if is_rate_limited(&err) {
                let wrapped = wrap_with_context(err, &ctx);
                let committed = self.commit(token, |st| {
                    self.guard
                        .set_permanent_error(wrapped.clone(), self.config.permanent_error_ttl());
                    st.cache.delete(url);
                });
                if committed.is_some() {
                    self.dispatch_error(url, &wrapped);
                }
                return;
            }

            if attempt + 1 < max_attempts {
                let delay = retry_delay(&retry, attempt);
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    error = %err,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    attempt = attempt + 1,
                    max_attempts,
                    "request failed, retrying"
                );
                tokio::time::sleep(delay).await;
                if !self.generation.is_current(token) {
                    return;
                }
            } else {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %err, attempts = max_attempts, "refresh failed");
                let committed = self.commit(token, |st| {
                    self.guard.record_failure();
                    st.cache.delete(url);
                });
                if committed.is_some() {
                    self.dispatch_error(url, &wrap_with_context(err, &ctx));
                }
            }
        }
    }
}
