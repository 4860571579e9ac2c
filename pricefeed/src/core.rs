use std::sync::Arc;
use std::time::Duration;

use pricefeed_core::{
    CircuitBreakerConfig, PollConfig, PollError, ProviderAdapter, RetryConfig, Subscriber,
    Transport,
};
use pricefeed_guard::{GuardSnapshot, HealthRegistry};

use crate::registry::ProviderRegistry;
use crate::router::PollScheduler;

/// Polling engine: one scheduler per registered provider, sharing a
/// transport and a health registry.
pub struct PriceFeed {
    pub(crate) registry: ProviderRegistry,
    pub(crate) schedulers: Vec<PollScheduler>,
    pub(crate) health: Arc<HealthRegistry>,
    pub(crate) cfg: PollConfig,
}

/// Builder for constructing a `PriceFeed` with custom configuration.
pub struct PriceFeedBuilder {
    providers: Vec<Arc<dyn ProviderAdapter>>,
    transport: Option<Arc<dyn Transport>>,
    cfg: PollConfig,
}

impl Default for PriceFeedBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceFeedBuilder {
    /// Create a new builder with default [`PollConfig`].
    ///
    /// Starts with no providers and no transport; both are required.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: vec![],
            transport: None,
            cfg: PollConfig::default(),
        }
    }

    /// Register a provider adapter.
    ///
    /// Behavior and trade-offs:
    /// - An adapter whose interval is below the configured minimum is
    ///   skipped at build time with a warning.
    /// - A second adapter with an already registered key is skipped; the
    ///   first one wins.
    #[must_use]
    pub fn with_provider(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.providers.push(adapter);
        self
    }

    /// Register several provider adapters in order.
    #[must_use]
    pub fn with_providers(
        mut self,
        adapters: impl IntoIterator<Item = Arc<dyn ProviderAdapter>>,
    ) -> Self {
        self.providers.extend(adapters);
        self
    }

    /// Set the HTTP transport shared by every provider.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: PollConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the `User-Agent` sent with every request.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.cfg.user_agent = user_agent.into();
        self
    }

    /// Set the per-refresh retry policy.
    ///
    /// Behavior and trade-offs:
    /// - More attempts ride out brief outages but delay the error callback.
    /// - Jitter spreads retries of providers that failed together.
    #[must_use]
    pub const fn retry(mut self, retry: RetryConfig) -> Self {
        self.cfg.retry = retry;
        self
    }

    /// Set the per-provider circuit breaker thresholds.
    #[must_use]
    pub const fn circuit_breaker(mut self, cb: CircuitBreakerConfig) -> Self {
        self.cfg.circuit_breaker = cb;
        self
    }

    /// How long a rate-limit response silences its provider.
    #[must_use]
    pub fn permanent_error_ttl(mut self, ttl: Duration) -> Self {
        self.cfg.permanent_error_ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Points kept per ticker in price history.
    #[must_use]
    pub const fn history_capacity(mut self, capacity: usize) -> Self {
        self.cfg.history_capacity = capacity;
        self
    }

    /// Build the `PriceFeed`. All schedulers start idle.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if no transport was set or no provider
    /// survived validation.
    pub fn build(self) -> Result<PriceFeed, PollError> {
        let Some(transport) = self.transport else {
            return Err(PollError::InvalidConfig(
                "no transport configured; set one via transport(...)".to_string(),
            ));
        };

        let health = Arc::new(HealthRegistry::new(self.cfg.circuit_breaker));
        let mut registry = ProviderRegistry::new();
        let mut schedulers = Vec::new();

        for adapter in self.providers {
            let key = adapter.key();
            if registry.contains(key.as_str()) {
                #[cfg(feature = "tracing")]
                tracing::warn!(provider = %key, "duplicate provider key, keeping the first");
                continue;
            }
            if let Err(_e) = PollScheduler::validate_interval(adapter.as_ref(), &self.cfg) {
                #[cfg(feature = "tracing")]
                tracing::warn!(provider = %key, error = %_e, "skipping provider");
                continue;
            }
            let scheduler = PollScheduler::new(
                Arc::clone(&adapter),
                Arc::clone(&transport),
                health.guard(key),
                &self.cfg,
            )?;
            registry.register(adapter)?;
            schedulers.push(scheduler);
        }

        if schedulers.is_empty() {
            return Err(PollError::InvalidConfig(
                "no usable providers registered; add at least one via with_provider(...)"
                    .to_string(),
            ));
        }

        schedulers.sort_by_key(PollScheduler::key);

        Ok(PriceFeed {
            registry,
            schedulers,
            health,
            cfg: self.cfg,
        })
    }
}

impl PriceFeed {
    /// Start building a new `PriceFeed`.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use pricefeed::PriceFeed;
    /// use pricefeed_exchanges::{ReqwestTransport, all_providers};
    ///
    /// let feed = PriceFeed::builder()
    ///     .with_providers(all_providers())
    ///     .transport(Arc::new(ReqwestTransport::new()?))
    ///     .user_agent("my-app/1.0")
    ///     .build()?;
    /// feed.set_subscribers(&subscribers);
    /// ```
    #[must_use]
    pub fn builder() -> PriceFeedBuilder {
        PriceFeedBuilder::new()
    }

    /// Replace the global subscriber set.
    ///
    /// Subscribers naming an unregistered provider are dropped with a
    /// warning; the rest are handed to every scheduler, each of which keeps
    /// its own. Calling again with the same list is harmless.
    pub fn set_subscribers(&self, subscribers: &[Arc<dyn Subscriber>]) {
        let valid: Vec<Arc<dyn Subscriber>> = subscribers
            .iter()
            .filter(|s| match self.registry.lookup(&s.options().api) {
                Ok(_) => true,
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %_e, "dropping subscription");
                    false
                }
            })
            .cloned()
            .collect();

        for scheduler in &self.schedulers {
            scheduler.set_subscribers(&valid);
        }
    }

    /// Scheduler serving `api`.
    #[must_use]
    pub fn scheduler(&self, api: &str) -> Option<&PollScheduler> {
        self.schedulers.iter().find(|s| s.key().matches(api))
    }

    /// Every scheduler, ordered by provider key.
    #[must_use]
    pub fn schedulers(&self) -> &[PollScheduler] {
        &self.schedulers
    }

    /// The provider table.
    #[must_use]
    pub const fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Circuit breaker and rate-limit state of every provider.
    #[must_use]
    pub fn health(&self) -> Vec<GuardSnapshot> {
        self.health.snapshot()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PollConfig {
        &self.cfg
    }

    /// Stop every scheduler and reset provider health.
    pub fn shutdown(&self) {
        for scheduler in &self.schedulers {
            scheduler.stop();
        }
        self.health.reset_all();
    }
}

impl std::fmt::Debug for PriceFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceFeed")
            .field("registry", &self.registry)
            .field("schedulers", &self.schedulers)
            .finish_non_exhaustive()
    }
}

impl Drop for PriceFeed {
    fn drop(&mut self) {
        self.shutdown();
    }
}
