use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use pricefeed_core::{CircuitBreakerConfig, PollError, ProviderKey};

use crate::breaker::{CircuitBreaker, CircuitState};
use crate::permanent::PermanentError;

/// Point-in-time view of one provider's guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardSnapshot {
    /// Provider key.
    pub provider: ProviderKey,
    /// Breaker state.
    pub state: CircuitState,
    /// Failures since the last success.
    pub failure_count: u32,
    /// Whether a sticky rate-limit error is live.
    pub permanently_failed: bool,
}

/// Circuit breaker and sticky error for one provider.
#[derive(Debug)]
pub struct ProviderGuard {
    key: ProviderKey,
    breaker: Mutex<CircuitBreaker>,
    permanent: PermanentError,
}

impl ProviderGuard {
    /// Fresh guard with a closed breaker.
    #[must_use]
    pub fn new(key: ProviderKey, config: CircuitBreakerConfig) -> Self {
        Self {
            key,
            breaker: Mutex::new(CircuitBreaker::new(config)),
            permanent: PermanentError::new(),
        }
    }

    fn breaker(&self) -> MutexGuard<'_, CircuitBreaker> {
        self.breaker.lock().unwrap_or_else(|poisoned| {
            #[cfg(feature = "tracing")]
            tracing::warn!(provider = %self.key, "circuit breaker mutex poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Provider this guard protects.
    #[must_use]
    pub const fn key(&self) -> ProviderKey {
        self.key
    }

    /// Whether the breaker rejects requests now. May move it to half-open.
    pub fn is_open(&self) -> bool {
        let mut breaker = self.breaker();
        let before = breaker.state();
        let open = breaker.is_open();
        if before != breaker.state() {
            #[cfg(feature = "tracing")]
            tracing::info!(provider = %self.key, "circuit breaker half-open, allowing probe");
        }
        open
    }

    /// Count a failed refresh.
    pub fn record_failure(&self) {
        let mut breaker = self.breaker();
        let before = breaker.state();
        breaker.record_failure();
        if before != CircuitState::Open && breaker.state() == CircuitState::Open {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                provider = %self.key,
                failures = breaker.failure_count(),
                "circuit breaker opened"
            );
        }
    }

    /// Count a successful refresh.
    pub fn record_success(&self) {
        self.breaker().record_success();
    }

    /// Current breaker state.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.breaker().state()
    }

    /// The live sticky error, if any.
    #[must_use]
    pub fn permanent_error(&self) -> Option<PollError> {
        let had = self.permanent.is_set();
        let live = self.permanent.get();
        if had && live.is_none() {
            #[cfg(feature = "tracing")]
            tracing::info!(provider = %self.key, "permanent error expired");
        }
        live
    }

    /// Silence the provider with `error` for `ttl`.
    pub fn set_permanent_error(&self, error: PollError, ttl: Duration) {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            provider = %self.key,
            ttl_secs = ttl.as_secs(),
            error = %error,
            "provider rate limited, pausing requests"
        );
        self.permanent.set(error, ttl);
    }

    /// Snapshot for diagnostics.
    #[must_use]
    pub fn snapshot(&self) -> GuardSnapshot {
        let breaker = self.breaker();
        GuardSnapshot {
            provider: self.key,
            state: breaker.state(),
            failure_count: breaker.failure_count(),
            permanently_failed: self.permanent.remaining().is_some(),
        }
    }

    /// Close the breaker and drop any sticky error.
    pub fn reset(&self) {
        self.breaker().record_success();
        self.permanent.clear();
    }
}

/// Process-scoped owner of every provider's guard.
///
/// Created alongside the provider registry and handed to each scheduler by
/// reference; [`reset_all`](Self::reset_all) is the teardown.
#[derive(Debug, Default)]
pub struct HealthRegistry {
    config: CircuitBreakerConfig,
    guards: Mutex<HashMap<ProviderKey, Arc<ProviderGuard>>>,
}

impl HealthRegistry {
    /// Empty registry; guards are created on first use.
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            guards: Mutex::new(HashMap::new()),
        }
    }

    fn guards(&self) -> MutexGuard<'_, HashMap<ProviderKey, Arc<ProviderGuard>>> {
        self.guards
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Guard for `key`, created on first request.
    #[must_use]
    pub fn guard(&self, key: ProviderKey) -> Arc<ProviderGuard> {
        Arc::clone(
            self.guards()
                .entry(key)
                .or_insert_with(|| Arc::new(ProviderGuard::new(key, self.config))),
        )
    }

    /// Snapshots of every known provider, ordered by key.
    #[must_use]
    pub fn snapshot(&self) -> Vec<GuardSnapshot> {
        let mut out: Vec<GuardSnapshot> = self.guards().values().map(|g| g.snapshot()).collect();
        out.sort_by_key(|s| s.provider);
        out
    }

    /// Reset every guard to its initial state.
    pub fn reset_all(&self) {
        for guard in self.guards().values() {
            guard.reset();
        }
    }
}
