//! Per-provider circuit breaker.
//!
//! - **Closed**: requests flow normally.
//! - **Open**: requests are rejected until the recovery timeout passes.
//! - **HalfOpen**: one probe has been let through; its outcome decides.
//!
//! A single success closes the circuit from any state. The failure count
//! survives the half-open transition, so a failed probe reopens at once.

use tokio::time::Instant;

use pricefeed_core::CircuitBreakerConfig;

/// Circuit breaker state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CircuitState {
    /// Normal operation.
    Closed,
    /// Rejecting fast.
    Open,
    /// Probing after the recovery timeout.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "CLOSED"),
            Self::Open => write!(f, "OPEN"),
            Self::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Failure-count driven gate for one provider.
///
/// Not synchronized; [`ProviderGuard`](crate::ProviderGuard) wraps it in a mutex.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
    config: CircuitBreakerConfig,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    /// Closed breaker with the given thresholds.
    #[must_use]
    pub const fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            last_failure: None,
            config,
        }
    }

    /// Whether requests should be rejected right now.
    pub fn is_open(&mut self) -> bool {
        self.is_open_at(Instant::now())
    }

    /// [`is_open`](Self::is_open) evaluated at `now`.
    ///
    /// An open circuit whose last failure is older than the recovery timeout
    /// moves to `HalfOpen` and reports closed.
    pub fn is_open_at(&mut self, now: Instant) -> bool {
        if self.state == CircuitState::Open
            && let Some(last) = self.last_failure
            && now.saturating_duration_since(last) > self.config.recovery_timeout()
        {
            self.state = CircuitState::HalfOpen;
            return false;
        }
        self.state == CircuitState::Open
    }

    /// Count one failed refresh.
    pub fn record_failure(&mut self) {
        self.record_failure_at(Instant::now());
    }

    /// [`record_failure`](Self::record_failure) stamped at `now`.
    pub fn record_failure_at(&mut self, now: Instant) {
        self.failure_count = self.failure_count.saturating_add(1);
        self.last_failure = Some(now);
        if self.failure_count >= self.config.failure_threshold {
            self.state = CircuitState::Open;
        }
    }

    /// Heal the breaker.
    pub fn record_success(&mut self) {
        self.failure_count = 0;
        self.state = CircuitState::Closed;
    }

    /// Current state without any time-based transition.
    #[must_use]
    pub const fn state(&self) -> CircuitState {
        self.state
    }

    /// Failures since the last success.
    #[must_use]
    pub const fn failure_count(&self) -> u32 {
        self.failure_count
    }
}
