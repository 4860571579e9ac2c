//! Configuration types shared by the engine and its guards.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Exponential backoff between fetch attempts of a single refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per refresh, including the first (>= 1).
    pub max_attempts: u32,
    /// Delay after the first failed attempt, in milliseconds.
    pub base_delay_ms: u64,
    /// Multiplier applied per further attempt (>= 1).
    pub factor: u32,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            factor: 2,
            jitter_percent: 0,
        }
    }
}

/// Thresholds for the per-provider circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failed refreshes before the circuit opens.
    pub failure_threshold: u32,
    /// How long an open circuit rejects before allowing a probe, in milliseconds.
    pub recovery_timeout_ms: u64,
}

impl CircuitBreakerConfig {
    /// Recovery timeout as a `Duration`.
    #[must_use]
    pub const fn recovery_timeout(&self) -> Duration {
        Duration::from_millis(self.recovery_timeout_ms)
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout_ms: 60_000,
        }
    }
}

/// Global configuration for the `PriceFeed` engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Retry policy for each URL refresh.
    pub retry: RetryConfig,
    /// Circuit breaker thresholds, applied per provider.
    pub circuit_breaker: CircuitBreakerConfig,
    /// How long a rate-limit response silences a provider, in milliseconds.
    pub permanent_error_ttl_ms: u64,
    /// Entries kept per ticker in the price history.
    pub history_capacity: usize,
    /// Smallest provider poll interval accepted, in seconds.
    pub min_interval_secs: u64,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl PollConfig {
    /// Permanent-error lifetime as a `Duration`.
    #[must_use]
    pub const fn permanent_error_ttl(&self) -> Duration {
        Duration::from_millis(self.permanent_error_ttl_ms)
    }

    /// Minimum poll interval as a `Duration`.
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        Duration::from_secs(self.min_interval_secs)
    }
}

/// Default `User-Agent` string.
pub const DEFAULT_USER_AGENT: &str = concat!("pricefeed/", env!("CARGO_PKG_VERSION"));

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            permanent_error_ttl_ms: 60 * 60 * 1000,
            history_capacity: 10,
            min_interval_secs: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
