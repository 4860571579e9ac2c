//! Pricefeed polls many price endpoints on independent schedules and fans the
//! results out to subscribers.
//!
//! Overview
//! - One `PollScheduler` per registered provider, idle until it has
//!   subscribers, then ticking at the provider's interval.
//! - Subscribers that resolve to the same URL share a request; each receives
//!   only its own ticker's history.
//! - Failures are classified, wrapped with provider/pair/URL context, and
//!   delivered through `on_update_error`. They never escape to the caller.
//!
//! Key behaviors and trade-offs
//! - Tick policy: every URL without a cached response plus the single
//!   stalest cached URL. Cold start is fast; steady state sends at most one
//!   warm refresh per provider per tick.
//! - Retry: up to `max_attempts` with exponential backoff (1s, 2s, ... by
//!   default). Rate-limit responses are never retried.
//! - Rate limiting: silences the whole provider for `permanent_error_ttl`
//!   (1 hour by default); refreshes report the stored error without any
//!   network call.
//! - Circuit breaker: after `failure_threshold` failed refreshes the provider
//!   is disabled for `recovery_timeout`, then a single probe is let through.
//!   One success closes it.
//! - Cancellation: removing a provider's last subscriber bumps its generation;
//!   in-flight refreshes notice after their next await and drop their results.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use pricefeed::{PriceFeed, Subscriber, SubscriptionOptions};
//! use pricefeed_exchanges::{ReqwestTransport, all_providers};
//!
//! let feed = PriceFeed::builder()
//!     .with_providers(all_providers())
//!     .transport(Arc::new(ReqwestTransport::new()?))
//!     .build()?;
//!
//! let subs: Vec<Arc<dyn Subscriber>> = vec![my_display_for(
//!     SubscriptionOptions::new("kraken", "XXBT", "ZUSD"),
//! )];
//! feed.set_subscribers(&subs);
//! // ... later
//! feed.shutdown();
//! ```
//!
//! See `pricefeed/examples/` for a runnable demonstration.
#![warn(missing_docs)]

pub(crate) mod core;
mod registry;
/// Subscription routing, fan-out, and per-provider scheduling.
#[allow(missing_docs)]
pub mod router;

pub use core::{PriceFeed, PriceFeedBuilder};
pub use registry::ProviderRegistry;
pub use router::{FanOutReport, Filter, PollScheduler, Subscription, SubscriptionSet, fan_out};

pub use pricefeed_guard::{CircuitState, GuardSnapshot, HealthRegistry, ProviderGuard};

// Re-export core types for convenience
pub use pricefeed_core::{
    CacheEntry, CircuitBreakerConfig, ErrorContext, ErrorKind, PollConfig, PollError, PricePoint,
    ProviderAdapter, ProviderKey, RetryConfig, Subscriber, SubscriptionOptions, Ticker, Transport,
    classify, wrap_with_context,
};
