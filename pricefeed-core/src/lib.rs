//! pricefeed-core
//!
//! Capability traits and leaf components shared across the pricefeed engine.
//!
//! - `connector`: the `ProviderAdapter` and `Transport` traits.
//! - `subscriber`: the `Subscriber` callback contract.
//! - `history`: bounded per-ticker price series.
//! - `cache`: last-response-per-URL storage.
//! - `classify`: failure taxonomy and user-facing wrapping.
//!
//! Async runtime (Tokio)
//! ---------------------
//! `timer::RepeatingTimer` spawns onto the ambient Tokio runtime and cache
//! entries are stamped with `tokio::time::Instant`, so code using them must
//! run under a Tokio 1.x runtime. Paused test clocks apply to both.
#![warn(missing_docs)]

/// Request cache keyed by URL.
pub mod cache;
/// Error classification and context wrapping.
pub mod classify;
/// Provider adapter and transport capability traits.
pub mod connector;
/// Bounded per-ticker price history.
pub mod history;
/// Subscriber callback contract.
pub mod subscriber;
/// Generation tokens and the cancellable repeating timer.
pub mod timer;

pub use cache::{CacheEntry, RequestCache};
pub use classify::{ErrorContext, classify, is_rate_limited, wrap_with_context};
pub use connector::{ProviderAdapter, Transport};
pub use history::{DEFAULT_HISTORY_CAPACITY, PriceHistory};
pub use pricefeed_types::*;
pub use subscriber::Subscriber;
pub use timer::{Generation, GenerationToken, RepeatingTimer};
