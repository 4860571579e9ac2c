//! Pricefeed data transfer objects, error taxonomy, and configuration primitives.
#![warn(missing_docs)]

mod config;
mod connector;
mod error;
mod market;

pub use config::{CircuitBreakerConfig, DEFAULT_USER_AGENT, PollConfig, RetryConfig};
pub use connector::ProviderKey;
pub use error::{
    ErrorKind, INVALID_RESPONSE_MESSAGE, NETWORK_ERROR_MESSAGE, PROVIDER_DISABLED_MESSAGE,
    PollError, RATE_LIMITED_MESSAGE, UNKNOWN_ERROR_MESSAGE,
};
pub use market::{DEFAULT_ATTRIBUTE, DEFAULT_FORMAT, PricePoint, SubscriptionOptions, Ticker};
