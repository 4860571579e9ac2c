use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User-facing text for a rate-limited provider.
pub const RATE_LIMITED_MESSAGE: &str =
    "Exchange rate limit exceeded. Data will update automatically.";
/// User-facing text for connectivity failures.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Unable to connect to exchange. Check your internet connection.";
/// User-facing text for malformed or unexpected payloads.
pub const INVALID_RESPONSE_MESSAGE: &str =
    "Exchange returned invalid data. This may be temporary.";
/// User-facing text for a provider gated by its circuit breaker.
pub const PROVIDER_DISABLED_MESSAGE: &str =
    "Provider is temporarily disabled due to repeated failures.";
/// User-facing text for failures that match no other class.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unexpected error occurred while fetching price data.";

/// Stable failure taxonomy produced by the error classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The upstream explicitly asked us to slow down.
    RateLimited,
    /// The request never produced a response (DNS, connect, timeout).
    NetworkError,
    /// A response arrived but could not be understood.
    InvalidResponse,
    /// Anything else.
    Unknown,
}

impl ErrorKind {
    /// Fixed user-facing message for this kind.
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::RateLimited => RATE_LIMITED_MESSAGE,
            Self::NetworkError => NETWORK_ERROR_MESSAGE,
            Self::InvalidResponse => INVALID_RESPONSE_MESSAGE,
            Self::Unknown => UNKNOWN_ERROR_MESSAGE,
        }
    }
}

/// Unified error type for the pricefeed workspace.
///
/// Transport, parse, and configuration failures all surface as variants of
/// this enum. Errors delivered to subscribers are normally the `Contextual`
/// variant, which carries the classified kind and keeps the raw failure as
/// its source.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PollError {
    /// The transport received an explicit rate-limit response.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The request failed before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// The response body was not valid JSON.
    #[error("invalid json: {0}")]
    InvalidJson(String),

    /// The upstream answered with a non-success HTTP status.
    #[error("HTTP {status}: {msg}")]
    Http {
        /// Response status code.
        status: u16,
        /// Status reason or body excerpt.
        msg: String,
    },

    /// A well-formed response did not contain the expected price.
    #[error("parse error: {0}")]
    Parse(String),

    /// A value could not be stored (e.g. NaN price).
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The provider's circuit breaker is open.
    #[error("{} (Provider: {provider})", PROVIDER_DISABLED_MESSAGE)]
    ProviderDisabled {
        /// Display name of the gated provider.
        provider: String,
    },

    /// No adapter is registered under the given key.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// A provider declared a poll interval below the allowed minimum.
    #[error("invalid interval for {provider}: {seconds}s")]
    InvalidInterval {
        /// Provider key.
        provider: String,
        /// Declared interval in seconds.
        seconds: u64,
    },

    /// A subscriber callback failed.
    #[error("{0}")]
    Subscriber(String),

    /// A classified failure with its user-facing message and context.
    #[error("{message}")]
    Contextual {
        /// Classified kind.
        kind: ErrorKind,
        /// Fixed message plus context suffix.
        message: String,
        /// The raw failure this wraps.
        source: Box<PollError>,
    },

    /// Builder or configuration problem.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Unknown/opaque error.
    #[error("{0}")]
    Other(String),
}

impl PollError {
    /// Helper: build a `Network` error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Helper: build a `Parse` error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Helper: a required field was missing from a response.
    pub fn no_data(field: &str, value: impl std::fmt::Display) -> Self {
        Self::Parse(format!("no data for {field} {value}"))
    }

    /// Helper: the exchange reported an error in its payload.
    pub fn api(msg: impl std::fmt::Display) -> Self {
        Self::Parse(format!("api error: {msg}"))
    }

    /// Helper: build a `Subscriber` error.
    pub fn subscriber(msg: impl Into<String>) -> Self {
        Self::Subscriber(msg.into())
    }

    /// The innermost raw failure, following `Contextual` wrappers.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Contextual { source, .. } => source.root(),
            other => other,
        }
    }

    /// Classified kind when this error has already been wrapped.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Contextual { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
