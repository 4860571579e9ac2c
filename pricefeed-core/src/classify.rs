//! Failure classification and user-facing wrapping.

use crate::PollError;
use pricefeed_types::{ErrorKind, Ticker};

/// Optional context appended to wrapped errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorContext<'a> {
    /// Provider display name.
    pub provider: Option<&'a str>,
    /// Pair the failure concerns.
    pub ticker: Option<&'a Ticker>,
    /// Requested URL.
    pub url: Option<&'a str>,
}

impl<'a> ErrorContext<'a> {
    /// Empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            provider: None,
            ticker: None,
            url: None,
        }
    }

    /// Set the provider name.
    #[must_use]
    pub const fn provider(mut self, name: &'a str) -> Self {
        self.provider = Some(name);
        self
    }

    /// Set the ticker.
    #[must_use]
    pub const fn ticker(mut self, ticker: &'a Ticker) -> Self {
        self.ticker = Some(ticker);
        self
    }

    /// Set the URL.
    #[must_use]
    pub const fn url(mut self, url: &'a str) -> Self {
        self.url = Some(url);
        self
    }

    fn suffix(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if let Some(p) = self.provider {
            parts.push(format!("Provider: {p}"));
        }
        if let Some(t) = self.ticker {
            parts.push(format!("Pair: {}/{}", t.base, t.quote));
        }
        if let Some(u) = self.url {
            parts.push(format!("URL: {u}"));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!(" ({})", parts.join(", "))
        }
    }
}

/// Map a raw failure onto the stable taxonomy.
///
/// Typed transport signals win; otherwise the message is inspected for
/// rate-limit, connectivity, and decoding hints in that order.
#[must_use]
pub fn classify(err: &PollError) -> ErrorKind {
    match err {
        PollError::Contextual { kind, .. } => *kind,
        PollError::RateLimited(_) | PollError::Http { status: 429, .. } => ErrorKind::RateLimited,
        PollError::Network(_) => ErrorKind::NetworkError,
        PollError::InvalidJson(_) | PollError::Parse(_) | PollError::InvalidValue(_) => {
            ErrorKind::InvalidResponse
        }
        other => classify_message(&other.to_string()),
    }
}

fn classify_message(msg: &str) -> ErrorKind {
    let lower = msg.to_ascii_lowercase();
    if lower.contains("429") || lower.contains("too many requests") {
        ErrorKind::RateLimited
    } else if ["fetch", "connect", "timed out", "timeout", "dns"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        ErrorKind::NetworkError
    } else if lower.contains("json") || lower.contains("parse") {
        ErrorKind::InvalidResponse
    } else {
        ErrorKind::Unknown
    }
}

/// Whether `err` should silence the provider instead of being retried.
#[must_use]
pub fn is_rate_limited(err: &PollError) -> bool {
    classify(err) == ErrorKind::RateLimited
}

/// Wrap `err` with the fixed message for its kind plus `ctx`.
///
/// The raw error is kept as the source of the returned `Contextual` value.
#[must_use]
pub fn wrap_with_context(err: PollError, ctx: &ErrorContext<'_>) -> PollError {
    let kind = classify(&err);
    PollError::Contextual {
        kind,
        message: format!("{}{}", kind.user_message(), ctx.suffix()),
        source: Box::new(err),
    }
}
