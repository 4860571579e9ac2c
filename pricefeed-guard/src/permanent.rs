use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use pricefeed_core::PollError;

/// Expiry used when `now + ttl` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug)]
struct Sticky {
    error: PollError,
    until: Instant,
}

/// Sticky provider-wide error that expires on its own.
///
/// Set when an upstream explicitly refuses service (rate limiting). While
/// live, every refresh reports the stored error instead of calling out.
#[derive(Debug, Default)]
pub struct PermanentError {
    state: Mutex<Option<Sticky>>,
}

impl PermanentError {
    /// Empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Sticky>> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// The live error, if any. An expired entry is cleared on read.
    #[must_use]
    pub fn get(&self) -> Option<PollError> {
        self.get_at(Instant::now())
    }

    /// [`get`](Self::get) evaluated at `now`.
    #[must_use]
    pub fn get_at(&self, now: Instant) -> Option<PollError> {
        let mut guard = self.lock();
        if let Some(sticky) = guard.as_ref() {
            if now < sticky.until {
                return Some(sticky.error.clone());
            }
            // expired
            *guard = None;
        }
        None
    }

    /// Store `error` for `ttl`, replacing any live entry and its expiry.
    pub fn set(&self, error: PollError, ttl: Duration) {
        let now = Instant::now();
        let until = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + FAR_FUTURE);
        *self.lock() = Some(Sticky { error, until });
    }

    /// Time left before the live error expires.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        let now = Instant::now();
        self.lock()
            .as_ref()
            .map(|s| s.until.saturating_duration_since(now))
            .filter(|d| !d.is_zero())
    }

    /// Whether an entry is stored, expired or not.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.lock().is_some()
    }

    /// Drop the stored error.
    pub fn clear(&self) {
        *self.lock() = None;
    }
}
