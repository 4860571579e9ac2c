use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Identifies one activation of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationToken(u64);

/// Monotonic activation counter.
///
/// Work started under one token must re-check it after every suspension
/// point; once [`invalidate`](Self::invalidate) runs, all earlier tokens
/// are stale.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    /// Start at generation zero.
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Token for the current generation.
    #[must_use]
    pub fn current(&self) -> GenerationToken {
        GenerationToken(self.0.load(Ordering::Acquire))
    }

    /// Advance the generation and return the new token.
    pub fn invalidate(&self) -> GenerationToken {
        GenerationToken(self.0.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether `token` still names the current generation.
    #[must_use]
    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.0.load(Ordering::Acquire) == token.0
    }
}

/// Abstraction over a task handle that can be queried for completion and aborted.
pub trait Abortable {
    /// Abort the underlying task if it is still running.
    fn abort(&mut self);
    /// Return `true` if the underlying task has completed.
    fn is_finished(&self) -> bool;
}

impl Abortable for JoinHandle<()> {
    fn abort(&mut self) {
        Self::abort(self);
    }

    fn is_finished(&self) -> bool {
        Self::is_finished(self)
    }
}

/// Abort `inner` if present and still running.
pub fn abort_impl<H: Abortable>(inner: &mut Option<H>) {
    if let Some(mut h) = inner.take()
        && !h.is_finished()
    {
        h.abort();
    }
}

/// A cancellable repeating timer bound to a [`Generation`].
///
/// `on_tick` runs every `period` until the generation moves past `token`,
/// `on_tick` returns `false`, or the timer is stopped or dropped. The first
/// tick fires one full period after start.
#[derive(Debug)]
pub struct RepeatingTimer {
    inner: Option<JoinHandle<()>>,
}

impl RepeatingTimer {
    /// Spawn the timer task on the current Tokio runtime.
    pub fn start<F>(
        generation: Arc<Generation>,
        token: GenerationToken,
        period: Duration,
        mut on_tick: F,
    ) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let join = tokio::spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                if !generation.is_current(token) || !on_tick() {
                    break;
                }
            }
        });
        Self { inner: Some(join) }
    }

    /// Abort the timer task.
    pub fn stop(mut self) {
        abort_impl(&mut self.inner);
    }

    /// Whether the timer task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for RepeatingTimer {
    fn drop(&mut self) {
        abort_impl(&mut self.inner);
    }
}
