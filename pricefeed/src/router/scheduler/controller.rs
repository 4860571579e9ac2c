use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use pricefeed_core::{
    CacheEntry, Generation, GenerationToken, PollConfig, PollError, PriceHistory, PricePoint,
    ProviderAdapter, ProviderKey, RepeatingTimer, RequestCache, Subscriber, Ticker, Transport,
};
use pricefeed_guard::ProviderGuard;

use super::scheduler_sm::{self as sm, Action, Event, SchedulerMachine};
use crate::router::subscriptions::SubscriptionSet;

pub(super) struct SchedulerState {
    pub(super) machine: SchedulerMachine,
    pub(super) subscriptions: SubscriptionSet,
    pub(super) cache: RequestCache,
    pub(super) history: PriceHistory,
    pub(super) timer: Option<RepeatingTimer>,
}

pub(super) struct SchedulerShared {
    pub(super) adapter: Arc<dyn ProviderAdapter>,
    pub(super) transport: Arc<dyn Transport>,
    pub(super) guard: Arc<ProviderGuard>,
    pub(super) config: PollConfig,
    pub(super) interval: Duration,
    pub(super) generation: Arc<Generation>,
    pub(super) state: Mutex<SchedulerState>,
}

impl SchedulerShared {
    /// Never held across an `.await` or a subscriber callback.
    pub(super) fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` only while `token` is current.
    ///
    /// Generations are invalidated under the same lock, so once a stop has
    /// run no stale refresh can touch the cache or the guard.
    pub(super) fn commit<R>(
        &self,
        token: GenerationToken,
        f: impl FnOnce(&mut SchedulerState) -> R,
    ) -> Option<R> {
        let mut st = self.lock();
        if !self.generation.is_current(token) {
            return None;
        }
        Some(f(&mut st))
    }

    pub(super) fn spawn_refresh(self: &Arc<Self>, url: String, token: GenerationToken) {
        let me = Arc::clone(self);
        tokio::spawn(async move { me.refresh(&url, None, token).await });
    }

    fn tick(self: &Arc<Self>) -> Vec<String> {
        let token = self.generation.current();
        let due = {
            let st = self.lock();
            sm::select_due_urls(st.subscriptions.urls(), &st.cache)
        };
        for url in &due {
            self.spawn_refresh(url.clone(), token);
        }
        due
    }
}

/// Polls one provider on its own cadence.
///
/// Idle until it has subscribers; then a timer fires every provider interval
/// and refreshes the URLs selected by the staleness policy. Each refresh
/// goes through the provider's guard, the retry loop, and the request cache
/// before results are fanned out per ticker.
///
/// Must be used from within a Tokio runtime.
pub struct PollScheduler {
    shared: Arc<SchedulerShared>,
}

impl PollScheduler {
    /// Scheduler for `adapter`, initially idle.
    ///
    /// # Errors
    /// Returns `PollError::InvalidInterval` when the adapter's interval is
    /// below `config.min_interval()`.
    pub fn new(
        adapter: Arc<dyn ProviderAdapter>,
        transport: Arc<dyn Transport>,
        guard: Arc<ProviderGuard>,
        config: &PollConfig,
    ) -> Result<Self, PollError> {
        let interval = Self::validate_interval(adapter.as_ref(), config)?;
        Ok(Self {
            shared: Arc::new(SchedulerShared {
                adapter,
                transport,
                guard,
                config: config.clone(),
                interval,
                generation: Arc::new(Generation::new()),
                state: Mutex::new(SchedulerState {
                    machine: SchedulerMachine::default(),
                    subscriptions: SubscriptionSet::default(),
                    cache: RequestCache::new(),
                    history: PriceHistory::with_capacity(config.history_capacity),
                    timer: None,
                }),
            }),
        })
    }

    /// The adapter's interval, if it is at least `config.min_interval()`.
    ///
    /// # Errors
    /// Returns `PollError::InvalidInterval` otherwise.
    pub fn validate_interval(
        adapter: &dyn ProviderAdapter,
        config: &PollConfig,
    ) -> Result<Duration, PollError> {
        let interval = adapter.interval();
        if interval < config.min_interval() || interval.is_zero() {
            return Err(PollError::InvalidInterval {
                provider: adapter.key().to_string(),
                seconds: interval.as_secs(),
            });
        }
        Ok(interval)
    }

    /// Provider this scheduler polls.
    #[must_use]
    pub fn key(&self) -> ProviderKey {
        self.shared.adapter.key()
    }

    /// Poll interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    /// Replace this provider's subscribers with those of `all` that name it.
    ///
    /// Going from none to some starts the timer and refreshes every owned
    /// URL at once; going to none clears the cache and stops the timer.
    /// Otherwise the cadence continues and owned URLs are refreshed now,
    /// replaying cached responses where available.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "pricefeed::scheduler::set_subscribers",
            skip(self, all),
            fields(provider = %self.shared.adapter.key(), total = all.len()),
        )
    )]
    pub fn set_subscribers(&self, all: &[Arc<dyn Subscriber>]) {
        let shared = &self.shared;
        let set = SubscriptionSet::for_provider(all, shared.adapter.as_ref());

        let mut replays: Vec<(String, CacheEntry)> = Vec::new();
        let mut fetches: Vec<String> = Vec::new();
        {
            let mut st = shared.lock();
            let has_subscribers = !set.is_empty();
            st.subscriptions = set;
            let machine = std::mem::take(&mut st.machine);
            let (next, actions) = machine.handle(Event::SubscribersChanged { has_subscribers });
            st.machine = next;
            for action in actions {
                match action {
                    Action::ClearCache => st.cache.clear(),
                    Action::StopTimer => {
                        shared.generation.invalidate();
                        if let Some(timer) = st.timer.take() {
                            timer.stop();
                        }
                        #[cfg(feature = "tracing")]
                        tracing::debug!(provider = %shared.adapter.key(), "scheduler idle");
                    }
                    Action::StartTimer => {
                        st.timer = Some(self.start_timer());
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            provider = %shared.adapter.key(),
                            interval_secs = shared.interval.as_secs(),
                            "scheduler active"
                        );
                    }
                    Action::RefreshOwned => {
                        for url in st.subscriptions.urls() {
                            match st.cache.get(url) {
                                Some(entry) => replays.push((url.clone(), entry.clone())),
                                None => fetches.push(url.clone()),
                            }
                        }
                    }
                }
            }
        }

        for (url, entry) in &replays {
            shared.dispatch_response(url, entry);
        }
        let token = shared.generation.current();
        for url in fetches {
            shared.spawn_refresh(url, token);
        }
    }

    fn start_timer(&self) -> RepeatingTimer {
        let weak: Weak<SchedulerShared> = Arc::downgrade(&self.shared);
        let generation = Arc::clone(&self.shared.generation);
        let token = generation.current();
        RepeatingTimer::start(generation, token, self.shared.interval, move || {
            weak.upgrade().is_some_and(|shared| {
                shared.tick();
                true
            })
        })
    }

    /// Run one timer tick now and return the URLs it refreshes.
    ///
    /// Refreshes run as spawned tasks; the returned list is the selection.
    pub fn tick(&self) -> Vec<String> {
        self.shared.tick()
    }

    /// Refresh `url` and wait for it to finish.
    ///
    /// With `cached`, the response is dispatched without any network call.
    pub async fn refresh_url(&self, url: &str, cached: Option<CacheEntry>) {
        let token = self.shared.generation.current();
        self.shared.refresh(url, cached, token).await;
    }

    /// Stop the timer, drop the cache, and abandon in-flight refreshes.
    pub fn stop(&self) {
        let shared = &self.shared;
        let mut st = shared.lock();
        let machine = std::mem::take(&mut st.machine);
        let (next, actions) = machine.handle(Event::Shutdown);
        st.machine = next;
        for action in actions {
            match action {
                Action::ClearCache => st.cache.clear(),
                Action::StopTimer => {
                    shared.generation.invalidate();
                    if let Some(timer) = st.timer.take() {
                        timer.stop();
                    }
                }
                Action::StartTimer | Action::RefreshOwned => {}
            }
        }
        st.subscriptions = SubscriptionSet::default();
    }

    /// Whether the timer is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.shared.lock().machine.phase == sm::Phase::Active
    }

    /// URLs currently owned, in first-seen order.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.shared.lock().subscriptions.urls().to_vec()
    }

    /// Number of subscribers currently served.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.lock().subscriptions.len()
    }

    /// Cached response for `url`.
    #[must_use]
    pub fn cached(&self, url: &str) -> Option<CacheEntry> {
        self.shared.lock().cache.get(url).cloned()
    }

    /// Price history for `ticker`, newest first.
    #[must_use]
    pub fn history(&self, ticker: &Ticker) -> Vec<PricePoint> {
        self.shared.lock().history.get(ticker)
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PollScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollScheduler")
            .field("provider", &self.key())
            .field("interval", &self.shared.interval)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}
