use pricefeed_core::RequestCache;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// No subscribers; timer stopped.
    #[default]
    Idle,
    /// Timer running at the provider interval.
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    SubscribersChanged { has_subscribers: bool },
    Shutdown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    ClearCache,
    StopTimer,
    StartTimer,
    /// Refresh every owned URL now, replaying a cached response where one exists.
    RefreshOwned,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerMachine {
    pub phase: Phase,
}

impl SchedulerMachine {
    pub fn handle(self, event: Event) -> (Self, Vec<Action>) {
        match (self.phase, event) {
            (Phase::Active, Event::SubscribersChanged { has_subscribers: false } | Event::Shutdown) => (
                Self { phase: Phase::Idle },
                vec![Action::ClearCache, Action::StopTimer],
            ),
            (Phase::Idle, Event::SubscribersChanged { has_subscribers: false } | Event::Shutdown) => {
                (self, vec![Action::ClearCache])
            }
            (Phase::Idle, Event::SubscribersChanged { has_subscribers: true }) => (
                Self { phase: Phase::Active },
                vec![Action::StartTimer, Action::RefreshOwned],
            ),
            // Cadence continues; only the owned sets change.
            (Phase::Active, Event::SubscribersChanged { has_subscribers: true }) => {
                (self, vec![Action::RefreshOwned])
            }
        }
    }
}

/// URLs due on a timer tick: every URL without a cached response, plus the
/// single cached URL with the oldest receive time.
///
/// Cold URLs are unbounded per tick while warm refreshes are limited to one,
/// giving a fast warm-up and a gentle steady state.
pub fn select_due_urls(urls: &[String], cache: &RequestCache) -> Vec<String> {
    let mut due: Vec<String> = urls
        .iter()
        .filter(|u| !cache.contains(u))
        .cloned()
        .collect();
    if let Some(oldest) = cache.oldest(urls) {
        due.push(oldest.to_string());
    }
    due
}
