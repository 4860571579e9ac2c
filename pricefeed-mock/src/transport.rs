use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;

use pricefeed_core::{PollError, Transport};

/// Instruction for how a fetch of one URL should behave.
#[derive(Clone, Debug)]
pub enum MockBehavior {
    /// Return the provided body immediately.
    Return(Value),
    /// Fail immediately with the provided error.
    Fail(PollError),
    /// Hang indefinitely (simulate a stalled connection).
    Hang,
}

/// One fetch seen by the mock transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Requested URL.
    pub url: String,
    /// `User-Agent` passed by the caller.
    pub user_agent: String,
    /// When the fetch started (Tokio clock, so paused tests see virtual time).
    pub at: Instant,
}

/// Callback run as a fetch resolves, before its result reaches the caller.
pub type ResponseHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct InternalState {
    scripted: HashMap<String, VecDeque<MockBehavior>>,
    fallback: HashMap<String, MockBehavior>,
    hooks: HashMap<String, ResponseHook>,
    requests: Vec<RecordedRequest>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
#[derive(Clone)]
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Queue a one-shot behavior for `url`. Queued behaviors run in order
    /// before the fallback applies.
    pub async fn push_behavior(&self, url: impl Into<String>, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard
            .scripted
            .entry(url.into())
            .or_default()
            .push_back(behavior);
    }

    /// Set the behavior used for `url` once its queue is empty.
    pub async fn set_behavior(&self, url: impl Into<String>, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard.fallback.insert(url.into(), behavior);
    }

    /// Run `hook` once, when the next fetch of `url` resolves.
    ///
    /// The hook fires after the behavior is chosen and before the caller sees
    /// the result, so it can change engine state underneath an in-flight
    /// refresh. `Hang` never resolves and never fires it.
    pub async fn on_next_response(&self, url: impl Into<String>, hook: ResponseHook) {
        let mut guard = self.state.lock().await;
        guard.hooks.insert(url.into(), hook);
    }

    /// Return a copy of the request log.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }

    /// Number of fetches made for `url`.
    pub async fn request_count(&self, url: &str) -> usize {
        let guard = self.state.lock().await;
        guard.requests.iter().filter(|r| r.url == url).count()
    }

    /// Clear all configured behaviors and request logs.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.scripted.clear();
        guard.fallback.clear();
        guard.hooks.clear();
        guard.requests.clear();
    }
}

/// A transport that defers all behavior to an external controller.
pub struct DynamicMockTransport {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockTransport {
    /// Create a new dynamic mock transport and its controller.
    #[must_use]
    pub fn new_with_controller() -> (Arc<dyn Transport>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { state });
        (me as Arc<dyn Transport>, controller)
    }
}

#[async_trait]
impl Transport for DynamicMockTransport {
    async fn fetch_json(&self, url: &str, user_agent: &str) -> Result<Value, PollError> {
        // Log and pick the behavior without holding the lock across the hang.
        let (behavior, hook) = {
            let mut guard = self.state.lock().await;
            guard.requests.push(RecordedRequest {
                url: url.to_string(),
                user_agent: user_agent.to_string(),
                at: Instant::now(),
            });
            let queued = guard.scripted.get_mut(url).and_then(VecDeque::pop_front);
            let behavior = queued.or_else(|| guard.fallback.get(url).cloned());
            let hook = match behavior {
                Some(MockBehavior::Hang) => None,
                _ => guard.hooks.remove(url),
            };
            (behavior, hook)
        };

        let result = match behavior {
            Some(MockBehavior::Return(v)) => Ok(v),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => std::future::pending().await,
            None => Err(PollError::network(format!("no mock behavior for {url}"))),
        };
        if let Some(hook) = hook {
            hook();
        }
        result
    }
}
