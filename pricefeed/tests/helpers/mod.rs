// Shared fixtures for scheduler scenarios.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use pricefeed::{PollConfig, PriceFeed, PricePoint, Subscriber, SubscriptionOptions, Transport};
use pricefeed_mock::{
    DynamicMockController, DynamicMockTransport, FailMode, MockAdapter, RecordingSubscriber,
    SubscriberEvent,
};

pub const MOCK: &str = "mock";

/// Long enough that the repeating timer never fires during a scenario.
pub const QUIET_INTERVAL_SECS: u64 = 86_400;

pub fn mock_adapter(interval_secs: u64) -> MockAdapter {
    MockAdapter::new(MOCK, interval_secs)
}

pub fn feed_with(adapter: MockAdapter, transport: Arc<dyn Transport>) -> PriceFeed {
    feed_with_config(adapter, transport, PollConfig::default())
}

pub fn feed_with_config(
    adapter: MockAdapter,
    transport: Arc<dyn Transport>,
    cfg: PollConfig,
) -> PriceFeed {
    PriceFeed::builder()
        .with_provider(Arc::new(adapter))
        .transport(transport)
        .config(cfg)
        .build()
        .expect("valid feed")
}

pub fn mock_transport() -> (Arc<dyn Transport>, DynamicMockController) {
    DynamicMockTransport::new_with_controller()
}

pub fn subscriber(
    api: &str,
    base: &str,
    quote: &str,
) -> (Arc<RecordingSubscriber>, UnboundedReceiver<SubscriberEvent>) {
    RecordingSubscriber::new(SubscriptionOptions::new(api, base, quote))
}

pub fn failing_subscriber(
    base: &str,
    quote: &str,
    mode: FailMode,
) -> (Arc<RecordingSubscriber>, UnboundedReceiver<SubscriberEvent>) {
    RecordingSubscriber::with_fail_mode(SubscriptionOptions::new(MOCK, base, quote), mode)
}

pub fn as_dyn(subs: &[&Arc<RecordingSubscriber>]) -> Vec<Arc<dyn Subscriber>> {
    subs.iter()
        .map(|s| Arc::clone(*s) as Arc<dyn Subscriber>)
        .collect()
}

pub async fn next_event(rx: &mut UnboundedReceiver<SubscriberEvent>) -> SubscriberEvent {
    rx.recv().await.expect("subscriber channel open")
}

pub fn values(history: &[PricePoint]) -> Vec<f64> {
    history.iter().map(|p| p.value).collect()
}

/// Whether `actual` is `expected` up to timer-wheel rounding.
pub fn about(actual: Duration, expected: Duration) -> bool {
    actual >= expected && actual < expected + Duration::from_millis(50)
}
