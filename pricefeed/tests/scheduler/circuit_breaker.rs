use pricefeed::{CircuitState, PollError};
use pricefeed_mock::{MockBehavior, SubscriberEvent};

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn five_failed_refreshes_open_the_circuit() {
    let adapter = mock_adapter(QUIET_INTERVAL_SECS);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    ctl.set_behavior(&url, MockBehavior::Fail(PollError::network("connect refused")))
        .await;
    let feed = feed_with(adapter, transport);

    let (sub, mut rx) = subscriber(MOCK, "BTC", "USD");
    feed.set_subscribers(&as_dyn(&[&sub]));
    assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
    assert!(matches!(next_event(&mut rx).await, SubscriberEvent::Error { .. }));

    let scheduler = feed.scheduler(MOCK).unwrap();
    for _ in 0..4 {
        scheduler.refresh_url(&url, None).await;
    }
    assert_eq!(ctl.request_count(&url).await, 15);
    assert_eq!(feed.health()[0].state, CircuitState::Open);

    while rx.try_recv().is_ok() {}

    scheduler.refresh_url(&url, None).await;
    assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
    let SubscriberEvent::Error { error, .. } = next_event(&mut rx).await else {
        panic!("expected provider disabled");
    };
    assert_eq!(
        error,
        PollError::ProviderDisabled {
            provider: "MockExchange".into()
        }
    );
    assert_eq!(ctl.request_count(&url).await, 15);
}

#[tokio::test(start_paused = true)]
async fn open_circuit_lets_one_probe_through_after_recovery_timeout() {
    let adapter = mock_adapter(QUIET_INTERVAL_SECS);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    for _ in 0..15 {
        ctl.push_behavior(&url, MockBehavior::Fail(PollError::network("timed out")))
            .await;
    }
    ctl.set_behavior(
        &url,
        MockBehavior::Return(pricefeed_mock::MockAdapter::rates_response(&[("USD", 7.0)])),
    )
    .await;
    let feed = feed_with(adapter, transport);
    let scheduler = feed.scheduler(MOCK).unwrap();

    // No subscribers needed to drive the guard.
    for _ in 0..5 {
        scheduler.refresh_url(&url, None).await;
    }
    assert_eq!(feed.health()[0].state, CircuitState::Open);

    tokio::time::advance(feed.config().circuit_breaker.recovery_timeout()).await;
    tokio::time::advance(std::time::Duration::from_millis(1)).await;

    scheduler.refresh_url(&url, None).await;
    assert_eq!(ctl.request_count(&url).await, 16);
    let health = feed.health();
    assert_eq!(health[0].state, CircuitState::Closed);
    assert_eq!(health[0].failure_count, 0);
}
