use std::time::Duration;

use pricefeed::{PollError, RetryConfig};
use pricefeed_mock::{MockAdapter, MockBehavior, SubscriberEvent};

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn two_network_failures_then_success_waits_one_then_two_seconds() {
    let adapter = mock_adapter(QUIET_INTERVAL_SECS);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    ctl.push_behavior(&url, MockBehavior::Fail(PollError::network("fetch failed")))
        .await;
    ctl.push_behavior(&url, MockBehavior::Fail(PollError::network("fetch failed")))
        .await;
    ctl.set_behavior(
        &url,
        MockBehavior::Return(MockAdapter::rates_response(&[("USD", 42.0)])),
    )
    .await;
    let feed = feed_with(adapter, transport);

    let (sub, mut rx) = subscriber(MOCK, "BTC", "USD");
    feed.set_subscribers(&as_dyn(&[&sub]));

    assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
    let SubscriberEvent::PriceData(h) = next_event(&mut rx).await else {
        panic!("expected price data after retries");
    };
    assert_eq!(values(&h), vec![42.0]);
    assert!(rx.try_recv().is_err(), "no error callback expected");

    let reqs = ctl.requests().await;
    assert_eq!(reqs.len(), 3);
    assert!(about(reqs[1].at - reqs[0].at, Duration::from_secs(1)));
    assert!(about(reqs[2].at - reqs[1].at, Duration::from_secs(2)));
    assert!(reqs.iter().all(|r| r.user_agent.starts_with("pricefeed/")));

    let health = feed.health();
    assert_eq!(health[0].failure_count, 0);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_deliver_wrapped_error_and_evict_cache() {
    let adapter = mock_adapter(QUIET_INTERVAL_SECS);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    ctl.push_behavior(
        &url,
        MockBehavior::Return(MockAdapter::rates_response(&[("USD", 1.0)])),
    )
    .await;
    ctl.set_behavior(
        &url,
        MockBehavior::Fail(PollError::Http {
            status: 503,
            msg: "Service Unavailable".into(),
        }),
    )
    .await;
    let feed = feed_with(adapter, transport);

    let (sub, mut rx) = subscriber(MOCK, "BTC", "USD");
    feed.set_subscribers(&as_dyn(&[&sub]));
    assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
    assert!(matches!(next_event(&mut rx).await, SubscriberEvent::PriceData(_)));

    let scheduler = feed.scheduler(MOCK).unwrap();
    assert!(scheduler.cached(&url).is_some());
    scheduler.refresh_url(&url, None).await;

    assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
    let SubscriberEvent::Error { error, ticker } = next_event(&mut rx).await else {
        panic!("expected error");
    };
    assert_eq!(ticker, None);
    assert!(error.to_string().contains("(Provider: MockExchange, URL: "));
    assert!(matches!(error.root(), PollError::Http { status: 503, .. }));
    assert!(scheduler.cached(&url).is_none());
    assert_eq!(ctl.request_count(&url).await, 4);
    assert_eq!(feed.health()[0].failure_count, 1);
}

#[tokio::test(start_paused = true)]
async fn single_attempt_config_does_not_retry() {
    let adapter = mock_adapter(QUIET_INTERVAL_SECS);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    ctl.set_behavior(&url, MockBehavior::Fail(PollError::network("connect refused")))
        .await;
    let cfg = pricefeed::PollConfig {
        retry: RetryConfig {
            max_attempts: 1,
            ..RetryConfig::default()
        },
        ..pricefeed::PollConfig::default()
    };
    let feed = feed_with_config(adapter, transport, cfg);

    let (sub, mut rx) = subscriber(MOCK, "BTC", "USD");
    feed.set_subscribers(&as_dyn(&[&sub]));
    assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
    assert!(matches!(next_event(&mut rx).await, SubscriberEvent::Error { .. }));
    assert_eq!(ctl.request_count(&url).await, 1);
}
