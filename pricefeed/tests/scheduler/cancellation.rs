use std::sync::Arc;
use std::time::Duration;

use pricefeed::{PollConfig, PollError, PriceFeed, RetryConfig};
use pricefeed_mock::{DynamicMockController, MockAdapter, MockBehavior, SubscriberEvent};

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn stopping_during_backoff_abandons_the_retry() {
    let adapter = mock_adapter(QUIET_INTERVAL_SECS);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    ctl.push_behavior(&url, MockBehavior::Fail(PollError::network("fetch failed")))
        .await;
    ctl.set_behavior(
        &url,
        MockBehavior::Return(MockAdapter::rates_response(&[("USD", 1.0)])),
    )
    .await;
    let feed = feed_with(adapter, transport);

    let (sub, mut rx) = subscriber(MOCK, "BTC", "USD");
    feed.set_subscribers(&as_dyn(&[&sub]));
    assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
    while ctl.request_count(&url).await == 0 {
        tokio::task::yield_now().await;
    }

    // Refresh is now sleeping before its second attempt.
    feed.set_subscribers(&[]);
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(ctl.request_count(&url).await, 1);
    assert!(rx.try_recv().is_err());
    let scheduler = feed.scheduler(MOCK).unwrap();
    assert!(scheduler.cached(&url).is_none());
    assert_eq!(feed.health()[0].failure_count, 0);
}

#[tokio::test(start_paused = true)]
async fn stopping_during_fetch_drops_the_response() {
    let adapter = mock_adapter(QUIET_INTERVAL_SECS);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    ctl.set_behavior(&url, MockBehavior::Hang).await;
    let feed = feed_with(adapter, transport);

    let (sub, mut rx) = subscriber(MOCK, "BTC", "USD");
    feed.set_subscribers(&as_dyn(&[&sub]));
    assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
    while ctl.request_count(&url).await == 0 {
        tokio::task::yield_now().await;
    }

    feed.set_subscribers(&[]);
    ctl.set_behavior(
        &url,
        MockBehavior::Return(MockAdapter::rates_response(&[("USD", 1.0)])),
    )
    .await;
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(rx.try_recv().is_err());
    assert!(!feed.scheduler(MOCK).unwrap().is_active());
}

/// Unsubscribe everyone the moment the next fetch of `url` resolves.
async fn stop_on_response(ctl: &DynamicMockController, url: &str, feed: &Arc<PriceFeed>) {
    let weak = Arc::downgrade(feed);
    ctl.on_next_response(
        url,
        Arc::new(move || {
            if let Some(feed) = weak.upgrade() {
                feed.set_subscribers(&[]);
            }
        }),
    )
    .await;
}

#[tokio::test(start_paused = true)]
async fn stop_landing_with_a_response_leaves_cache_and_guard_untouched() {
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
        MockBehavior::Return(MockAdapter::rates_response(&[("USD", 2.0)])),
    )
    .await;
    let feed = Arc::new(feed_with(adapter, transport));
    stop_on_response(&ctl, &url, &feed).await;

    let (sub, mut rx) = subscriber(MOCK, "BTC", "USD");
    feed.set_subscribers(&as_dyn(&[&sub]));
    assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
    while ctl.request_count(&url).await == 0 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_secs(1)).await;

    let scheduler = feed.scheduler(MOCK).unwrap();
    assert!(!scheduler.is_active());
    assert!(scheduler.cached(&url).is_none());
    assert!(rx.try_recv().is_err());

    // Reactivation must fetch again rather than replay the abandoned body.
    feed.set_subscribers(&as_dyn(&[&sub]));
    assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
    let SubscriberEvent::PriceData(h) = next_event(&mut rx).await else {
        panic!("expected fresh price data");
    };
    assert_eq!(values(&h), vec![2.0]);
    assert_eq!(ctl.request_count(&url).await, 2);
}

#[tokio::test(start_paused = true)]
async fn stop_landing_with_a_rate_limit_sets_no_permanent_error() {
    let adapter = mock_adapter(QUIET_INTERVAL_SECS);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    ctl.set_behavior(&url, MockBehavior::Fail(PollError::RateLimited("429".into())))
        .await;
    let feed = Arc::new(feed_with(adapter, transport));
    stop_on_response(&ctl, &url, &feed).await;

    let (sub, mut rx) = subscriber(MOCK, "BTC", "USD");
    feed.set_subscribers(&as_dyn(&[&sub]));
    assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
    while ctl.request_count(&url).await == 0 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(rx.try_recv().is_err());
    assert!(!feed.health()[0].permanently_failed);
}

#[tokio::test(start_paused = true)]
async fn stop_landing_with_a_final_failure_records_nothing() {
    let adapter = mock_adapter(QUIET_INTERVAL_SECS);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    ctl.set_behavior(&url, MockBehavior::Fail(PollError::network("connect refused")))
        .await;
    let cfg = PollConfig {
        retry: RetryConfig {
            max_attempts: 1,
            ..RetryConfig::default()
        },
        ..PollConfig::default()
    };
    let feed = Arc::new(feed_with_config(adapter, transport, cfg));
    stop_on_response(&ctl, &url, &feed).await;

    let (sub, mut rx) = subscriber(MOCK, "BTC", "USD");
    feed.set_subscribers(&as_dyn(&[&sub]));
    assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
    while ctl.request_count(&url).await == 0 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(rx.try_recv().is_err());
    assert_eq!(feed.health()[0].failure_count, 0);
}
