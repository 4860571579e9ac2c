use std::time::Duration;

use pricefeed_mock::{MockAdapter, MockBehavior, SubscriberEvent};

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn each_tick_refreshes_only_the_stalest_cached_url() {
    let adapter = mock_adapter(10);
    let btc = adapter.url_for("BTC");
    let eth = adapter.url_for("ETH");
    let (transport, ctl) = mock_transport();
    ctl.set_behavior(
        &btc,
        MockBehavior::Return(MockAdapter::rates_response(&[("USD", 1.0)])),
    )
    .await;
    ctl.set_behavior(
        &eth,
        MockBehavior::Return(MockAdapter::rates_response(&[("USD", 2.0)])),
    )
    .await;
    let feed = feed_with(adapter, transport);

    let (b, mut b_rx) = subscriber(MOCK, "BTC", "USD");
    let (e, mut e_rx) = subscriber(MOCK, "ETH", "USD");
    feed.set_subscribers(&as_dyn(&[&b, &e]));
    for rx in [&mut b_rx, &mut e_rx] {
        assert_eq!(next_event(rx).await, SubscriberEvent::Start);
        assert!(matches!(next_event(rx).await, SubscriberEvent::PriceData(_)));
    }
    let started = tokio::time::Instant::now();

    // First tick: both cached at the same instant, first-listed wins.
    assert_eq!(next_event(&mut b_rx).await, SubscriberEvent::Start);
    assert!(matches!(next_event(&mut b_rx).await, SubscriberEvent::PriceData(_)));
    assert!(about(started.elapsed(), Duration::from_secs(10)));
    assert!(e_rx.try_recv().is_err());
    assert_eq!(ctl.request_count(&btc).await, 2);
    assert_eq!(ctl.request_count(&eth).await, 1);

    // Second tick: ETH is now the stalest.
    assert_eq!(next_event(&mut e_rx).await, SubscriberEvent::Start);
    assert!(matches!(next_event(&mut e_rx).await, SubscriberEvent::PriceData(_)));
    assert!(about(started.elapsed(), Duration::from_secs(20)));
    assert!(b_rx.try_recv().is_err());
    assert_eq!(ctl.request_count(&eth).await, 2);
}

#[tokio::test(start_paused = true)]
async fn failing_refresh_does_not_stop_the_timer() {
    let adapter = mock_adapter(10);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    ctl.set_behavior(
        &url,
        MockBehavior::Fail(pricefeed::PollError::Parse("garbage".into())),
    )
    .await;
    let feed = feed_with(adapter, transport);

    let (sub, mut rx) = subscriber(MOCK, "BTC", "USD");
    feed.set_subscribers(&as_dyn(&[&sub]));
    for _ in 0..3 {
        assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
        assert!(matches!(next_event(&mut rx).await, SubscriberEvent::Error { .. }));
    }
    // Uncached, so every tick retries it: three refreshes of three attempts.
    assert_eq!(ctl.request_count(&url).await, 9);
}

#[tokio::test]
async fn manual_tick_reports_selection() {
    let adapter = mock_adapter(QUIET_INTERVAL_SECS);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    ctl.set_behavior(&url, MockBehavior::Hang).await;
    let feed = feed_with(adapter, transport);

    let (sub, _rx) = subscriber(MOCK, "BTC", "USD");
    feed.set_subscribers(&as_dyn(&[&sub]));
    let scheduler = feed.scheduler(MOCK).unwrap();
    assert_eq!(scheduler.tick(), vec![url]);
}
