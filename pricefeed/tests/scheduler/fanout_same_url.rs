use pricefeed::{ErrorKind, PollError, Ticker};
use pricefeed_mock::{MockAdapter, MockBehavior, SubscriberEvent};

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn two_tickers_on_one_url_each_get_their_own_price() {
    let adapter = mock_adapter(10);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    ctl.set_behavior(
        &url,
        MockBehavior::Return(MockAdapter::rates_response(&[("USD", 64000.5), ("EUR", 59000.1)])),
    )
    .await;
    let feed = feed_with(adapter, transport);

    let (usd, mut usd_rx) = subscriber(MOCK, "BTC", "USD");
    let (eur, mut eur_rx) = subscriber(MOCK, "BTC", "EUR");
    feed.set_subscribers(&as_dyn(&[&usd, &eur]));

    assert_eq!(next_event(&mut usd_rx).await, SubscriberEvent::Start);
    let SubscriberEvent::PriceData(h) = next_event(&mut usd_rx).await else {
        panic!("expected price data");
    };
    assert_eq!(values(&h), vec![64000.5]);

    assert_eq!(next_event(&mut eur_rx).await, SubscriberEvent::Start);
    let SubscriberEvent::PriceData(h) = next_event(&mut eur_rx).await else {
        panic!("expected price data");
    };
    assert_eq!(values(&h), vec![59000.1]);

    assert_eq!(ctl.request_count(&url).await, 1);
    let scheduler = feed.scheduler(MOCK).unwrap();
    assert_eq!(scheduler.urls(), vec![url.clone()]);
    assert!(scheduler.cached(&url).is_some());
    assert_eq!(scheduler.history(&Ticker::new("BTC", "EUR")).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_quote_fails_only_that_ticker() {
    let adapter = mock_adapter(QUIET_INTERVAL_SECS);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    ctl.set_behavior(
        &url,
        MockBehavior::Return(MockAdapter::rates_response(&[("USD", 100.0)])),
    )
    .await;
    let feed = feed_with(adapter, transport);

    let (usd, mut usd_rx) = subscriber(MOCK, "BTC", "USD");
    let (jpy, mut jpy_rx) = subscriber(MOCK, "BTC", "JPY");
    feed.set_subscribers(&as_dyn(&[&usd, &jpy]));

    assert_eq!(next_event(&mut usd_rx).await, SubscriberEvent::Start);
    assert!(matches!(
        next_event(&mut usd_rx).await,
        SubscriberEvent::PriceData(_)
    ));

    assert_eq!(next_event(&mut jpy_rx).await, SubscriberEvent::Start);
    let SubscriberEvent::Error { error, ticker } = next_event(&mut jpy_rx).await else {
        panic!("expected error");
    };
    assert_eq!(ticker, Some(Ticker::new("BTC", "JPY")));
    assert_eq!(error.kind(), Some(ErrorKind::InvalidResponse));
    let msg = error.to_string();
    assert!(msg.contains("Provider: MockExchange, Pair: BTC/JPY, URL: "), "{msg}");
    assert_eq!(error.root(), &PollError::no_data("rate", "JPY"));
}

#[tokio::test(start_paused = true)]
async fn new_subscriber_on_cached_url_is_served_from_cache() {
    let adapter = mock_adapter(QUIET_INTERVAL_SECS);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    ctl.set_behavior(
        &url,
        MockBehavior::Return(MockAdapter::rates_response(&[("USD", 1.0), ("EUR", 2.0)])),
    )
    .await;
    let feed = feed_with(adapter, transport);

    let (usd, mut usd_rx) = subscriber(MOCK, "BTC", "USD");
    feed.set_subscribers(&as_dyn(&[&usd]));
    assert_eq!(next_event(&mut usd_rx).await, SubscriberEvent::Start);
    assert!(matches!(
        next_event(&mut usd_rx).await,
        SubscriberEvent::PriceData(_)
    ));

    let (eur, mut eur_rx) = subscriber(MOCK, "BTC", "EUR");
    feed.set_subscribers(&as_dyn(&[&usd, &eur]));

    // Replay is synchronous: no start event, no request.
    let SubscriberEvent::PriceData(h) = eur_rx.try_recv().unwrap() else {
        panic!("expected replayed price data");
    };
    assert_eq!(values(&h), vec![2.0]);
    let SubscriberEvent::PriceData(h) = usd_rx.try_recv().unwrap() else {
        panic!("expected replayed price data");
    };
    // Same receive time, so the slot is overwritten rather than appended.
    assert_eq!(values(&h), vec![1.0]);
    assert_eq!(ctl.request_count(&url).await, 1);
}
