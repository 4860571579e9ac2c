use pricefeed::PollError;
use pricefeed_mock::{FailMode, MockAdapter, MockBehavior, SubscriberEvent};

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn misbehaving_subscribers_do_not_block_siblings() {
    let adapter = mock_adapter(QUIET_INTERVAL_SECS);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    ctl.set_behavior(
        &url,
        MockBehavior::Return(MockAdapter::rates_response(&[("USD", 9.0)])),
    )
    .await;
    let feed = feed_with(adapter, transport);

    let (panics, mut panics_rx) = failing_subscriber("BTC", "USD", FailMode::Panic);
    let (errs, mut errs_rx) = failing_subscriber("BTC", "USD", FailMode::ReturnErr);
    let (good, mut good_rx) = subscriber(MOCK, "BTC", "USD");
    feed.set_subscribers(&as_dyn(&[&panics, &errs, &good]));

    assert_eq!(next_event(&mut good_rx).await, SubscriberEvent::Start);
    let SubscriberEvent::PriceData(h) = next_event(&mut good_rx).await else {
        panic!("expected price data");
    };
    assert_eq!(values(&h), vec![9.0]);

    assert_eq!(next_event(&mut panics_rx).await, SubscriberEvent::Start);
    assert_eq!(
        next_event(&mut panics_rx).await,
        SubscriberEvent::Error {
            error: PollError::Subscriber(
                "error with subscriber mock BTCUSD: subscriber exploded".into()
            ),
            ticker: None,
        }
    );

    assert_eq!(next_event(&mut errs_rx).await, SubscriberEvent::Start);
    assert_eq!(
        next_event(&mut errs_rx).await,
        SubscriberEvent::Error {
            error: PollError::Subscriber(
                "error with subscriber mock BTCUSD: display refused update".into()
            ),
            ticker: None,
        }
    );

    // Scheduler state is intact.
    assert!(feed.scheduler(MOCK).unwrap().cached(&url).is_some());
}
