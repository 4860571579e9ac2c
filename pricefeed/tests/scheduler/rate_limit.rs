use pricefeed::{ErrorKind, PollError};
use pricefeed_mock::{MockBehavior, SubscriberEvent};

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn rate_limit_is_not_retried_and_silences_the_provider() {
    let adapter = mock_adapter(QUIET_INTERVAL_SECS);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    ctl.set_behavior(
        &url,
        MockBehavior::Fail(PollError::RateLimited("429 Too Many Requests".into())),
    )
    .await;
    let feed = feed_with(adapter, transport);

    let (sub, mut rx) = subscriber(MOCK, "BTC", "USD");
    feed.set_subscribers(&as_dyn(&[&sub]));

    assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
    let SubscriberEvent::Error { error: first, .. } = next_event(&mut rx).await else {
        panic!("expected rate-limit error");
    };
    assert_eq!(first.kind(), Some(ErrorKind::RateLimited));
    assert!(
        first
            .to_string()
            .starts_with("Exchange rate limit exceeded. Data will update automatically.")
    );
    assert_eq!(ctl.request_count(&url).await, 1);

    let scheduler = feed.scheduler(MOCK).unwrap();
    assert!(scheduler.cached(&url).is_none());
    let health = feed.health();
    assert!(health[0].permanently_failed);
    assert_eq!(health[0].failure_count, 0);

    // Within the window: reported again, no transport call.
    scheduler.refresh_url(&url, None).await;
    assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
    let SubscriberEvent::Error { error: second, .. } = next_event(&mut rx).await else {
        panic!("expected stored error");
    };
    assert_eq!(second, first);
    assert_eq!(ctl.request_count(&url).await, 1);
}

#[tokio::test(start_paused = true)]
async fn provider_resumes_after_permanent_error_expires() {
    let adapter = mock_adapter(QUIET_INTERVAL_SECS);
    let url = adapter.url_for("BTC");
    let (transport, ctl) = mock_transport();
    ctl.push_behavior(
        &url,
        MockBehavior::Fail(PollError::Http {
            status: 429,
            msg: "Too Many Requests".into(),
        }),
    )
    .await;
    ctl.set_behavior(
        &url,
        MockBehavior::Return(pricefeed_mock::MockAdapter::rates_response(&[("USD", 5.0)])),
    )
    .await;
    let feed = feed_with(adapter, transport);

    let (sub, mut rx) = subscriber(MOCK, "BTC", "USD");
    feed.set_subscribers(&as_dyn(&[&sub]));
    assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
    assert!(matches!(next_event(&mut rx).await, SubscriberEvent::Error { .. }));

    tokio::time::advance(feed.config().permanent_error_ttl()).await;

    let scheduler = feed.scheduler(MOCK).unwrap();
    scheduler.refresh_url(&url, None).await;
    assert_eq!(next_event(&mut rx).await, SubscriberEvent::Start);
    assert!(matches!(next_event(&mut rx).await, SubscriberEvent::PriceData(_)));
    assert_eq!(ctl.request_count(&url).await, 2);
    assert!(!feed.health()[0].permanently_failed);
}
