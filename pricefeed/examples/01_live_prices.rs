mod common;

use std::sync::Arc;
use std::time::Duration;

use pricefeed::{PriceFeed, Subscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();

    // 1. Providers and transport (mock in CI when PRICEFEED_EXAMPLES_USE_MOCK is set).
    let (providers, transport) = common::setup().await?;

    // 2. Build the feed. Schedulers stay idle until someone subscribes.
    let feed = PriceFeed::builder()
        .with_providers(providers)
        .transport(transport)
        .user_agent("pricefeed-example/0.3")
        .build()?;

    // 3. Two pairs on the same provider; BTC and ETH poll separate URLs.
    let subscribers: Vec<Arc<dyn Subscriber>> = vec![
        common::Printer::new("binance", "BTC", "USDT"),
        common::Printer::new("binance", "ETH", "USDT"),
    ];
    feed.set_subscribers(&subscribers);

    println!("Polling for ~12s...");
    tokio::time::sleep(Duration::from_secs(12)).await;

    // 4. Dropping every subscriber idles the scheduler and clears its cache.
    feed.set_subscribers(&[]);
    println!("stopped");

    Ok(())
}
