mod common;

use std::sync::Arc;
use std::time::Duration;

use pricefeed::{PriceFeed, Subscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();
    let (providers, transport) = common::setup().await?;
    let feed = PriceFeed::builder()
        .with_providers(providers)
        .transport(transport)
        .build()?;

    // One subscriber per registered provider on its default pair.
    let subscribers: Vec<Arc<dyn Subscriber>> = feed
        .registry()
        .adapters()
        .map(|a| {
            let t = a.default_ticker();
            common::Printer::new(a.key().as_str(), &t.base, &t.quote) as Arc<dyn Subscriber>
        })
        .collect();
    feed.set_subscribers(&subscribers);

    tokio::time::sleep(Duration::from_secs(8)).await;

    println!("{:<16} {:<10} {:>8} {:>10}", "provider", "circuit", "fails", "limited");
    for h in feed.health() {
        println!(
            "{:<16} {:<10} {:>8} {:>10}",
            h.provider.as_str(),
            format!("{:?}", h.state),
            h.failure_count,
            h.permanently_failed
        );
    }

    feed.shutdown();
    Ok(())
}
