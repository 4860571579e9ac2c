use std::sync::Arc;

use pricefeed::{PricePoint, ProviderAdapter, Subscriber, SubscriptionOptions, Ticker, Transport};
use pricefeed_exchanges::{ReqwestTransport, all_providers};
use pricefeed_mock::{DynamicMockTransport, MockAdapter, MockBehavior};

/// Providers and transport for the examples.
///
/// Live exchanges by default; CI sets `PRICEFEED_EXAMPLES_USE_MOCK` to run
/// offline against a scripted mock exchange registered as `binance`.
pub async fn setup()
-> Result<(Vec<Arc<dyn ProviderAdapter>>, Arc<dyn Transport>), Box<dyn std::error::Error>> {
    if std::env::var("PRICEFEED_EXAMPLES_USE_MOCK").is_ok() {
        println!("--- (Using Mock Transport for CI) ---");
        let adapter = MockAdapter::new("binance", 5).with_name("Binance (mock)");
        let (transport, ctl) = DynamicMockTransport::new_with_controller();
        for (base, price) in [("BTC", 64_000.5), ("ETH", 3_100.25)] {
            let body = MockAdapter::rates_response(&[("USDT", price), ("USD", price)]);
            ctl.set_behavior(&adapter.url_for(base), MockBehavior::Return(body))
                .await;
        }
        Ok((vec![Arc::new(adapter)], transport))
    } else {
        Ok((all_providers(), Arc::new(ReqwestTransport::new()?)))
    }
}

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pricefeed=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Prints every update it receives.
pub struct Printer {
    options: SubscriptionOptions,
}

impl Printer {
    pub fn new(api: &str, base: &str, quote: &str) -> Arc<Self> {
        Arc::new(Self {
            options: SubscriptionOptions::new(api, base, quote),
        })
    }
}

impl Subscriber for Printer {
    fn options(&self) -> &SubscriptionOptions {
        &self.options
    }

    fn on_update_error(
        &self,
        error: &pricefeed::PollError,
        ticker: Option<&Ticker>,
    ) -> Result<(), pricefeed::PollError> {
        match ticker {
            Some(t) => println!("[{}] {t}: {error}", self.options.api),
            None => println!("[{}] {error}", self.options.api),
        }
        Ok(())
    }

    fn on_update_price_data(&self, history: &[PricePoint]) -> Result<(), pricefeed::PollError> {
        if let Some(latest) = history.first() {
            println!(
                "[{}] {}{} = {} ({} points)",
                self.options.api,
                self.options.base,
                self.options.quote,
                latest.value,
                history.len()
            );
        }
        Ok(())
    }
}
