//! pricefeed-exchanges
//!
//! Ready-made [`ProviderAdapter`]s for public exchange tickers and a
//! `reqwest`-backed [`Transport`].
//!
//! | Key              | Exchange         | Interval |
//! |------------------|------------------|----------|
//! | `binance`        | Binance          | 15s      |
//! | `binanceFutures` | Binance Futures  | 15s      |
//! | `bitkub`         | Bitkub           | 60s      |
//! | `bitpay`         | BitPay           | 60s      |
//! | `bybit`          | Bybit            | 10s      |
//! | `bybitPerpetual` | Bybit Perpetual  | 10s      |
//! | `coinbase`       | Coinbase         | 60s      |
//! | `cryptocompare`  | CryptoCompare    | 15s      |
//! | `htx`            | HTX              | 15s      |
//! | `kraken`         | Kraken           | 10s      |
//! | `poloniex`       | Poloniex         | 10s      |
//!
//! Adapters are stateless. The same instance can serve any number of
//! engines.
#![warn(missing_docs)]

use std::sync::Arc;

use pricefeed_core::ProviderAdapter;
#[cfg(doc)]
use pricefeed_core::Transport;

/// Per-exchange adapters.
pub mod providers;
mod transport;
/// Parsing helpers shared by the adapters.
pub mod util;

pub use providers::*;
pub use transport::{DEFAULT_REQUEST_TIMEOUT, ReqwestTransport};

/// Every bundled adapter, ordered by key.
#[must_use]
pub fn all_providers() -> Vec<Arc<dyn ProviderAdapter>> {
    vec![
        Arc::new(Binance),
        Arc::new(BinanceFutures),
        Arc::new(Bitkub),
        Arc::new(BitPay),
        Arc::new(Bybit::spot()),
        Arc::new(Bybit::perpetual()),
        Arc::new(Coinbase),
        Arc::new(CryptoCompare),
        Arc::new(Htx),
        Arc::new(Kraken),
        Arc::new(Poloniex),
    ]
}
