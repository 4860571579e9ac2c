//! One adapter per exchange.

mod binance;
mod bitkub;
mod bitpay;
mod bybit;
mod coinbase;
mod cryptocompare;
mod htx;
mod kraken;
mod poloniex;

pub use binance::{Binance, BinanceFutures};
pub use bitkub::Bitkub;
pub use bitpay::BitPay;
pub use bybit::Bybit;
pub use coinbase::Coinbase;
pub use cryptocompare::CryptoCompare;
pub use htx::Htx;
pub use kraken::Kraken;
pub use poloniex::Poloniex;
