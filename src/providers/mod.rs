//! Price fetcher implementations

pub mod coinmarketcap;

pub use coinmarketcap::CoinMarketCapFetcher;
