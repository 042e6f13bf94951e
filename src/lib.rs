//! # CoinMarketCap Price Ticker
//!
//! Polls the CoinMarketCap latest-quotes API once per interval and prints the
//! current price of one asset until interrupted.
//!
//! ## Usage
//!
//! ```no_run
//! use cmc_price_ticker::{CoinMarketCapFetcher, Config, Poller};
//! use std::sync::Arc;
//! use tokio::sync::watch;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let fetcher = Arc::new(CoinMarketCapFetcher::new(&config)?);
//! let poller = Poller::new(fetcher, &config);
//!
//! let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//! poller
//!     .run(&mut std::io::stdout(), &mut std::io::stderr(), shutdown_rx)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every fetch failure falls into one [`ErrorKind`]:
//!
//! - `Network`: connection refused, DNS failure, timeout
//! - `Status`: non-2xx response (bad key, rate limit, server error)
//! - `MalformedResponse`: no numeric price at `data.<SYMBOL>.quote.<CONVERT>.price`
//!
//! The poller reports each failure and keeps going.

pub mod config;
pub mod constants;
pub mod error;
pub mod metrics;
pub mod poller;
pub mod provider;
pub mod providers;
pub mod signals;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigError, ProviderError};
pub use metrics::ProviderMetrics;
pub use poller::{PollSummary, Poller};
pub use provider::PriceFetcher;
pub use providers::CoinMarketCapFetcher;
pub use types::{format_price_line, Asset, ErrorKind, PriceQuote};
