//! Constants for the price ticker
//!
//! Compile-time defaults live here. Anything the user can change at runtime
//! (API key, endpoint, pair, interval) is folded into [`crate::config::Config`]
//! once at startup.

use crate::types::Asset;

/// CoinMarketCap latest-quotes endpoint
pub const CMC_QUOTES_LATEST_URL: &str =
    "https://pro-api.coinmarketcap.com/v1/cryptocurrency/quotes/latest";

/// Header carrying the CoinMarketCap API key
pub const CMC_API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "CMC_API_KEY";

/// Environment variable overriding the endpoint URL
pub const API_URL_ENV: &str = "CMC_API_URL";

/// Asset tracked when none is given
pub const DEFAULT_ASSET: Asset = Asset::BTC;

/// Conversion currency used when none is given
pub const DEFAULT_CONVERT: &str = "USD";

/// How often to poll the provider (in seconds)
pub const POLL_INTERVAL_SECS: u64 = 1;

/// HTTP request timeout when fetching prices (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent for HTTP requests
pub const USER_AGENT: &str = concat!("cmc-price-ticker/", env!("CARGO_PKG_VERSION"));
