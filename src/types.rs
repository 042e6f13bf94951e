//! Types for the price ticker

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Supported cryptocurrency assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    /// Solana
    SOL,
    /// Bitcoin
    BTC,
    /// Ethereum
    ETH,
    /// USD Coin
    USDC,
    /// Tether
    USDT,
    /// Wrapped Bitcoin
    WBTC,
    /// Wrapped Ethereum
    WETH,
}

impl Asset {
    /// Get the asset symbol, as used in the `symbol` query parameter
    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::SOL => "SOL",
            Asset::BTC => "BTC",
            Asset::ETH => "ETH",
            Asset::USDC => "USDC",
            Asset::USDT => "USDT",
            Asset::WBTC => "WBTC",
            Asset::WETH => "WETH",
        }
    }

    /// Get the human-readable name printed in the ticker line
    pub fn name(&self) -> &'static str {
        match self {
            Asset::SOL => "Solana",
            Asset::BTC => "Bitcoin",
            Asset::ETH => "Ethereum",
            Asset::USDC => "USD Coin",
            Asset::USDT => "Tether",
            Asset::WBTC => "Wrapped Bitcoin",
            Asset::WETH => "Wrapped Ether",
        }
    }

    /// Get all supported assets
    pub fn all() -> &'static [Asset] {
        &[
            Asset::SOL,
            Asset::BTC,
            Asset::ETH,
            Asset::USDC,
            Asset::USDT,
            Asset::WBTC,
            Asset::WETH,
        ]
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Asset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Asset::all()
            .iter()
            .copied()
            .find(|a| a.symbol().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let supported = Asset::all()
                    .iter()
                    .map(|a| a.symbol())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("unsupported asset '{}' (supported: {})", wanted, supported)
            })
    }
}

/// The three failure kinds a fetch can end in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Host unreachable, connection reset, timeout
    Network,
    /// Non-2xx status: bad key, rate limit, server error
    Status,
    /// Body missing the expected price path
    MalformedResponse,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Network => "network",
            ErrorKind::Status => "status",
            ErrorKind::MalformedResponse => "malformed_response",
        };
        f.write_str(s)
    }
}

/// One price observation, printed once and dropped
#[derive(Debug, Clone)]
pub struct PriceQuote {
    /// The asset
    pub asset: Asset,

    /// Conversion currency, uppercase (e.g. "USD")
    pub convert: String,

    /// Price of one unit of `asset` in `convert`
    pub price: f64,

    /// 24h price change percentage
    pub percent_change_24h: Option<f64>,

    /// Provider timestamp, or receive time when the provider omits it
    pub last_updated: DateTime<Utc>,

    /// Data source
    pub source: String,
}

impl PriceQuote {
    /// Create a new quote stamped with the current time
    pub fn new(asset: Asset, convert: impl Into<String>, price: f64, source: String) -> Self {
        Self {
            asset,
            convert: convert.into(),
            price,
            percent_change_24h: None,
            last_updated: Utc::now(),
            source,
        }
    }

    /// Formats the console line for this quote
    pub fn ticker_line(&self) -> String {
        format_price_line(self.asset, &self.convert, self.price)
    }
}

/// Formats `The current price of <name> is $<price>` with two decimals
///
/// Non-USD currencies are printed as a suffix instead of a dollar sign.
pub fn format_price_line(asset: Asset, convert: &str, price: f64) -> String {
    if convert.eq_ignore_ascii_case("USD") {
        format!("The current price of {} is ${:.2}", asset.name(), price)
    } else {
        format!(
            "The current price of {} is {:.2} {}",
            asset.name(),
            price,
            convert.to_uppercase()
        )
    }
}
