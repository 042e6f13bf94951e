//! Fetcher abstraction for pulling a single price from an external API

use crate::{
    error::ProviderError,
    types::{Asset, PriceQuote},
};
use async_trait::async_trait;

/// Trait for price fetchers
///
/// One call is one network round-trip. Implementations hold no state that
/// changes between calls, so the poll loop can call them back to back.
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Fetches the current price of `asset` denominated in `convert`
    ///
    /// # Arguments
    /// * `asset` - The asset to fetch the price for
    /// * `convert` - Conversion currency symbol (e.g. "USD")
    ///
    /// # Returns
    /// The quote, or an error describing why no price could be extracted
    async fn fetch_price(&self, asset: Asset, convert: &str) -> Result<PriceQuote, ProviderError>;

    /// Returns the name of this fetcher
    fn provider_name(&self) -> &'static str;
}
