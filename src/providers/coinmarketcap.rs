//! CoinMarketCap price fetcher implementation

use crate::{
    config::Config,
    constants::{CMC_API_KEY_HEADER, USER_AGENT},
    error::ProviderError,
    provider::PriceFetcher,
    types::{Asset, PriceQuote},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header::ACCEPT, Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Instant;

/// CoinMarketCap `quotes/latest` response
///
/// Only the fields on the price path are modelled; everything else is ignored.
#[derive(Debug, Deserialize)]
struct QuotesResponse {
    status: Option<ApiStatus>,
    data: Option<HashMap<String, CoinData>>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    error_code: Option<i64>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CoinData {
    #[serde(default)]
    quote: HashMap<String, QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    price: Option<f64>,
    percent_change_24h: Option<f64>,
    last_updated: Option<String>,
}

/// Error payload CoinMarketCap sends with non-2xx statuses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    status: ApiStatus,
}

/// CoinMarketCap price fetcher
pub struct CoinMarketCapFetcher {
    client: Client,
    api_url: String,
    api_key: String,
}

impl CoinMarketCapFetcher {
    /// Creates a new CoinMarketCap fetcher from the startup configuration
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::NetworkError)?;

        Ok(Self {
            client,
            api_url: config.api_url().to_string(),
            api_key: config.api_key().to_string(),
        })
    }
}

/// Extracts the quote at `data.<SYMBOL>.quote.<CONVERT>.price`
///
/// # Arguments
/// * `body` - Raw response body of a 2xx response
/// * `asset` - Asset that was requested
/// * `convert` - Conversion currency that was requested
///
/// # Returns
/// The quote with the price exactly as sent, or `InvalidResponse` when any
/// step of the path is missing or the price is not a number
pub fn parse_quote(body: &str, asset: Asset, convert: &str) -> Result<PriceQuote, ProviderError> {
    let response: QuotesResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::invalid_response(format!(
            "Failed to parse CoinMarketCap response: {}. Response: {}",
            e,
            body_excerpt(body)
        ))
    })?;

    if let Some(ApiStatus {
        error_code: Some(code),
        error_message,
    }) = &response.status
    {
        if *code != 0 {
            return Err(ProviderError::ApiError {
                status: StatusCode::OK.as_u16(),
                message: error_message
                    .as_deref()
                    .map(body_excerpt)
                    .unwrap_or_else(|| format!("error code {}", code)),
            });
        }
    }

    let symbol = asset.symbol();
    let convert = convert.to_uppercase();

    let coin = response
        .data
        .as_ref()
        .ok_or_else(|| ProviderError::invalid_response("response has no `data` object"))?
        .get(symbol)
        .ok_or_else(|| ProviderError::invalid_response(format!("no data for {}", symbol)))?;

    let quote = coin.quote.get(&convert).ok_or_else(|| {
        ProviderError::invalid_response(format!("no {} quote for {}", convert, symbol))
    })?;

    let price = quote.price.ok_or_else(|| {
        ProviderError::invalid_response(format!("{}/{} quote has no price", symbol, convert))
    })?;

    let last_updated = quote
        .last_updated
        .as_deref()
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    Ok(PriceQuote {
        asset,
        convert,
        price,
        percent_change_24h: quote.percent_change_24h,
        last_updated,
        source: "coinmarketcap".to_string(),
    })
}

/// Longest body excerpt carried in an error message, in characters
const MAX_BODY_EXCERPT_CHARS: usize = 200;

/// Flattens a response body into one bounded line for error messages
///
/// Proxies answer with multi-line HTML pages; every run of whitespace
/// (newlines included) collapses to a single space.
pub fn body_excerpt(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(MAX_BODY_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}

/// Maps a non-2xx response to the matching error
pub fn status_error(status: StatusCode, body: &str) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthorized {
            status: status.as_u16(),
        },
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded,
        _ => {
            let message = serde_json::from_str::<ErrorBody>(body)
                .ok()
                .and_then(|b| b.status.error_message)
                .unwrap_or_else(|| body.to_string());
            let message = body_excerpt(&message);
            ProviderError::ApiError {
                status: status.as_u16(),
                message,
            }
        }
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::NetworkError(e)
    }
}

#[async_trait]
impl PriceFetcher for CoinMarketCapFetcher {
    async fn fetch_price(&self, asset: Asset, convert: &str) -> Result<PriceQuote, ProviderError> {
        let convert = convert.to_uppercase();
        let start = Instant::now();

        tracing::debug!(
            url = %self.api_url,
            symbol = asset.symbol(),
            convert = %convert,
            "Fetching price from CoinMarketCap"
        );

        let response = self
            .client
            .get(&self.api_url)
            .header(CMC_API_KEY_HEADER, self.api_key.as_str())
            .header(ACCEPT, "application/json")
            .query(&[("symbol", asset.symbol()), ("convert", convert.as_str())])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let response_text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(status_error(status, &response_text));
        }

        let quote = parse_quote(&response_text, asset, &convert)?;

        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            price = quote.price,
            percent_change_24h = ?quote.percent_change_24h,
            last_updated = %quote.last_updated,
            "Successfully fetched price from CoinMarketCap"
        );

        Ok(quote)
    }

    fn provider_name(&self) -> &'static str {
        "coinmarketcap"
    }
}
