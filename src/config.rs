//! Startup configuration
//!
//! A [`Config`] is assembled once in `main` from the environment (and an
//! optional `.env` file) plus CLI overrides, then handed by reference to the
//! fetcher and the poll loop. Nothing reads the environment after that.

use crate::{
    constants::{
        API_KEY_ENV, API_URL_ENV, CMC_QUOTES_LATEST_URL, DEFAULT_ASSET, DEFAULT_CONVERT,
        POLL_INTERVAL_SECS, REQUEST_TIMEOUT_SECS,
    },
    error::ConfigError,
    types::Asset,
};
use std::fmt;
use std::time::Duration;

/// Immutable runtime configuration
#[derive(Clone)]
pub struct Config {
    api_key: String,
    api_url: String,
    asset: Asset,
    convert: String,
    poll_interval: Duration,
    request_timeout: Duration,
}

impl Config {
    /// Creates a configuration with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey { var: API_KEY_ENV });
        }

        Ok(Self {
            api_key,
            api_url: CMC_QUOTES_LATEST_URL.to_string(),
            asset: DEFAULT_ASSET,
            convert: DEFAULT_CONVERT.to_string(),
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        })
    }

    /// Loads `.env` if present, then reads the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup
    ///
    /// # Arguments
    /// * `lookup` - Returns the value of an environment variable, if set
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV).ok_or(ConfigError::MissingApiKey { var: API_KEY_ENV })?;
        let config = Self::new(api_key)?;

        match lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            Some(url) => config.with_api_url(url),
            None => Ok(config),
        }
    }

    /// Overrides the endpoint URL
    pub fn with_api_url(mut self, url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into().trim().to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(url));
        }
        self.api_url = url;
        Ok(self)
    }

    /// Sets the tracked asset
    pub fn with_asset(mut self, asset: Asset) -> Self {
        self.asset = asset;
        self
    }

    /// Sets the conversion currency (stored uppercase)
    pub fn with_convert(mut self, convert: impl AsRef<str>) -> Result<Self, ConfigError> {
        let convert = convert.as_ref().trim().to_uppercase();
        if convert.is_empty() {
            return Err(ConfigError::InvalidConvert);
        }
        self.convert = convert;
        Ok(self)
    }

    /// Sets the poll interval in whole seconds
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Result<Self, ConfigError> {
        if secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        self.poll_interval = Duration::from_secs(secs);
        Ok(self)
    }

    /// Sets the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// API key sent in the request header
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Quotes endpoint URL
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Asset whose price is polled
    pub fn asset(&self) -> Asset {
        self.asset
    }

    /// Conversion currency, uppercase
    pub fn convert(&self) -> &str {
        &self.convert
    }

    /// Pause between the end of one iteration and the next fetch
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Timeout applied to each HTTP request
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("asset", &self.asset)
            .field("convert", &self.convert)
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("CMC_API_KEY", "abc")])).unwrap();
        assert_eq!(config.api_key(), "abc");
        assert_eq!(config.api_url(), CMC_QUOTES_LATEST_URL);
        assert_eq!(config.asset(), Asset::BTC);
        assert_eq!(config.convert(), "USD");
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_missing_or_blank_key() {
        assert_eq!(
            Config::from_lookup(lookup_from(&[])).unwrap_err(),
            ConfigError::MissingApiKey { var: "CMC_API_KEY" }
        );
        assert_eq!(
            Config::from_lookup(lookup_from(&[("CMC_API_KEY", "   ")])).unwrap_err(),
            ConfigError::MissingApiKey { var: "CMC_API_KEY" }
        );
    }

    #[test]
    fn test_url_override() {
        let config = Config::from_lookup(lookup_from(&[
            ("CMC_API_KEY", "abc"),
            ("CMC_API_URL", "http://127.0.0.1:9000/quotes"),
        ]))
        .unwrap();
        assert_eq!(config.api_url(), "http://127.0.0.1:9000/quotes");

        let err = Config::new("abc").unwrap().with_api_url("ftp://nope").unwrap_err();
        assert_eq!(err, ConfigError::InvalidUrl("ftp://nope".to_string()));
    }

    #[test]
    fn test_overrides() {
        let config = Config::new("abc")
            .unwrap()
            .with_asset(Asset::ETH)
            .with_convert(" eur ")
            .unwrap()
            .with_poll_interval_secs(5)
            .unwrap();
        assert_eq!(config.asset(), Asset::ETH);
        assert_eq!(config.convert(), "EUR");
        assert_eq!(config.poll_interval(), Duration::from_secs(5));

        assert_eq!(
            Config::new("abc").unwrap().with_poll_interval_secs(0).unwrap_err(),
            ConfigError::InvalidInterval
        );
    }

    #[test]
    fn test_blank_convert_rejected() {
        for convert in ["", "   "] {
            assert_eq!(
                Config::new("abc").unwrap().with_convert(convert).unwrap_err(),
                ConfigError::InvalidConvert
            );
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config::new("super-secret").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
