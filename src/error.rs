//! Error types for the price ticker

use crate::types::ErrorKind;
use thiserror::Error;

/// Errors that can occur when fetching a price from a provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Timeout waiting for response
    #[error("Request timeout")]
    Timeout,

    /// API key rejected (401/403)
    #[error("Unauthorized (HTTP {status}): check the API key")]
    Unauthorized { status: u16 },

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Provider answered with an error status or error payload
    #[error("Provider API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Classifies the error into the three failure kinds the poll loop reports
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::NetworkError(e) if e.is_decode() => ErrorKind::MalformedResponse,
            ProviderError::NetworkError(_) | ProviderError::Timeout => ErrorKind::Network,
            ProviderError::Unauthorized { .. }
            | ProviderError::RateLimitExceeded
            | ProviderError::ApiError { .. } => ErrorKind::Status,
            ProviderError::InvalidResponse(_) => ErrorKind::MalformedResponse,
        }
    }

    /// Creates an InvalidResponse error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}

/// Errors raised while assembling the startup configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key variable is unset or blank
    #[error("Missing required environment variable: {var}")]
    MissingApiKey { var: &'static str },

    /// Poll interval must be at least one second
    #[error("Poll interval must be positive")]
    InvalidInterval,

    /// Conversion currency is blank
    #[error("Conversion currency must not be empty")]
    InvalidConvert,

    /// Endpoint URL is not an absolute http(s) URL
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(ProviderError::Timeout.kind(), ErrorKind::Network);
        assert_eq!(
            ProviderError::Unauthorized { status: 401 }.kind(),
            ErrorKind::Status
        );
        assert_eq!(ProviderError::RateLimitExceeded.kind(), ErrorKind::Status);
        assert_eq!(
            ProviderError::ApiError {
                status: 500,
                message: "boom".to_string()
            }
            .kind(),
            ErrorKind::Status
        );
        assert_eq!(
            ProviderError::invalid_response("no price").kind(),
            ErrorKind::MalformedResponse
        );
    }

    #[test]
    fn test_missing_key_message_names_variable() {
        let err = ConfigError::MissingApiKey { var: "CMC_API_KEY" };
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: CMC_API_KEY"
        );
    }
}
