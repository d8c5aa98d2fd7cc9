//! Exchange rate source abstractions

use async_trait::async_trait;
use thiserror::Error;

use super::pair::CurrencyPair;
use super::rate::RateMapping;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Carries no URL, so the credential in the query string never reaches logs.
    #[error("Request error: {0}")]
    Transport(reqwest::Error),
    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),
    #[error("Failed to parse rates response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid rate {value} for currency: {code}")]
    InvalidRate { code: String, value: String },
    #[error("No rate found for currency pair: {0}")]
    MissingRate(CurrencyPair),
}

impl FetchError {
    /// Failures that happen before a response body is available. These degrade
    /// to an empty snapshot instead of failing the tick.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Status(_))
    }
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn latest(&self) -> Result<RateMapping, FetchError>;
}
