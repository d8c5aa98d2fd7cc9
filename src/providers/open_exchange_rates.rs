use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::currency::{FetchError, RateSource};
use crate::core::rate::RateMapping;

// OpenExchangeRatesProvider implementation for RateSource
pub struct OpenExchangeRatesProvider {
    base_url: String,
    app_id: String,
    client: reqwest::Client,
}

impl OpenExchangeRatesProvider {
    pub fn new(base_url: &str, app_id: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ratefeed/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(OpenExchangeRatesProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    rates: HashMap<String, serde_json::Number>,
}

/// Converts through the number's JSON text so the decimal keeps the scale it
/// was published with (`1.0` stays `1.0`).
fn parse_rate(number: &serde_json::Number) -> Option<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

pub(crate) fn decode_latest(body: &str) -> Result<RateMapping, FetchError> {
    let data: LatestResponse = serde_json::from_str(body)?;
    data.rates
        .into_iter()
        .map(|(code, number)| match parse_rate(&number) {
            Some(rate) => Ok((code, rate)),
            None => Err(FetchError::InvalidRate {
                code,
                value: number.to_string(),
            }),
        })
        .collect()
}

#[async_trait]
impl RateSource for OpenExchangeRatesProvider {
    #[instrument(name = "OpenExchangeRatesFetch", skip(self))]
    async fn latest(&self) -> Result<RateMapping, FetchError> {
        let url = format!("{}/latest.json", self.base_url);
        debug!("Requesting latest rates from {}", url);

        let response = self
            .client
            .get(format!("{url}?app_id={}", self.app_id))
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;
        let mapping = decode_latest(&text)?;
        debug!(currencies = mapping.len(), "Received latest rates");
        Ok(mapping)
    }
}
