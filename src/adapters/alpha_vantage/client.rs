//! Alpha Vantage API Client
//!
//! HTTP client for the TIME_SERIES_DAILY_ADJUSTED endpoint. One request per
//! fetch; failures are surfaced to the caller without retrying.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::domain::PriceHistory;
use crate::ports::{PriceHistoryError, PriceHistoryPort};
use super::types::{DailyAdjustedResponse, OutputSize};

/// Default Alpha Vantage API address
pub const DEFAULT_API_URL: &str = "https://www.alphavantage.co";

const DAILY_ADJUSTED_FUNCTION: &str = "TIME_SERIES_DAILY_ADJUSTED";

/// Alpha Vantage client configuration
#[derive(Debug, Clone)]
pub struct AlphaVantageConfig {
    /// Base URL for the API
    pub api_url: String,
    /// API key (free keys from alphavantage.co)
    pub api_key: String,
    /// Amount of history to request
    pub output_size: OutputSize,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            output_size: OutputSize::Full,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Alpha Vantage daily price client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    config: AlphaVantageConfig,
    http: Client,
}

impl AlphaVantageClient {
    /// Create a client with default configuration and the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self, PriceHistoryError> {
        Self::with_config(AlphaVantageConfig {
            api_key: api_key.into(),
            ..AlphaVantageConfig::default()
        })
    }

    /// Create a client with custom configuration
    pub fn with_config(config: AlphaVantageConfig) -> Result<Self, PriceHistoryError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    /// Query endpoint (without parameters)
    pub fn endpoint(&self) -> String {
        format!("{}/query", self.config.api_url.trim_end_matches('/'))
    }

    /// Query parameters for `symbol`
    fn query_params<'a>(&'a self, symbol: &'a str) -> [(&'static str, &'a str); 4] {
        [
            ("function", DAILY_ADJUSTED_FUNCTION),
            ("symbol", symbol),
            ("outputsize", self.config.output_size.as_str()),
            ("apikey", self.config.api_key.as_str()),
        ]
    }

    pub fn config(&self) -> &AlphaVantageConfig {
        &self.config
    }
}

#[async_trait]
impl PriceHistoryPort for AlphaVantageClient {
    async fn fetch_daily(&self, symbol: &str) -> Result<PriceHistory, PriceHistoryError> {
        tracing::info!("Fetching daily history for {} from {}", symbol, self.config.api_url);

        let response = self
            .http
            .get(self.endpoint())
            .query(&self.query_params(symbol))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(PriceHistoryError::Api(format!("API error {}: {}", status, body)));
        }

        DailyAdjustedResponse::from_json(&body)?.into_history()
    }
}
