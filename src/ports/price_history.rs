//! Price History Port
//!
//! Source of date-keyed daily bars for a ticker. Values arrive as text and
//! are parsed downstream, so a source never rejects a record for bad
//! numbers; only transport and provider failures are errors here.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::PriceHistory;

/// Price history error type
#[derive(Error, Debug)]
pub enum PriceHistoryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider error: {0}")]
    Api(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Data parsing error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read price history: {0}")]
    Io(#[from] std::io::Error),
}

/// Daily price history source
#[async_trait]
pub trait PriceHistoryPort: Send + Sync {
    /// Fetch the full daily history for `symbol`
    async fn fetch_daily(&self, symbol: &str) -> Result<PriceHistory, PriceHistoryError>;
}
