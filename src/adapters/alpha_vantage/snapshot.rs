//! Saved-response price source
//!
//! Serves a TIME_SERIES_DAILY_ADJUSTED response previously saved to disk, so
//! runs can be repeated offline against a fixed history.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::PriceHistory;
use crate::ports::{PriceHistoryError, PriceHistoryPort};
use super::types::DailyAdjustedResponse;

#[derive(Debug, Clone)]
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PriceHistoryPort for SnapshotSource {
    async fn fetch_daily(&self, symbol: &str) -> Result<PriceHistory, PriceHistoryError> {
        tracing::info!("Reading saved history for {} from {}", symbol, self.path.display());

        let body = tokio::fs::read_to_string(&self.path).await?;
        let response = DailyAdjustedResponse::from_json(&body)?;

        if let Some(meta) = &response.meta_data {
            if !symbol.is_empty() && !meta.symbol.eq_ignore_ascii_case(symbol) {
                tracing::warn!(
                    "Snapshot {} holds {} but {} was requested",
                    self.path.display(),
                    meta.symbol,
                    symbol
                );
            }
        }

        response.into_history()
    }
}
