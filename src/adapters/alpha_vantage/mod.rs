//! Alpha Vantage Adapter
//!
//! Implementations of the PriceHistoryPort backed by Alpha Vantage daily
//! adjusted time series, either live over HTTP or from a saved response.

mod client;
mod snapshot;
mod types;

pub use client::{AlphaVantageClient, AlphaVantageConfig, DEFAULT_API_URL};
pub use snapshot::SnapshotSource;
pub use types::{DailyAdjustedResponse, MetaData, OutputSize};
