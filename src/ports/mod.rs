//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement:
//! - Price history sources (daily OHLC bars by ticker)
//! - Path exporters (selected percentile paths)

pub mod price_history;
pub mod export;
pub mod mocks;

pub use price_history::{PriceHistoryPort, PriceHistoryError};
pub use export::{PathExporter, ExportError};
pub use mocks::MockPriceHistory;
