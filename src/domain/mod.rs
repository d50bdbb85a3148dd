//! Domain Layer - Core data types for the forecaster
//!
//! Pure types with no I/O. External interactions happen through the ports
//! layer.
//!
//! - `price_bar`: provider records, parsed bars and data-quality diagnostics
//! - `path`: simulated growth paths and the ensemble they belong to

pub mod price_bar;
pub mod path;

pub use price_bar::{DailyBar, PriceBar, PriceHistory, DataQualityIssue, IssueReason};
pub use path::{SimulatedPath, PathEnsemble, PATH_SEED_VALUE};
