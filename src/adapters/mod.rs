//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Alpha Vantage: daily price history over HTTP or from a saved response
//! - Export: delimited text output of selected paths
//! - CLI: Command-line interface handlers

pub mod alpha_vantage;
pub mod export;
pub mod cli;

pub use alpha_vantage::{AlphaVantageClient, SnapshotSource};
pub use export::DelimitedExporter;
pub use cli::CliApp;
