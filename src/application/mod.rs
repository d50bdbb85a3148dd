//! Application Layer - Use cases
//!
//! Wires the simulation core to a price source and an exporter.

pub mod pipeline;

pub use pipeline::{PipelineDriver, PipelineError, ForecastReport, statistics_summary};
