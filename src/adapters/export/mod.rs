//! Export Adapters
//!
//! PathExporter implementations for downstream plotting tools.

mod delimited;

pub use delimited::{DelimitedExporter, percentile_label};
