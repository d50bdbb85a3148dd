//! CLI Adapter
//!
//! Command-line interface for the GBM forecaster.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CliApp, Command, ForecastCmd, ReplayCmd, StatsCmd, SimulationArgs};

use anyhow::Result;

/// Initialize the CLI application
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    commands::execute(app).await
}
