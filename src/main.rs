//! gbm-forecast - Monte Carlo stock price forecaster
//!
//! Fits geometric Brownian motion to daily returns and exports percentile paths.

use anyhow::Result;

use gbm_forecast::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (API keys go here, not in config.toml)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
