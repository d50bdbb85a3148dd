//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the GBM forecaster.

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::adapters::alpha_vantage::{AlphaVantageClient, AlphaVantageConfig, SnapshotSource};
use crate::adapters::export::{percentile_label, DelimitedExporter};
use crate::application::{statistics_summary, ForecastReport, PipelineDriver};
use crate::config::{load_config, Config, API_KEY_ENV};
use crate::ports::PriceHistoryPort;
use crate::simulation::{ReturnEstimator, SimulationConfig};

/// Log level used when no configuration file is given
const DEFAULT_LOG_LEVEL: &str = "warn";

/// gbm-forecast - Monte Carlo stock price forecaster
#[derive(Parser, Debug)]
#[command(
    name = "gbm-forecast",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Monte Carlo stock price forecaster using geometric Brownian motion",
    long_about = "gbm-forecast fits drift and volatility to a ticker's daily log returns, \
                  simulates thousands of normalized price paths and exports the paths \
                  sitting at the requested percentiles of terminal value."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch history from Alpha Vantage and run a forecast
    Forecast(ForecastCmd),

    /// Run a forecast from a saved Alpha Vantage response
    Replay(ReplayCmd),

    /// Print return statistics without simulating
    Stats(StatsCmd),
}

/// Simulation flags shared by forecast and replay
#[derive(Args, Debug, Clone, Default)]
pub struct SimulationArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of simulated paths (default: 10000)
    #[arg(long, value_name = "N")]
    pub sims: Option<usize>,

    /// Simulation length in days (default: 365)
    #[arg(long, value_name = "DAYS")]
    pub len: Option<usize>,

    /// Seed for a reproducible run
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Print dataset statistics before simulating
    #[arg(long)]
    pub stats: bool,

    /// Output file for the percentile paths
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,

    /// Generate paths on one thread from a single generator
    #[arg(long)]
    pub sequential: bool,
}

impl SimulationArgs {
    /// Apply flag overrides on top of file values
    pub fn apply(&self, config: &mut Config) {
        if let Some(sims) = self.sims {
            config.simulation.simulations = sims;
        }
        if let Some(len) = self.len {
            config.simulation.length = len;
        }
        if self.seed.is_some() {
            config.simulation.seed = self.seed;
        }
        if self.stats {
            config.output.print_stats = true;
        }
        if let Some(ref output) = self.output {
            config.output.path = output.clone();
        }
        if self.sequential {
            config.simulation.parallel = false;
        }
    }
}

/// Run a forecast against the live data source
#[derive(Parser, Debug)]
pub struct ForecastCmd {
    /// Ticker symbol (default: GOOG)
    #[arg(short, long, value_name = "TICKER")]
    pub stock: Option<String>,

    /// Alpha Vantage API key (overrides ALPHAVANTAGE_API_KEY)
    #[arg(long, value_name = "KEY")]
    pub apikey: Option<String>,

    #[command(flatten)]
    pub simulation: SimulationArgs,
}

/// Run a forecast from a saved response
#[derive(Parser, Debug)]
pub struct ReplayCmd {
    /// Saved TIME_SERIES_DAILY_ADJUSTED JSON response
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Ticker the response is expected to hold
    #[arg(short, long, value_name = "TICKER")]
    pub stock: Option<String>,

    #[command(flatten)]
    pub simulation: SimulationArgs,
}

/// Print return statistics
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("source").required(true).multiple(true).args(["stock", "input"])))]
pub struct StatsCmd {
    /// Ticker symbol to fetch, or to check against --input
    #[arg(short, long, value_name = "TICKER")]
    pub stock: Option<String>,

    /// Saved TIME_SERIES_DAILY_ADJUSTED JSON response
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Alpha Vantage API key (overrides ALPHAVANTAGE_API_KEY)
    #[arg(long, value_name = "KEY")]
    pub apikey: Option<String>,

    /// Horizon in days for the analytic diagnostics
    #[arg(long, value_name = "DAYS", default_value = "365")]
    pub len: usize,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let config_path = match &app.command {
        Command::Forecast(cmd) => cmd.simulation.config.clone(),
        Command::Replay(cmd) => cmd.simulation.config.clone(),
        Command::Stats(cmd) => cmd.config.clone(),
    };
    let config = resolve_config(config_path.as_deref())?;

    let level = config_path
        .as_ref()
        .map(|_| config.logging.level.as_str())
        .unwrap_or(DEFAULT_LOG_LEVEL);
    init_logging(app.verbose, app.debug, level)?;

    match app.command {
        Command::Forecast(cmd) => forecast_command(cmd, config).await,
        Command::Replay(cmd) => replay_command(cmd, config).await,
        Command::Stats(cmd) => stats_command(cmd, config).await,
    }
}

/// Initialize logging system
fn init_logging(verbose: bool, debug: bool, level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .context("Invalid log level")?
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    Ok(())
}

fn resolve_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Build the exporter described by the output section
fn build_exporter(config: &Config) -> DelimitedExporter {
    let exporter = DelimitedExporter::new(config.output.resolved_path())
        .with_delimiter(config.output.delimiter_char());

    if config.output.header {
        let labels = config
            .simulation
            .percentiles
            .iter()
            .map(|p| percentile_label(*p))
            .collect();
        exporter.with_header(labels)
    } else {
        exporter
    }
}

/// Apply the API key override and make sure one is available
fn require_api_key(config: &mut Config, apikey: Option<String>) -> Result<()> {
    if apikey.is_some() {
        config.data_source.api_key = apikey;
    }
    config.data_source.get_api_key().with_context(|| {
        format!("No Alpha Vantage API key: pass --apikey or set {}", API_KEY_ENV)
    })?;
    Ok(())
}

/// Handle forecast command
async fn forecast_command(cmd: ForecastCmd, mut config: Config) -> Result<()> {
    cmd.simulation.apply(&mut config);
    if let Some(stock) = cmd.stock {
        config.data_source.ticker = stock;
    }
    require_api_key(&mut config, cmd.apikey)?;
    config.validate().context("Invalid forecast options")?;

    let client = AlphaVantageClient::with_config(AlphaVantageConfig::from(&config))
        .context("Failed to create Alpha Vantage client")?;

    run_forecast(&config, &client).await
}

/// Handle replay command
async fn replay_command(cmd: ReplayCmd, mut config: Config) -> Result<()> {
    cmd.simulation.apply(&mut config);
    if let Some(stock) = cmd.stock {
        config.data_source.ticker = stock;
    }
    config.validate().context("Invalid replay options")?;

    let source = SnapshotSource::new(cmd.input);
    run_forecast(&config, &source).await
}

/// Handle stats command
async fn stats_command(cmd: StatsCmd, mut config: Config) -> Result<()> {
    let history = match (cmd.input, cmd.stock) {
        (Some(input), stock) => {
            let symbol = stock.unwrap_or_default();
            SnapshotSource::new(input.clone())
                .fetch_daily(&symbol)
                .await
                .with_context(|| format!("Failed to read history from {}", input.display()))?
        }
        (None, Some(stock)) => {
            require_api_key(&mut config, cmd.apikey)?;
            let client = AlphaVantageClient::with_config(AlphaVantageConfig::from(&config))
                .context("Failed to create Alpha Vantage client")?;
            client
                .fetch_daily(&stock)
                .await
                .with_context(|| format!("Failed to fetch history for {}", stock))?
        }
        (None, None) => anyhow::bail!("Either --stock or --input is required"),
    };

    let estimator = match config.simulation.lookback_days {
        Some(days) => ReturnEstimator::with_lookback(days),
        None => ReturnEstimator::new(),
    };
    let sample = estimator
        .compute_returns(&history)
        .context("Not enough usable bars to estimate returns")?;
    let stats = sample
        .statistics()
        .context("Return sample has no spread")?;

    let horizon = cmd.len.saturating_sub(1) as f64;

    println!("{}", statistics_summary(&stats));
    println!();
    println!("Bars: {} ({} returns, {} skipped)", history.len(), stats.sample_size, sample.skipped().len());
    println!("Expected growth over {} days: {:.5}", cmd.len, stats.expected_growth(horizon));
    println!("Probability of gain over {} days: {:.5}", cmd.len, stats.probability_of_gain(horizon));

    Ok(())
}

async fn run_forecast<S>(config: &Config, source: &S) -> Result<()>
where
    S: PriceHistoryPort + ?Sized,
{
    let ticker = config.data_source.ticker.clone();
    let driver = PipelineDriver::new(SimulationConfig::from(config))
        .with_stats_output(config.output.print_stats);
    let exporter = build_exporter(config);

    let report = driver
        .forecast(source, &ticker, &exporter)
        .await
        .with_context(|| format!("Forecast for {} failed", ticker))?;

    print_report(&ticker, &report, exporter.path());
    Ok(())
}

fn print_report(ticker: &str, report: &ForecastReport, output: &Path) {
    println!(
        "✓ {} paths x {} days simulated for {}",
        report.path_count, report.path_length, ticker
    );
    println!(
        "  Percentiles: {}",
        report
            .percentiles
            .iter()
            .map(|p| percentile_label(*p))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  Paths ending above start: {:.2}% (model: {:.2}%)",
        report.empirical_gain_fraction * 100.0,
        report.analytic_gain_probability * 100.0
    );
    if !report.skipped.is_empty() {
        println!("  Skipped bars: {}", report.skipped.len());
    }
    if report.has_non_finite() {
        println!("  ⚠ {} paths carry non-finite values", report.non_finite_paths.len());
    }
    if let Some(seed) = report.seed {
        println!("  Seed: {}", seed);
    }
    println!("  Output: {}", output.display());
}
