//! Configuration Loader
//!
//! Loads and validates configuration from TOML files. Every section and
//! field is optional; an empty file yields the defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::adapters::alpha_vantage::{AlphaVantageConfig, OutputSize, DEFAULT_API_URL};
use crate::simulation::params::{
    is_valid_percentile, SimulationConfig, DEFAULT_LENGTH, DEFAULT_PERCENTILES,
    DEFAULT_SIMULATIONS,
};

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationSection,
    #[serde(default)]
    pub data_source: DataSourceSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Simulation configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSection {
    /// Number of simulated paths
    #[serde(default = "default_simulations")]
    pub simulations: usize,
    /// Simulation horizon in days
    #[serde(default = "default_length")]
    pub length: usize,
    /// Seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
    /// Percentile cut points to export, each in [0, 1)
    #[serde(default = "default_percentiles")]
    pub percentiles: Vec<f64>,
    /// Generate paths on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Estimate from the most recent N bars only
    #[serde(default)]
    pub lookback_days: Option<usize>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            simulations: default_simulations(),
            length: default_length(),
            seed: None,
            percentiles: default_percentiles(),
            parallel: true,
            lookback_days: None,
        }
    }
}

/// Alpha Vantage configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct DataSourceSection {
    /// API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// API key (prefer ALPHAVANTAGE_API_KEY in .env)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Ticker symbol to simulate
    #[serde(default = "default_ticker")]
    pub ticker: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// "full" or "compact"
    #[serde(default)]
    pub output_size: OutputSize,
}

impl Default for DataSourceSection {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            ticker: default_ticker(),
            timeout_secs: default_timeout_secs(),
            output_size: OutputSize::Full,
        }
    }
}

impl DataSourceSection {
    /// Get API key with environment variable fallback
    /// Checks ALPHAVANTAGE_API_KEY env var if config value is empty/None
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())
    }
}

/// Output configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
    /// Destination file (supports ~)
    #[serde(default = "default_output_path")]
    pub path: String,
    /// Column delimiter, a single character
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Write a header row
    #[serde(default)]
    pub header: bool,
    /// Print dataset statistics before simulating
    #[serde(default)]
    pub print_stats: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            delimiter: default_delimiter(),
            header: false,
            print_stats: false,
        }
    }
}

impl OutputSection {
    /// Output path with `~` expanded
    pub fn resolved_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).to_string())
    }

    /// The delimiter as a char (validated to be exactly one)
    pub fn delimiter_char(&self) -> char {
        self.delimiter.chars().next().unwrap_or(',')
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_simulations() -> usize {
    DEFAULT_SIMULATIONS
}

fn default_length() -> usize {
    DEFAULT_LENGTH
}

fn default_percentiles() -> Vec<f64> {
    DEFAULT_PERCENTILES.to_vec()
}

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_ticker() -> String {
    "GOOG".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_output_path() -> String {
    "output.csv".to_string()
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = shellexpand::tilde(&path.as_ref().to_string_lossy()).to_string();
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;

        if sim.simulations == 0 {
            return Err(ConfigError::ValidationError(format!(
                "simulations must be > 0, got {}",
                sim.simulations
            )));
        }

        if sim.length == 0 {
            return Err(ConfigError::ValidationError(format!(
                "length must be > 0, got {}",
                sim.length
            )));
        }

        if sim.percentiles.is_empty() {
            return Err(ConfigError::ValidationError(
                "percentiles cannot be empty".to_string(),
            ));
        }

        if let Some(p) = sim.percentiles.iter().find(|p| !is_valid_percentile(**p)) {
            return Err(ConfigError::ValidationError(format!(
                "percentiles must be in [0, 1), got {}",
                p
            )));
        }

        if let Some(days) = sim.lookback_days {
            if days < 2 {
                return Err(ConfigError::ValidationError(format!(
                    "lookback_days must be >= 2, got {}",
                    days
                )));
            }
        }

        if self.data_source.ticker.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "ticker cannot be empty".to_string(),
            ));
        }

        if self.data_source.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api_url cannot be empty".to_string(),
            ));
        }

        if self.data_source.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        if self.output.delimiter.chars().count() != 1 {
            return Err(ConfigError::ValidationError(format!(
                "delimiter must be a single character, got '{}'",
                self.output.delimiter
            )));
        }

        if self.output.path.is_empty() {
            return Err(ConfigError::ValidationError(
                "output path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// Conversion from Config to SimulationConfig
impl From<&Config> for SimulationConfig {
    fn from(config: &Config) -> Self {
        let sim = &config.simulation;
        SimulationConfig {
            simulations: sim.simulations,
            length: sim.length,
            seed: sim.seed,
            percentiles: sim.percentiles.clone(),
            parallel: sim.parallel,
            lookback_days: sim.lookback_days,
        }
    }
}

// Conversion from Config to the Alpha Vantage client config
impl From<&Config> for AlphaVantageConfig {
    fn from(config: &Config) -> Self {
        let ds = &config.data_source;
        AlphaVantageConfig {
            api_url: ds.api_url.clone(),
            api_key: ds.get_api_key().unwrap_or_default(),
            output_size: ds.output_size,
            timeout: Duration::from_secs(ds.timeout_secs),
        }
    }
}
