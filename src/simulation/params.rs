//! Simulation Parameters
//!
//! Explicit run configuration passed into the pipeline. Nothing here is
//! process-wide state, so concurrent runs with different settings never
//! interfere.

use serde::{Deserialize, Serialize};

/// Default number of simulated paths
pub const DEFAULT_SIMULATIONS: usize = 10_000;
/// Default horizon in trading days (path length)
pub const DEFAULT_LENGTH: usize = 365;
/// Default percentile cut points (40th..60th)
pub const DEFAULT_PERCENTILES: [f64; 5] = [0.40, 0.45, 0.50, 0.55, 0.60];

/// Per-step GBM parameters in daily log-return units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GbmParams {
    /// Ito-adjusted drift (mean - variance / 2)
    pub drift: f64,
    /// Standard deviation of daily log returns
    pub sigma: f64,
}

impl GbmParams {
    pub fn new(drift: f64, sigma: f64) -> Self {
        Self { drift, sigma }
    }
}

/// Main simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of independent paths
    pub simulations: usize,
    /// Steps per path, including the seed value
    pub length: usize,
    /// Seed for reproducible runs (None = OS entropy)
    pub seed: Option<u64>,
    /// Percentile cut points in [0, 1), exported in this order
    pub percentiles: Vec<f64>,
    /// Generate paths across the rayon pool
    pub parallel: bool,
    /// Estimate over only the most recent N bars
    pub lookback_days: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            simulations: DEFAULT_SIMULATIONS,
            length: DEFAULT_LENGTH,
            seed: None,
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            parallel: true,
            lookback_days: None,
        }
    }
}

impl SimulationConfig {
    pub fn with_simulations(mut self, simulations: usize) -> Self {
        self.simulations = simulations;
        self
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_percentiles(mut self, percentiles: Vec<f64>) -> Self {
        self.percentiles = percentiles;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn with_lookback(mut self, days: usize) -> Self {
        self.lookback_days = Some(days);
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.simulations == 0 {
            return Err(ParamsError::InvalidSimulations(self.simulations));
        }
        if self.length == 0 {
            return Err(ParamsError::InvalidLength(self.length));
        }
        if self.percentiles.is_empty() {
            return Err(ParamsError::NoPercentiles);
        }
        if let Some(&p) = self.percentiles.iter().find(|p| !is_valid_percentile(**p)) {
            return Err(ParamsError::InvalidPercentile(p));
        }
        if let Some(days) = self.lookback_days {
            if days < 2 {
                return Err(ParamsError::InvalidLookback(days));
            }
        }
        Ok(())
    }
}

/// A percentile cut point must be finite and in [0, 1)
pub fn is_valid_percentile(p: f64) -> bool {
    p.is_finite() && (0.0..1.0).contains(&p)
}

/// Parameter validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamsError {
    #[error("Invalid simulation count: {0} (minimum 1)")]
    InvalidSimulations(usize),
    #[error("Invalid path length: {0} (minimum 1)")]
    InvalidLength(usize),
    #[error("At least one percentile is required")]
    NoPercentiles,
    #[error("Invalid percentile: {0} (must be 0 <= p < 1)")]
    InvalidPercentile(f64),
    #[error("Invalid lookback: {0} days (minimum 2)")]
    InvalidLookback(usize),
}
