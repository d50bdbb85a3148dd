//! Daily Log-Return Estimation
//!
//! Turns a date-keyed price history into a sample of session log returns,
//! ln(close / open), and derives the statistics that parameterize the GBM
//! simulation:
//! - mean: arithmetic average of the sample
//! - variance: population variance, sum((x - mean)^2) / N
//! - std_dev: sqrt(variance)
//! - drift: mean - variance / 2 (Ito correction for log-normal compounding)
//!
//! Bars that cannot be parsed are skipped and reported back alongside the
//! sample rather than aborting the estimate.

use serde::{Deserialize, Serialize};
use statrs::function::erf::erf;
use thiserror::Error;

use crate::domain::{DataQualityIssue, IssueReason, PriceBar, PriceHistory};
use super::params::GbmParams;

/// Minimum usable bars for a defined variance
pub const MIN_USABLE_BARS: usize = 2;

/// Estimation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error("Insufficient data: {usable} usable bars ({skipped} skipped), need at least 2")]
    InsufficientData { usable: usize, skipped: usize },
    #[error("Cannot compute statistics of an empty sample")]
    DegenerateSample,
}

/// Log-return sample plus the diagnostics of every bar left out of it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnSample {
    values: Vec<f64>,
    skipped: Vec<DataQualityIssue>,
}

impl ReturnSample {
    /// Wrap an existing set of returns (no diagnostics)
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values, skipped: Vec::new() }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Bars that were skipped while building the sample
    pub fn skipped(&self) -> &[DataQualityIssue] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn statistics(&self) -> Result<Statistics, EstimationError> {
        compute_statistics(&self.values)
    }
}

/// Summary statistics of a return sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub drift: f64,
    pub sample_size: usize,
}

impl Statistics {
    /// Per-step parameters for the path simulator
    pub fn gbm_params(&self) -> GbmParams {
        GbmParams::new(self.drift, self.std_dev)
    }

    /// Expected growth factor over `horizon` steps: exp(mean * horizon)
    pub fn expected_growth(&self, horizon: f64) -> f64 {
        (self.mean * horizon).exp()
    }

    /// Probability that the growth factor ends above 1.0 after `horizon`
    /// steps. ln(S_T) ~ N(drift * T, sigma^2 * T), so this is
    /// Phi(drift * T / (sigma * sqrt(T))).
    pub fn probability_of_gain(&self, horizon: f64) -> f64 {
        if horizon <= 0.0 {
            return 0.5;
        }
        let spread = self.std_dev * horizon.sqrt();
        let location = self.drift * horizon;
        if spread == 0.0 {
            return if location > 0.0 {
                1.0
            } else if location < 0.0 {
                0.0
            } else {
                0.5
            };
        }
        standard_normal_cdf(location / spread)
    }
}

/// Phi(z) = 0.5 * (1 + erf(z / sqrt(2)))
fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Mean, population variance, standard deviation and Ito-adjusted drift
pub fn compute_statistics(sample: &[f64]) -> Result<Statistics, EstimationError> {
    if sample.is_empty() {
        return Err(EstimationError::DegenerateSample);
    }

    let n = sample.len() as f64;
    let mean = sample.iter().sum::<f64>() / n;
    let variance = sample.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    let drift = mean - 0.5 * variance;

    Ok(Statistics {
        mean,
        variance,
        std_dev,
        drift,
        sample_size: sample.len(),
    })
}

/// Builds return samples from price history
#[derive(Debug, Clone, Default)]
pub struct ReturnEstimator {
    /// Only the most recent N bars are used when set
    lookback: Option<usize>,
}

impl ReturnEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimate over the most recent `days` bars only
    pub fn with_lookback(days: usize) -> Self {
        Self { lookback: Some(days) }
    }

    pub fn lookback(&self) -> Option<usize> {
        self.lookback
    }

    /// Compute ln(close / open) for every usable bar.
    ///
    /// Unusable bars are logged and collected in `ReturnSample::skipped`.
    /// Fails only when fewer than two usable bars remain.
    pub fn compute_returns(&self, history: &PriceHistory) -> Result<ReturnSample, EstimationError> {
        let window = self
            .lookback
            .map_or(0, |n| history.len().saturating_sub(n));

        let mut sample = ReturnSample {
            values: Vec::with_capacity(history.len() - window),
            skipped: Vec::new(),
        };

        for (date, raw) in history.iter().skip(window) {
            let issue = match PriceBar::parse(date, raw) {
                Ok(bar) => {
                    let r = bar.log_return();
                    if r.is_finite() {
                        sample.values.push(r);
                        continue;
                    }
                    DataQualityIssue {
                        date: date.clone(),
                        reason: IssueReason::NonFinite("return"),
                    }
                }
                Err(issue) => issue,
            };

            tracing::warn!("Skipping bar {}", issue);
            sample.skipped.push(issue);
        }

        if sample.values.len() < MIN_USABLE_BARS {
            return Err(EstimationError::InsufficientData {
                usable: sample.values.len(),
                skipped: sample.skipped.len(),
            });
        }

        tracing::debug!(
            "Built return sample: {} returns, {} bars skipped",
            sample.values.len(),
            sample.skipped.len()
        );

        Ok(sample)
    }
}
