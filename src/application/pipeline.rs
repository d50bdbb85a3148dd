//! Forecast Pipeline
//!
//! Runs price history -> log returns -> statistics -> GBM ensemble ->
//! percentile paths, and hands the selection to an exporter. Component
//! errors pass through unchanged; this layer makes no recovery decisions.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::domain::{DataQualityIssue, PathEnsemble, PriceHistory, SimulatedPath};
use crate::ports::{ExportError, PathExporter, PriceHistoryError, PriceHistoryPort};
use crate::simulation::{
    EstimationError, PathSimulator, PercentileSelector, ReturnEstimator, SelectionError,
    SimulationConfig, SimulationError, Statistics,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    PriceHistory(#[from] PriceHistoryError),
    #[error(transparent)]
    Estimation(#[from] EstimationError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Simulation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Outcome of one pipeline run
#[derive(Debug, Clone)]
pub struct ForecastReport {
    pub statistics: Statistics,
    /// Bars left out of the return sample
    pub skipped: Vec<DataQualityIssue>,
    /// Requested percentiles, parallel to `selected`
    pub percentiles: Vec<f64>,
    pub selected: Vec<SimulatedPath>,
    pub path_length: usize,
    pub path_count: usize,
    /// Ensemble indices of paths carrying NaN/Inf values
    pub non_finite_paths: Vec<usize>,
    /// Share of simulated paths ending above the starting value
    pub empirical_gain_fraction: f64,
    /// Same share implied by the fitted parameters
    pub analytic_gain_probability: f64,
    /// Seed that reproduces this run, when the run was seeded
    pub seed: Option<u64>,
    pub generated_at: DateTime<Utc>,
}

impl ForecastReport {
    pub fn has_non_finite(&self) -> bool {
        !self.non_finite_paths.is_empty()
    }
}

/// Human-readable statistics block printed before a simulation
pub fn statistics_summary(stats: &Statistics) -> String {
    format!(
        "Average: {:.5}\nVariance: {:.5}\nStandard Deviation: {:.5}\n\nDrift: {:.5}",
        stats.mean, stats.variance, stats.std_dev, stats.drift
    )
}

/// Orchestrates estimator, simulator and selector for one configuration
#[derive(Debug, Clone)]
pub struct PipelineDriver {
    config: SimulationConfig,
    estimator: ReturnEstimator,
    selector: PercentileSelector,
    print_stats: bool,
}

impl PipelineDriver {
    pub fn new(config: SimulationConfig) -> Self {
        let estimator = match config.lookback_days {
            Some(days) => ReturnEstimator::with_lookback(days),
            None => ReturnEstimator::new(),
        };

        Self {
            config,
            estimator,
            selector: PercentileSelector::new(),
            print_stats: false,
        }
    }

    /// Print the statistics block to stdout before simulating
    pub fn with_stats_output(mut self, enabled: bool) -> Self {
        self.print_stats = enabled;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Return sample and its statistics
    pub fn estimate(
        &self,
        history: &PriceHistory,
    ) -> Result<(Vec<DataQualityIssue>, Statistics), PipelineError> {
        let sample = self.estimator.compute_returns(history)?;
        let statistics = sample.statistics()?;

        tracing::info!(
            "Estimated from {} returns: mean={:.6}, variance={:.6}, std_dev={:.6}, drift={:.6}",
            statistics.sample_size,
            statistics.mean,
            statistics.variance,
            statistics.std_dev,
            statistics.drift
        );

        Ok((sample.skipped().to_vec(), statistics))
    }

    /// Simulate the ensemble for `statistics` and pick the percentile paths.
    ///
    /// Parallel runs draw one seed from `rng` for the per-path streams;
    /// sequential runs consume `rng` directly.
    pub fn project<R: Rng + ?Sized>(
        &self,
        statistics: &Statistics,
        rng: &mut R,
    ) -> Result<(PathEnsemble, Vec<SimulatedPath>), PipelineError> {
        let simulator = PathSimulator::new(statistics.gbm_params())?;
        let (length, count) = (self.config.length, self.config.simulations);

        let ensemble = if self.config.parallel {
            simulator.simulate_parallel(length, count, rng.gen())?
        } else {
            simulator.simulate(length, count, rng)?
        };

        let selected = self.selector.select(&ensemble, &self.config.percentiles)?;
        Ok((ensemble, selected))
    }

    /// Full pipeline over `history` with an injected generator
    pub fn run<R: Rng + ?Sized>(
        &self,
        history: &PriceHistory,
        rng: &mut R,
    ) -> Result<ForecastReport, PipelineError> {
        let (skipped, statistics) = self.estimate(history)?;
        if self.print_stats {
            println!("{}\n", statistics_summary(&statistics));
        }
        self.report(skipped, statistics, rng)
    }

    /// Full pipeline seeded from the configuration, or from a fresh random
    /// seed that is logged and recorded in the report
    pub fn run_seeded(&self, history: &PriceHistory) -> Result<ForecastReport, PipelineError> {
        let seed = self.resolve_seed();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut report = self.run(history, &mut rng)?;
        report.seed = Some(seed);
        Ok(report)
    }

    /// Fetch `ticker` from `source`, run the pipeline and export the selection
    pub async fn forecast<S, E>(
        &self,
        source: &S,
        ticker: &str,
        exporter: &E,
    ) -> Result<ForecastReport, PipelineError>
    where
        S: PriceHistoryPort + ?Sized,
        E: PathExporter + ?Sized,
    {
        let history = source.fetch_daily(ticker).await?;
        tracing::info!("Received {} daily bars for {}", history.len(), ticker);

        // Simulation is CPU-bound; keep it off the async workers
        let driver = self.clone();
        let report = tokio::task::spawn_blocking(move || driver.run_seeded(&history)).await??;
        exporter.export(&report.selected, report.path_length)?;

        tracing::info!(
            "Forecast for {} complete: {} paths x {} steps, {} percentile paths exported",
            ticker,
            report.path_count,
            report.path_length,
            report.selected.len()
        );
        Ok(report)
    }

    fn resolve_seed(&self) -> u64 {
        match self.config.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random();
                tracing::info!("No seed configured, using {}", seed);
                seed
            }
        }
    }

    fn report<R: Rng + ?Sized>(
        &self,
        skipped: Vec<DataQualityIssue>,
        statistics: Statistics,
        rng: &mut R,
    ) -> Result<ForecastReport, PipelineError> {
        let (ensemble, selected) = self.project(&statistics, rng)?;
        let horizon = self.config.length.saturating_sub(1) as f64;

        Ok(ForecastReport {
            statistics,
            skipped,
            percentiles: self.config.percentiles.clone(),
            selected,
            path_length: ensemble.path_length(),
            path_count: ensemble.path_count(),
            non_finite_paths: ensemble.non_finite_paths(),
            empirical_gain_fraction: ensemble.fraction_above(1.0),
            analytic_gain_probability: statistics.probability_of_gain(horizon),
            seed: None,
            generated_at: Utc::now(),
        })
    }
}
