//! Simulation Layer - Return estimation, GBM Monte Carlo and percentile paths
//!
//! The numerical core of the forecaster:
//! - `returns`: daily log returns and their mean / variance / drift
//! - `gbm_simulator`: independent geometric Brownian motion growth paths
//! - `percentile`: order-statistic selection of representative paths
//! - `params`: explicit run configuration

pub mod params;
pub mod returns;
pub mod gbm_simulator;
pub mod percentile;

pub use params::{SimulationConfig, GbmParams, ParamsError, DEFAULT_PERCENTILES};
pub use returns::{ReturnEstimator, ReturnSample, Statistics, EstimationError, compute_statistics};
pub use gbm_simulator::{PathSimulator, SimulationError};
pub use percentile::{PercentileSelector, SelectionError};
