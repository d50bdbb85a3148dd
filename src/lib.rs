//! gbm-forecast - Monte Carlo Stock Price Forecaster Library
//!
//! Estimates drift and volatility from daily log returns, simulates
//! geometric Brownian motion paths and selects the paths at requested
//! percentiles of terminal value.
//!
//! # Modules
//!
//! - `domain`: Core data types (PriceBar, PriceHistory, SimulatedPath, PathEnsemble)
//! - `ports`: Trait abstractions (PriceHistoryPort, PathExporter)
//! - `simulation`: Return estimation, GBM simulation, percentile selection
//! - `adapters`: External implementations (Alpha Vantage, delimited export, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Forecast pipeline

pub mod domain;
pub mod ports;
pub mod simulation;
pub mod adapters;
pub mod config;
pub mod application;
