//! Geometric Brownian Motion Path Simulation
//!
//! Generates independent growth paths normalized to 1.0:
//!
//! path[0] = 1.0
//! path[i] = path[i-1] * exp(drift + sigma * Z_i),  Z_i ~ N(0, 1)
//!
//! Each step draws a fresh normal variate; nothing is shared between paths
//! or steps. The level is accumulated in log space and exponentiated once
//! per step, so a pathological drift or sigma shows up as NaN/Inf in the
//! path instead of being clamped.
//!
//! Two generation modes:
//! - `simulate`: sequential, consumes the injected generator path by path
//! - `simulate_parallel`: rayon, one seeded StdRng stream per path

use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use statrs::distribution::Normal;
use thiserror::Error;

use crate::domain::{PathEnsemble, SimulatedPath, PATH_SEED_VALUE};
use super::params::GbmParams;

/// Simulation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("Invalid path length: {0} (minimum 1)")]
    InvalidPathLength(usize),
    #[error("Invalid GBM parameters: {0}")]
    InvalidParams(String),
}

/// GBM path generator for one set of parameters
#[derive(Debug, Clone)]
pub struct PathSimulator {
    params: GbmParams,
    normal: Normal,
}

impl PathSimulator {
    /// Create a simulator. Negative or non-finite sigma is rejected; a
    /// non-finite drift is accepted and surfaces as non-finite paths.
    pub fn new(params: GbmParams) -> Result<Self, SimulationError> {
        if !params.sigma.is_finite() || params.sigma < 0.0 {
            return Err(SimulationError::InvalidParams(format!(
                "sigma must be finite and >= 0, got {}",
                params.sigma
            )));
        }

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| SimulationError::InvalidParams(e.to_string()))?;

        Ok(Self { params, normal })
    }

    pub fn params(&self) -> GbmParams {
        self.params
    }

    /// Generate `path_count` paths of `path_length` steps from `rng`.
    ///
    /// Consumes `path_length - 1` normal draws per path, path by path, so the
    /// result is reproducible for a given generator state.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        path_length: usize,
        path_count: usize,
        rng: &mut R,
    ) -> Result<PathEnsemble, SimulationError> {
        check_length(path_length)?;

        let paths = (0..path_count)
            .map(|_| self.generate_path(path_length, rng))
            .collect();

        Ok(self.finish(paths, path_length))
    }

    /// Generate paths across the rayon pool.
    ///
    /// A master StdRng seeded with `seed` hands out one seed per path, in path
    /// order, before any work is scheduled. Every path then draws from its
    /// own stream, so the ensemble is identical for a given seed no matter
    /// how many threads run it.
    pub fn simulate_parallel(
        &self,
        path_length: usize,
        path_count: usize,
        seed: u64,
    ) -> Result<PathEnsemble, SimulationError> {
        check_length(path_length)?;

        let mut master = StdRng::seed_from_u64(seed);
        let seeds: Vec<u64> = (0..path_count).map(|_| master.gen()).collect();

        let paths = seeds
            .into_par_iter()
            .map(|path_seed| {
                let mut rng = StdRng::seed_from_u64(path_seed);
                self.generate_path(path_length, &mut rng)
            })
            .collect();

        Ok(self.finish(paths, path_length))
    }

    fn generate_path<R: Rng + ?Sized>(&self, path_length: usize, rng: &mut R) -> SimulatedPath {
        let GbmParams { drift, sigma } = self.params;

        let mut values = Vec::with_capacity(path_length);
        values.push(PATH_SEED_VALUE);

        let mut log_level = PATH_SEED_VALUE.ln();
        for _ in 1..path_length {
            let z: f64 = self.normal.sample(rng);
            log_level += drift + sigma * z;
            values.push(log_level.exp());
        }

        SimulatedPath::new(values)
    }

    fn finish(&self, paths: Vec<SimulatedPath>, path_length: usize) -> PathEnsemble {
        let ensemble = PathEnsemble::new(paths, path_length);

        let non_finite = ensemble.non_finite_paths();
        if !non_finite.is_empty() {
            tracing::warn!(
                "{} of {} simulated paths carry non-finite values (drift={}, sigma={})",
                non_finite.len(),
                ensemble.path_count(),
                self.params.drift,
                self.params.sigma
            );
        }

        tracing::debug!(
            "Simulated {} paths x {} steps",
            ensemble.path_count(),
            path_length
        );
        ensemble
    }
}

fn check_length(path_length: usize) -> Result<(), SimulationError> {
    if path_length == 0 {
        return Err(SimulationError::InvalidPathLength(path_length));
    }
    Ok(())
}
