//! Simulated Price Paths
//!
//! A `SimulatedPath` is a multiplicative growth series normalized to start at
//! 1.0, so it can be applied to any starting price. A `PathEnsemble` is the
//! full set produced by one simulation run.

use serde::{Deserialize, Serialize};

/// Normalized starting value of every simulated path
pub const PATH_SEED_VALUE: f64 = 1.0;

/// One simulated growth path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedPath {
    values: Vec<f64>,
}

impl SimulatedPath {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value on the final simulated day
    pub fn terminal_value(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Cumulative return from the normalized start at step `i`
    pub fn cumulative_return(&self, i: usize) -> Option<f64> {
        self.values.get(i).map(|v| v - PATH_SEED_VALUE)
    }

    /// True if any step went NaN or infinite
    pub fn has_non_finite(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Scale the growth factors onto an absolute starting price
    pub fn scaled(&self, start_price: f64) -> Vec<f64> {
        self.values.iter().map(|v| v * start_price).collect()
    }
}

/// All paths produced by one simulation run, in generation order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathEnsemble {
    paths: Vec<SimulatedPath>,
    path_length: usize,
}

impl PathEnsemble {
    pub fn new(paths: Vec<SimulatedPath>, path_length: usize) -> Self {
        Self { paths, path_length }
    }

    pub fn paths(&self) -> &[SimulatedPath] {
        &self.paths
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn path_length(&self) -> usize {
        self.path_length
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SimulatedPath> {
        self.paths.get(index)
    }

    /// Terminal value of every path, in generation order
    pub fn terminal_values(&self) -> Vec<f64> {
        self.paths
            .iter()
            .map(|p| p.terminal_value().unwrap_or(f64::NAN))
            .collect()
    }

    /// Indices of paths that carry a non-finite value
    pub fn non_finite_paths(&self) -> Vec<usize> {
        self.paths
            .iter()
            .enumerate()
            .filter(|(_, p)| p.has_non_finite())
            .map(|(i, _)| i)
            .collect()
    }

    /// Fraction of paths whose terminal value is strictly above `threshold`
    pub fn fraction_above(&self, threshold: f64) -> f64 {
        if self.paths.is_empty() {
            return 0.0;
        }
        let above = self
            .paths
            .iter()
            .filter(|p| p.terminal_value().is_some_and(|v| v > threshold))
            .count();
        above as f64 / self.paths.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensemble(terminals: &[f64]) -> PathEnsemble {
        let paths = terminals
            .iter()
            .map(|&t| SimulatedPath::new(vec![PATH_SEED_VALUE, t]))
            .collect();
        PathEnsemble::new(paths, 2)
    }

    #[test]
    fn test_path_accessors() {
        let path = SimulatedPath::new(vec![1.0, 1.1, 1.21]);
        assert_eq!(path.len(), 3);
        assert_eq!(path.terminal_value(), Some(1.21));
        assert!((path.cumulative_return(1).unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(path.cumulative_return(3), None);
        let scaled = path.scaled(100.0);
        assert_eq!(scaled.len(), 3);
        assert!((scaled[2] - 121.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_path() {
        let path = SimulatedPath::new(Vec::new());
        assert!(path.is_empty());
        assert_eq!(path.terminal_value(), None);
    }

    #[test]
    fn test_non_finite_detection() {
        let e = PathEnsemble::new(
            vec![
                SimulatedPath::new(vec![1.0, 2.0]),
                SimulatedPath::new(vec![1.0, f64::INFINITY]),
                SimulatedPath::new(vec![1.0, f64::NAN]),
            ],
            2,
        );
        assert_eq!(e.non_finite_paths(), vec![1, 2]);
    }

    #[test]
    fn test_terminal_values_in_generation_order() {
        let e = ensemble(&[3.0, 1.0, 4.0]);
        assert_eq!(e.terminal_values(), vec![3.0, 1.0, 4.0]);
        assert_eq!(e.path_count(), 3);
        assert_eq!(e.path_length(), 2);
    }

    #[test]
    fn test_fraction_above() {
        let e = ensemble(&[0.9, 1.0, 1.1, 1.2]);
        assert_eq!(e.fraction_above(1.0), 0.5);
        assert_eq!(PathEnsemble::default().fraction_above(1.0), 0.0);
    }
}
