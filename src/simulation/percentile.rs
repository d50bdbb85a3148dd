//! Percentile Path Selection
//!
//! Ranks an ensemble by terminal value and picks the path sitting at each
//! requested percentile. Ranking is a stable ascending sort under
//! `f64::total_cmp`, so ties keep generation order and NaN terminals rank
//! above +Inf. The same ensemble and percentile list always produce the same
//! selection.

use thiserror::Error;

use crate::domain::{PathEnsemble, SimulatedPath};
use super::params::is_valid_percentile;

/// Selection errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("Cannot select from an empty ensemble")]
    EmptyEnsemble,
    #[error("Invalid percentile: {0} (must be 0 <= p < 1)")]
    InvalidPercentile(f64),
}

/// Order-statistic selector over simulated paths
#[derive(Debug, Clone, Default)]
pub struct PercentileSelector;

impl PercentileSelector {
    pub fn new() -> Self {
        Self
    }

    /// Path indices sorted ascending by terminal value (stable)
    pub fn rank(&self, ensemble: &PathEnsemble) -> Vec<usize> {
        let terminals = ensemble.terminal_values();
        let mut order: Vec<usize> = (0..terminals.len()).collect();
        order.sort_by(|&a, &b| terminals[a].total_cmp(&terminals[b]));
        order
    }

    /// Rank position for percentile `p`: floor(p * count), clamped to
    /// [0, count - 1]
    pub fn rank_index(p: f64, count: usize) -> usize {
        let raw = (p * count as f64).floor();
        if raw <= 0.0 {
            0
        } else {
            (raw as usize).min(count.saturating_sub(1))
        }
    }

    /// One path per requested percentile, in request order. Duplicate
    /// percentiles return duplicate paths.
    pub fn select(
        &self,
        ensemble: &PathEnsemble,
        percentiles: &[f64],
    ) -> Result<Vec<SimulatedPath>, SelectionError> {
        if ensemble.is_empty() {
            return Err(SelectionError::EmptyEnsemble);
        }
        if let Some(&p) = percentiles.iter().find(|p| !is_valid_percentile(**p)) {
            return Err(SelectionError::InvalidPercentile(p));
        }

        let order = self.rank(ensemble);
        let count = order.len();

        Ok(percentiles
            .iter()
            .map(|&p| {
                let idx = order[Self::rank_index(p, count)];
                ensemble.paths()[idx].clone()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two-step paths tagged by their middle value so ties can be told apart
    fn ensemble(terminals: &[f64]) -> PathEnsemble {
        let paths = terminals
            .iter()
            .enumerate()
            .map(|(i, &t)| SimulatedPath::new(vec![1.0, i as f64, t]))
            .collect();
        PathEnsemble::new(paths, 3)
    }

    #[test]
    fn test_rank_is_stable_ascending() {
        let e = ensemble(&[3.0, 1.0, 4.0, 1.0, 5.0]);
        let selector = PercentileSelector::new();

        let order = selector.rank(&e);
        assert_eq!(order, vec![1, 3, 0, 2, 4]);

        let terminals: Vec<f64> = order
            .iter()
            .map(|&i| e.paths()[i].terminal_value().unwrap())
            .collect();
        assert_eq!(terminals, vec![1.0, 1.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_rank_index_formula() {
        assert_eq!(PercentileSelector::rank_index(0.4, 10_000), 4000);
        assert_eq!(PercentileSelector::rank_index(0.999, 10_000), 9990);
        assert_eq!(PercentileSelector::rank_index(0.0, 10_000), 0);
        assert_eq!(PercentileSelector::rank_index(0.45, 10_000), 4500);
        assert_eq!(PercentileSelector::rank_index(0.55, 10_000), 5500);
        assert_eq!(PercentileSelector::rank_index(0.6, 10_000), 6000);
        assert_eq!(PercentileSelector::rank_index(0.5, 5), 2);
        assert_eq!(PercentileSelector::rank_index(0.99, 1), 0);
    }

    #[test]
    fn test_select_in_request_order() {
        let e = ensemble(&[3.0, 1.0, 4.0, 1.0, 5.0]);
        let selected = PercentileSelector::new().select(&e, &[0.8, 0.0, 0.5]).unwrap();

        let picked: Vec<f64> = selected.iter().map(|p| p.terminal_value().unwrap()).collect();
        assert_eq!(picked, vec![5.0, 1.0, 3.0]);
        // Lowest tie resolves to the earlier path (index 1)
        assert_eq!(selected[1].values()[1], 1.0);
    }

    #[test]
    fn test_tie_order_preserved() {
        let e = ensemble(&[3.0, 1.0, 4.0, 1.0, 5.0]);
        let selected = PercentileSelector::new().select(&e, &[0.0, 0.2]).unwrap();
        assert_eq!(selected[0].values()[1], 1.0);
        assert_eq!(selected[1].values()[1], 3.0);
    }

    #[test]
    fn test_duplicate_percentiles() {
        let e = ensemble(&[2.0, 1.0, 3.0]);
        let selected = PercentileSelector::new().select(&e, &[0.5, 0.5]).unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0], selected[1]);
    }

    #[test]
    fn test_select_is_repeatable() {
        let e = ensemble(&[0.9, 1.2, 1.2, 0.7, 1.05, 1.3, 1.2]);
        let selector = PercentileSelector::new();
        let pcts = [0.4, 0.45, 0.5, 0.55, 0.6];

        let a = selector.select(&e, &pcts).unwrap();
        let b = selector.select(&e, &pcts).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_nan_terminals_rank_last() {
        let e = ensemble(&[f64::NAN, 2.0, f64::INFINITY, 1.0]);
        let order = PercentileSelector::new().rank(&e);
        assert_eq!(order, vec![3, 1, 2, 0]);
    }

    #[test]
    fn test_empty_ensemble() {
        let result = PercentileSelector::new().select(&PathEnsemble::default(), &[0.5]);
        assert_eq!(result, Err(SelectionError::EmptyEnsemble));
    }

    #[test]
    fn test_invalid_percentile() {
        let e = ensemble(&[1.0, 2.0]);
        let result = PercentileSelector::new().select(&e, &[0.5, 1.5]);
        assert_eq!(result, Err(SelectionError::InvalidPercentile(1.5)));
    }
}
