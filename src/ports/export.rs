//! Path Export Port
//!
//! Sink for the selected percentile paths.

use thiserror::Error;

use crate::domain::SimulatedPath;

/// Export error type
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write paths: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Writes selected paths somewhere downstream tools can read them
#[cfg_attr(test, mockall::automock)]
pub trait PathExporter {
    /// Emit `paths`, each of which must hold exactly `path_length` values
    fn export(&self, paths: &[SimulatedPath], path_length: usize) -> Result<(), ExportError>;
}
