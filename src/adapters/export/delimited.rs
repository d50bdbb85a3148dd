//! Delimited Text Exporter
//!
//! One row per simulated step: the step index followed by each selected
//! path's cumulative return from the normalized start, `path[i] - 1.0`,
//! to five decimals.
//!
//! ```text
//! 0,0.00000,0.00000
//! 1,0.01234,-0.00410
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::SimulatedPath;
use crate::ports::{ExportError, PathExporter};

/// Writes selected paths as a delimited table
#[derive(Debug, Clone)]
pub struct DelimitedExporter {
    path: PathBuf,
    delimiter: char,
    header: Option<Vec<String>>,
}

impl DelimitedExporter {
    /// Comma-delimited file exporter, no header row
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: ',',
            header: None,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Emit a header row: `step` followed by one label per path
    pub fn with_header(mut self, labels: Vec<String>) -> Self {
        self.header = Some(labels);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the table to any writer
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
        paths: &[SimulatedPath],
        path_length: usize,
    ) -> Result<(), ExportError> {
        check_lengths(paths, path_length)?;

        let d = self.delimiter;

        if let Some(labels) = &self.header {
            write!(writer, "step")?;
            for label in labels {
                write!(writer, "{}{}", d, label)?;
            }
            writeln!(writer)?;
        }

        for i in 0..path_length {
            write!(writer, "{}", i)?;
            for path in paths {
                write!(writer, "{}{:.5}", d, path.values()[i] - 1.0)?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl PathExporter for DelimitedExporter {
    fn export(&self, paths: &[SimulatedPath], path_length: usize) -> Result<(), ExportError> {
        // Reject before File::create truncates an existing output
        check_lengths(paths, path_length)?;

        let mut writer = BufWriter::new(File::create(&self.path)?);
        self.write_to(&mut writer, paths, path_length)?;

        tracing::info!(
            "Wrote {} paths x {} steps to {}",
            paths.len(),
            path_length,
            self.path.display()
        );
        Ok(())
    }
}

fn check_lengths(paths: &[SimulatedPath], path_length: usize) -> Result<(), ExportError> {
    match paths.iter().find(|p| p.len() != path_length) {
        Some(bad) => Err(ExportError::LengthMismatch {
            expected: path_length,
            actual: bad.len(),
        }),
        None => Ok(()),
    }
}

/// Header label for a percentile cut point, e.g. 0.45 -> "p45"
pub fn percentile_label(p: f64) -> String {
    let scaled = p * 100.0;
    if (scaled - scaled.round()).abs() < 1e-9 {
        format!("p{}", scaled.round() as i64)
    } else {
        format!("p{}", scaled)
    }
}
