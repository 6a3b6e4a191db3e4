//! Report generation for path calculation results
//!
//! Output formatters for batch results:
//!
//! - **JSON**: machine-readable, full fidelity (spectra, traces,
//!   warnings) for downstream tooling
//! - **CSV**: spreadsheet-compatible summary rows for submittal review
//!
//! # Usage
//!
//! ```ignore
//! use ductband::report;
//!
//! // Picks format by extension
//! report::generate("results.json", &results)?;
//! report::generate("results.csv", &results)?;   // anything else: CSV
//! ```

pub mod csv;
pub mod json;

use crate::engine::PathResult;
use crate::rating::Verdict;
use std::io;
use std::path::Path;

/// Generate a report in the appropriate format based on file extension.
pub fn generate<P: AsRef<Path>>(path: P, results: &[PathResult]) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "json" => json::write(&mut file, results),
        _ => csv::write(&mut file, results),
    }
}

/// Summary statistics for a batch of results.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub total: usize,
    pub pass: usize,
    pub marginal: usize,
    pub exceed: usize,
    pub error: usize,
}

impl Summary {
    pub fn from_results(results: &[PathResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };

        for r in results {
            match r.verdict {
                Verdict::Pass => summary.pass += 1,
                Verdict::Marginal => summary.marginal += 1,
                Verdict::Exceed => summary.exceed += 1,
                Verdict::Error => summary.error += 1,
            }
        }

        summary
    }
}
