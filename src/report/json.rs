//! JSON report output
//!
//! Full-fidelity serialization of the result records: terminal spectra,
//! per-element diagnostic traces, warnings, errors. This is the format
//! the persistence and reporting collaborators consume.

use crate::engine::PathResult;
use std::io::{self, Write};

/// Write all results as pretty-printed JSON.
pub fn write<W: Write>(out: &mut W, results: &[PathResult]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, results)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    writeln!(out)
}
