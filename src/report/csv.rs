//! CSV report output
//!
//! One row per path: verdict, NC, dB(A), the 8 terminal band levels, and
//! any warnings. Columns are stable - downstream spreadsheets key on
//! them by header name.

use crate::engine::PathResult;
use crate::spectrum::BAND_CENTERS_HZ;
use std::io::{self, Write};

/// Quote a field if it contains a comma, quote, or newline.
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write all results as CSV.
pub fn write<W: Write>(out: &mut W, results: &[PathResult]) -> io::Result<()> {
    let band_headers: Vec<String> = BAND_CENTERS_HZ
        .iter()
        .map(|hz| format!("{}hz_db", hz))
        .collect();
    writeln!(
        out,
        "path_id,verdict,nc,dba,{},warnings,error",
        band_headers.join(",")
    )?;

    for r in results {
        let bands: Vec<String> = r
            .terminal_spectrum
            .levels
            .iter()
            .map(|l| format!("{:.1}", l))
            .collect();
        writeln!(
            out,
            "{},{},{},{:.1},{},{},{}",
            escape(&r.path_id),
            r.verdict,
            r.nc,
            r.a_weighted_db,
            bands.join(","),
            escape(&r.warnings.join("; ")),
            escape(r.error.as_deref().unwrap_or("")),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::Verdict;

    #[test]
    fn test_header_names_all_bands() {
        let mut buffer = Vec::new();
        write(&mut buffer, &[]).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("path_id,verdict,nc,dba,63hz_db,125hz_db"));
        assert!(text.contains("8000hz_db"));
    }

    #[test]
    fn test_row_per_result() {
        let results = vec![
            crate::report::tests::test_result(Verdict::Pass),
            crate::report::tests::test_result(Verdict::Exceed),
        ];
        let mut buffer = Vec::new();
        write(&mut buffer, &results).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(text.lines().count(), 3); // header + 2 rows
        assert!(text.contains("PASS"));
        assert!(text.contains("EXCEED"));
        assert!(text.contains("NC-35"));
    }

    #[test]
    fn test_commas_in_path_id_are_quoted() {
        let mut result = crate::report::tests::test_result(Verdict::Pass);
        result.path_id = "AHU-1, floor 2".to_string();

        let mut buffer = Vec::new();
        write(&mut buffer, &[result]).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("\"AHU-1, floor 2\""));
    }
}
