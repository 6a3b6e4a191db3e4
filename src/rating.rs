//! Noise-Criteria ratings and pass/fail verdicts
//!
//! An NC rating collapses an octave-band spectrum into a single number a
//! mechanical engineer can compare against a design target ("private office:
//! NC-35"). The rating is the lowest standard NC curve that the spectrum does
//! not exceed in any band.
//!
//! ```text
//! Curve  |  63Hz 125Hz 250Hz 500Hz  1kHz  2kHz  4kHz  8kHz
//! -------|------------------------------------------------
//! NC-15  |   47   36    29    22    17    14    12    11
//! NC-30  |   57   48    41    35    31    29    28    27
//! NC-45  |   67   60    54    49    46    44    43    42
//! NC-65  |   80   75    71    68    66    64    63    62
//! ```
//!
//! The curves are permissive at low frequencies (rumble is tolerated) and
//! strict at speech frequencies. A spectrum that slips under NC-30 at every
//! band but touches 32dB at 1kHz rates NC-35: one band is enough to push the
//! rating up.

use crate::spectrum::{Spectrum, NUM_BANDS};
use serde::Serialize;
use std::fmt;

/// Standard NC curve levels (dB) per octave band 63Hz..8000Hz, NC-15
/// through NC-65 in steps of 5. Beranek's tabulated family.
const NC_CURVES: [(u8, [f64; NUM_BANDS]); 11] = [
    (15, [47.0, 36.0, 29.0, 22.0, 17.0, 14.0, 12.0, 11.0]),
    (20, [51.0, 40.0, 33.0, 26.0, 22.0, 19.0, 17.0, 16.0]),
    (25, [54.0, 44.0, 37.0, 31.0, 27.0, 24.0, 22.0, 21.0]),
    (30, [57.0, 48.0, 41.0, 35.0, 31.0, 29.0, 28.0, 27.0]),
    (35, [60.0, 52.0, 45.0, 40.0, 36.0, 34.0, 33.0, 32.0]),
    (40, [64.0, 56.0, 50.0, 45.0, 41.0, 39.0, 38.0, 37.0]),
    (45, [67.0, 60.0, 54.0, 49.0, 46.0, 44.0, 43.0, 42.0]),
    (50, [71.0, 64.0, 58.0, 54.0, 51.0, 49.0, 48.0, 47.0]),
    (55, [74.0, 67.0, 62.0, 58.0, 56.0, 54.0, 53.0, 52.0]),
    (60, [77.0, 71.0, 67.0, 63.0, 61.0, 59.0, 58.0, 57.0]),
    (65, [80.0, 75.0, 71.0, 68.0, 66.0, 64.0, 63.0, 62.0]),
];

/// NC rating of a terminal spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NcRating {
    /// Lowest standard curve not exceeded in any band.
    Nc(u8),
    /// Spectrum lies below even NC-15 - quieter than the scale resolves.
    BelowScale,
    /// Spectrum exceeds NC-65 in at least one band; the family is not
    /// extrapolated past its highest defined curve.
    Unavailable,
}

impl NcRating {
    /// Numeric curve value, if the spectrum landed on the scale.
    pub fn value(&self) -> Option<u8> {
        match self {
            NcRating::Nc(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for NcRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NcRating::Nc(n) => write!(f, "NC-{}", n),
            NcRating::BelowScale => write!(f, "none"),
            NcRating::Unavailable => write!(f, "n/a"),
        }
    }
}

/// Whether `spectrum` lies at or below `curve` in every band.
fn fits_under(spectrum: &Spectrum, curve: &[f64; NUM_BANDS]) -> bool {
    spectrum
        .levels
        .iter()
        .zip(curve.iter())
        .all(|(&level, &limit)| level <= limit)
}

/// Rate a spectrum against the standard NC curve family.
///
/// Returns the lowest curve the spectrum does not exceed in any band.
/// A spectrum under NC-15 everywhere reports [`NcRating::BelowScale`]; one
/// that pokes above NC-65 reports [`NcRating::Unavailable`] rather than
/// extrapolating beyond the defined family.
pub fn nc_rating(spectrum: &Spectrum) -> NcRating {
    // Curves are ordered lowest-first, so the first fit is the rating.
    for (value, curve) in NC_CURVES.iter() {
        if fits_under(spectrum, curve) {
            return if *value == 15 && fits_strictly_below(spectrum, curve) {
                NcRating::BelowScale
            } else {
                NcRating::Nc(*value)
            };
        }
    }
    NcRating::Unavailable
}

/// Strictly below the curve in every band. A spectrum that touches the
/// NC-15 curve rates NC-15; one strictly under it is quieter than the
/// scale resolves.
fn fits_strictly_below(spectrum: &Spectrum, curve: &[f64; NUM_BANDS]) -> bool {
    spectrum
        .levels
        .iter()
        .zip(curve.iter())
        .all(|(&level, &limit)| level < limit)
}

/// Classification of a calculated path against a design NC target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Rated at or under the design target.
    Pass,
    /// Rated within 5 NC points over the target - review lining/silencing.
    Marginal,
    /// Rated more than 5 points over target, or off the top of the scale.
    Exceed,
    /// Path could not be calculated (structural error).
    Error,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Marginal => write!(f, "MARGINAL"),
            Verdict::Exceed => write!(f, "EXCEED"),
            Verdict::Error => write!(f, "ERROR"),
        }
    }
}

/// Classify an NC rating against a design target.
pub fn classify(rating: NcRating, target: u8) -> Verdict {
    match rating {
        NcRating::BelowScale => Verdict::Pass,
        NcRating::Nc(n) if n <= target => Verdict::Pass,
        NcRating::Nc(n) if n <= target.saturating_add(5) => Verdict::Marginal,
        NcRating::Nc(_) => Verdict::Exceed,
        NcRating::Unavailable => Verdict::Exceed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // NC RATING TESTS
    // ==========================================================================
    //
    // The rating is the lowest curve not exceeded in ANY band. A single hot
    // band controls the rating even if every other band is far below the
    // curve - which is exactly how tonal duct noise gets flagged.
    // ==========================================================================

    #[test]
    fn test_spectrum_on_curve_rates_that_curve() {
        // Exactly the NC-35 curve: <= in every band, so NC-35
        let spectrum = Spectrum::from_levels([60.0, 52.0, 45.0, 40.0, 36.0, 34.0, 33.0, 32.0]);
        assert_eq!(nc_rating(&spectrum), NcRating::Nc(35));
    }

    #[test]
    fn test_single_hot_band_controls_rating() {
        // NC-30 everywhere except 1kHz at 36dB, which needs NC-40
        let spectrum = Spectrum::from_levels([57.0, 48.0, 41.0, 35.0, 36.0, 29.0, 28.0, 27.0]);
        assert_eq!(nc_rating(&spectrum), NcRating::Nc(40));
    }

    #[test]
    fn test_quiet_spectrum_is_below_scale() {
        let spectrum = Spectrum::flat(5.0);
        assert_eq!(nc_rating(&spectrum), NcRating::BelowScale);
    }

    #[test]
    fn test_loud_spectrum_is_unavailable() {
        // 85dB at 1kHz is above every defined curve
        let spectrum = Spectrum::flat(85.0);
        assert_eq!(nc_rating(&spectrum), NcRating::Unavailable);
        assert_eq!(nc_rating(&spectrum).value(), None);
    }

    #[test]
    fn test_rating_display() {
        assert_eq!(NcRating::Nc(30).to_string(), "NC-30");
        assert_eq!(NcRating::BelowScale.to_string(), "none");
        assert_eq!(NcRating::Unavailable.to_string(), "n/a");
    }

    #[test]
    fn test_curves_are_monotone() {
        // Each curve lies at or above the one below it, in every band;
        // within a curve, levels decrease with frequency
        for pair in NC_CURVES.windows(2) {
            let (lo_val, lo) = pair[0];
            let (hi_val, hi) = pair[1];
            for band in 0..NUM_BANDS {
                assert!(
                    hi[band] >= lo[band],
                    "NC-{} band {} below NC-{}",
                    hi_val,
                    band,
                    lo_val
                );
            }
        }
        for (value, curve) in NC_CURVES.iter() {
            for pair in curve.windows(2) {
                assert!(
                    pair[1] <= pair[0],
                    "NC-{} curve rises with frequency",
                    value
                );
            }
        }
    }

    // ==========================================================================
    // VERDICT TESTS
    // ==========================================================================

    #[test]
    fn test_classify_against_target() {
        assert_eq!(classify(NcRating::Nc(30), 35), Verdict::Pass);
        assert_eq!(classify(NcRating::Nc(35), 35), Verdict::Pass);
        assert_eq!(classify(NcRating::Nc(40), 35), Verdict::Marginal);
        assert_eq!(classify(NcRating::Nc(50), 35), Verdict::Exceed);
        assert_eq!(classify(NcRating::BelowScale, 35), Verdict::Pass);
        assert_eq!(classify(NcRating::Unavailable, 35), Verdict::Exceed);
    }
}
