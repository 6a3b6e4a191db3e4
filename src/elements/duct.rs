//! Duct run attenuation
//!
//! Straight duct attenuates sound as it propagates, and how much depends
//! on construction:
//!
//! - **Unlined sheet metal** loses a little energy to wall flexure, mostly
//!   at low frequencies (the walls "breathe" with the rumble). Fractions
//!   of a dB per foot.
//! - **Acoustic lining** absorbs mid/high frequencies aggressively -
//!   several dB per foot at 1-2kHz for small lined ducts - but does little
//!   at 63Hz, where the wavelength dwarfs the lining depth.
//! - **Circular duct** is far stiffer than rectangular, so unlined round
//!   duct barely attenuates at all. This is why a long unlined round run
//!   delivers fan rumble so faithfully.
//!
//! Values are per-foot coefficients from standardized reference tables,
//! multiplied by run length. A size between table rows interpolates
//! between its bracketing rows; a size off either end uses the nearest
//! reference row - never silent zero.

use super::DuctShape;
use crate::spectrum::{Spectrum, NUM_BANDS};

/// Total attenuation claimed by a single run is capped per band. Beyond
/// this, structure-borne flanking dominates and the tables stop being
/// physical.
const MAX_RUN_DB: f64 = 40.0;

/// Lining thicker than 1in deepens the low-frequency loss; bands 63-500Hz
/// scale by this factor for 2in-and-up lining.
const THICK_LINING_LOW_BAND_FACTOR: f64 = 1.5;

struct RectRow {
    area_ft2: f64,
    per_ft: [f64; NUM_BANDS],
}

struct CircRow {
    diameter_in: f64,
    per_ft: [f64; NUM_BANDS],
}

// Unlined rectangular sheet metal, dB/ft. Low-frequency wall flexure
// dominates; everything above 250Hz is nearly size-independent.
const UNLINED_RECT: [RectRow; 6] = [
    RectRow { area_ft2: 0.25, per_ft: [0.30, 0.20, 0.10, 0.10, 0.10, 0.10, 0.10, 0.10] }, // 6x6
    RectRow { area_ft2: 1.0,  per_ft: [0.35, 0.20, 0.10, 0.06, 0.06, 0.06, 0.06, 0.06] }, // 12x12
    RectRow { area_ft2: 2.0,  per_ft: [0.40, 0.25, 0.10, 0.05, 0.05, 0.05, 0.05, 0.05] }, // 12x24
    RectRow { area_ft2: 4.0,  per_ft: [0.25, 0.20, 0.10, 0.03, 0.03, 0.03, 0.03, 0.03] }, // 24x24
    RectRow { area_ft2: 16.0, per_ft: [0.15, 0.10, 0.07, 0.02, 0.02, 0.02, 0.02, 0.02] }, // 48x48
    RectRow { area_ft2: 36.0, per_ft: [0.10, 0.10, 0.05, 0.02, 0.02, 0.02, 0.02, 0.02] }, // 72x72
];

// 1in-lined rectangular, insertion loss dB/ft. Peaks at 1-2kHz and
// shrinks as the duct grows (less lining per unit of cross-section).
const LINED_RECT_1IN: [RectRow; 5] = [
    RectRow { area_ft2: 0.25, per_ft: [0.6, 0.6, 1.5, 2.7, 5.8, 7.4, 4.3, 2.9] }, // 6x6
    RectRow { area_ft2: 1.0,  per_ft: [0.4, 0.4, 0.8, 1.9, 4.0, 4.1, 2.8, 1.9] }, // 12x12
    RectRow { area_ft2: 2.0,  per_ft: [0.3, 0.3, 0.6, 1.5, 3.2, 3.3, 2.2, 1.5] }, // 12x24
    RectRow { area_ft2: 4.0,  per_ft: [0.2, 0.2, 0.5, 1.2, 2.3, 2.2, 1.5, 1.0] }, // 24x24
    RectRow { area_ft2: 16.0, per_ft: [0.1, 0.1, 0.3, 0.8, 1.5, 1.5, 1.0, 0.7] }, // 48x48
];

// Unlined circular spiral duct, dB/ft. Round duct is stiff: almost no
// wall flexure, almost no attenuation.
const UNLINED_CIRC: [CircRow; 4] = [
    CircRow { diameter_in: 6.0,  per_ft: [0.03, 0.03, 0.05, 0.05, 0.10, 0.10, 0.10, 0.10] },
    CircRow { diameter_in: 12.0, per_ft: [0.03, 0.03, 0.03, 0.05, 0.07, 0.07, 0.07, 0.07] },
    CircRow { diameter_in: 24.0, per_ft: [0.02, 0.02, 0.02, 0.03, 0.05, 0.05, 0.05, 0.05] },
    CircRow { diameter_in: 48.0, per_ft: [0.01, 0.01, 0.01, 0.02, 0.02, 0.02, 0.02, 0.02] },
];

// 1in-lined circular, insertion loss dB/ft.
const LINED_CIRC_1IN: [CircRow; 6] = [
    CircRow { diameter_in: 6.0,  per_ft: [0.38, 0.59, 0.93, 1.53, 2.17, 2.31, 2.04, 1.26] },
    CircRow { diameter_in: 12.0, per_ft: [0.23, 0.46, 0.81, 1.45, 2.18, 1.91, 1.48, 0.97] },
    CircRow { diameter_in: 24.0, per_ft: [0.09, 0.32, 0.60, 1.14, 1.69, 1.00, 0.80, 0.50] },
    CircRow { diameter_in: 36.0, per_ft: [0.05, 0.21, 0.41, 0.88, 1.25, 0.71, 0.56, 0.35] },
    CircRow { diameter_in: 48.0, per_ft: [0.03, 0.15, 0.28, 0.60, 0.95, 0.50, 0.40, 0.25] },
    CircRow { diameter_in: 60.0, per_ft: [0.02, 0.11, 0.20, 0.45, 0.70, 0.35, 0.28, 0.18] },
];

// Dissipative duct silencer, insertion loss dB/ft. A packaged silencer
// is lined duct turned up to eleven: splitter baffles peak the loss in
// the speech bands. Derived from a nominal 3ft rectangular unit.
const SILENCER_PER_FT: [f64; NUM_BANDS] = [0.7, 1.7, 3.3, 5.7, 7.7, 7.0, 5.0, 3.3];

/// Insertion loss of a packaged duct silencer of the given length.
/// Per-band totals cap at [`MAX_RUN_DB`] like any other run.
pub fn silencer_insertion_loss(length_ft: f64) -> Spectrum {
    let mut levels = [0.0; NUM_BANDS];
    for band in 0..NUM_BANDS {
        levels[band] = (SILENCER_PER_FT[band] * length_ft.max(0.0)).min(MAX_RUN_DB);
    }
    Spectrum::from_levels(levels)
}

/// Interpolate a per-foot coefficient row for `key` from a table of
/// `(key, row)` pairs sorted ascending. Off-table keys clamp to the
/// nearest end row.
fn interpolate_rows(
    keys_and_rows: &[(f64, &[f64; NUM_BANDS])],
    key: f64,
) -> [f64; NUM_BANDS] {
    let (first, last) = match (keys_and_rows.first(), keys_and_rows.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return [0.0; NUM_BANDS],
    };

    if key <= first.0 {
        return *first.1;
    }
    if key >= last.0 {
        return *last.1;
    }

    for pair in keys_and_rows.windows(2) {
        let (lo_key, lo_row) = pair[0];
        let (hi_key, hi_row) = pair[1];
        if key >= lo_key && key <= hi_key {
            let ratio = (key - lo_key) / (hi_key - lo_key);
            let mut out = [0.0; NUM_BANDS];
            for band in 0..NUM_BANDS {
                out[band] = lo_row[band] + ratio * (hi_row[band] - lo_row[band]);
            }
            return out;
        }
    }

    *last.1
}

fn rect_per_ft(table: &[RectRow], area_ft2: f64) -> [f64; NUM_BANDS] {
    let pairs: Vec<(f64, &[f64; NUM_BANDS])> =
        table.iter().map(|r| (r.area_ft2, &r.per_ft)).collect();
    interpolate_rows(&pairs, area_ft2)
}

fn circ_per_ft(table: &[CircRow], diameter_in: f64) -> [f64; NUM_BANDS] {
    let pairs: Vec<(f64, &[f64; NUM_BANDS])> =
        table.iter().map(|r| (r.diameter_in, &r.per_ft)).collect();
    interpolate_rows(&pairs, diameter_in)
}

/// Attenuation spectrum of a straight duct run.
///
/// `lining_in` of 0 selects the unlined tables; anything positive selects
/// the 1in lined tables, with 2in-and-up lining scaling the low bands by
/// [`THICK_LINING_LOW_BAND_FACTOR`]. Per-band totals cap at
/// [`MAX_RUN_DB`].
pub fn attenuation(shape: DuctShape, lining_in: f64, length_ft: f64) -> Spectrum {
    let lined = lining_in > 0.0;

    let mut per_ft = match shape {
        DuctShape::Rectangular { .. } => {
            let area = shape.area_ft2();
            if lined {
                rect_per_ft(&LINED_RECT_1IN, area)
            } else {
                rect_per_ft(&UNLINED_RECT, area)
            }
        }
        DuctShape::Circular { diameter_in } => {
            if lined {
                circ_per_ft(&LINED_CIRC_1IN, diameter_in)
            } else {
                circ_per_ft(&UNLINED_CIRC, diameter_in)
            }
        }
    };

    if lining_in >= 2.0 {
        for band in per_ft.iter_mut().take(4) {
            *band *= THICK_LINING_LOW_BAND_FACTOR;
        }
    }

    let mut levels = [0.0; NUM_BANDS];
    for band in 0..NUM_BANDS {
        levels[band] = (per_ft[band] * length_ft).min(MAX_RUN_DB);
    }
    Spectrum::from_levels(levels)
}
