//! Flexible duct insertion loss
//!
//! Nonmetallic flexible duct is the best passive attenuator on most
//! terminal runs: the limp, helix-supported wall soaks up several dB per
//! foot through the speech bands. The reference data covers round flex
//! from 4in to 16in diameter; outside that range the product (and the
//! data) does not exist, so an out-of-range diameter is an error for the
//! caller to record - not a silent clamp that would credit attenuation no
//! product provides.

use crate::spectrum::{Spectrum, NUM_BANDS};
use std::fmt;

/// Smallest diameter the insertion-loss data covers, inches.
pub const MIN_DIAMETER_IN: f64 = 4.0;
/// Largest diameter the insertion-loss data covers, inches.
pub const MAX_DIAMETER_IN: f64 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub enum FlexDuctError {
    /// Diameter outside the 4-16in range the reference data covers.
    DiameterOutOfRange { diameter_in: f64 },
}

impl fmt::Display for FlexDuctError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlexDuctError::DiameterOutOfRange { diameter_in } => write!(
                f,
                "flex duct diameter {:.1}in outside {:.0}-{:.0}in data range",
                diameter_in, MIN_DIAMETER_IN, MAX_DIAMETER_IN
            ),
        }
    }
}

impl std::error::Error for FlexDuctError {}

struct FlexRow {
    diameter_in: f64,
    per_ft: [f64; NUM_BANDS],
}

// Insertion loss per foot of nonmetallic flexible duct. Mid-diameter
// sizes peak near 1kHz; losses fall off toward both band edges and with
// increasing diameter above ~10in.
const FLEX_TABLE: [FlexRow; 7] = [
    FlexRow { diameter_in: 4.0,  per_ft: [0.50, 0.92, 1.33, 1.83, 2.25, 1.83, 1.33, 0.83] },
    FlexRow { diameter_in: 6.0,  per_ft: [0.58, 1.00, 1.50, 2.08, 2.33, 1.75, 1.25, 0.83] },
    FlexRow { diameter_in: 8.0,  per_ft: [0.67, 1.08, 1.67, 2.25, 2.42, 1.67, 1.17, 0.75] },
    FlexRow { diameter_in: 10.0, per_ft: [0.75, 1.17, 1.75, 2.17, 2.17, 1.50, 1.00, 0.67] },
    FlexRow { diameter_in: 12.0, per_ft: [0.75, 1.17, 1.75, 2.08, 2.00, 1.33, 0.92, 0.58] },
    FlexRow { diameter_in: 14.0, per_ft: [0.75, 1.08, 1.67, 1.92, 1.83, 1.17, 0.83, 0.50] },
    FlexRow { diameter_in: 16.0, per_ft: [0.67, 1.00, 1.50, 1.75, 1.58, 1.00, 0.75, 0.42] },
];

/// Insertion loss of a flexible duct run.
///
/// Per-foot table values for the diameter (interpolated between rows),
/// multiplied by run length. Diameters outside the data range error.
pub fn insertion_loss(diameter_in: f64, length_ft: f64) -> Result<Spectrum, FlexDuctError> {
    if !(MIN_DIAMETER_IN..=MAX_DIAMETER_IN).contains(&diameter_in) {
        return Err(FlexDuctError::DiameterOutOfRange { diameter_in });
    }

    let mut per_ft = FLEX_TABLE[0].per_ft;
    for pair in FLEX_TABLE.windows(2) {
        let lo = &pair[0];
        let hi = &pair[1];
        if diameter_in >= lo.diameter_in && diameter_in <= hi.diameter_in {
            let ratio = (diameter_in - lo.diameter_in) / (hi.diameter_in - lo.diameter_in);
            for band in 0..NUM_BANDS {
                per_ft[band] = lo.per_ft[band] + ratio * (hi.per_ft[band] - lo.per_ft[band]);
            }
            break;
        }
    }

    let mut levels = [0.0; NUM_BANDS];
    for band in 0..NUM_BANDS {
        levels[band] = per_ft[band] * length_ft.max(0.0);
    }
    Ok(Spectrum::from_levels(levels))
}
