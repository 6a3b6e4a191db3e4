//! Octave-band spectra and decibel arithmetic
//!
//! Everything downstream of the graph orderer works on fixed 8-band octave
//! spectra. Duct acoustics uses the standard octave-band center frequencies:
//!
//! ```text
//! Band | Center  | Typical content
//! -----|---------|--------------------------------
//!   1  |    63Hz | Fan rumble, low-frequency throb
//!   2  |   125Hz | Fan blade passage, duct boom
//!   3  |   250Hz | Duct breakout, roar
//!   4  |   500Hz | Airflow roar
//!   5  |  1000Hz | Airflow hiss (speech range)
//!   6  |  2000Hz | Damper/diffuser hiss
//!   7  |  4000Hz | Grille whistle
//!   8  |  8000Hz | High-frequency hiss
//! ```
//!
//! Band order is fixed and never permuted: every `Spectrum` is indexed
//! 63Hz..8000Hz, and every table in the element calculators follows the
//! same order.
//!
//! # Decibel arithmetic
//!
//! Sound levels combine in the power domain, not arithmetically:
//!
//! ```text
//! combined = 10 * log10(10^(a/10) + 10^(b/10))
//! ```
//!
//! Two equal sources combine to +3dB, not +6dB and not 2x. Attenuation is
//! plain subtraction, floored at 0dB - a duct cannot attenuate a band below
//! silence.

use serde::{Deserialize, Serialize};

/// Number of octave bands carried by every spectrum.
pub const NUM_BANDS: usize = 8;

/// Octave-band center frequencies in Hz, in carrier order.
pub const BAND_CENTERS_HZ: [u32; NUM_BANDS] = [63, 125, 250, 500, 1000, 2000, 4000, 8000];

/// A-weighting corrections per octave band (dB), IEC 61672 values at the
/// band centers. Added to each band level before the dB(A) power sum.
pub const A_WEIGHTING_DB: [f64; NUM_BANDS] = [-26.2, -16.1, -8.6, -3.2, 0.0, 1.2, 1.0, -1.1];

/// Floor treated as "no sound". Values at or below this carry zero energy
/// in power-domain combination, so combining with a silent spectrum is an
/// exact identity.
pub const SILENCE_DB: f64 = -96.0;

/// Convert a band level in dB to linear power. Levels at or below the
/// silence floor contribute exactly zero energy.
fn db_to_power(db: f64) -> f64 {
    if db <= SILENCE_DB {
        0.0
    } else {
        10f64.powf(db / 10.0)
    }
}

/// Convert linear power back to dB, flooring at the silence level.
fn power_to_db(power: f64) -> f64 {
    if power <= 0.0 {
        SILENCE_DB
    } else {
        10.0 * power.log10()
    }
}

/// Combine two dB levels in the power domain.
///
/// This is the only correct way to add sound levels. Negative levels
/// participate like any other value - a band at -10dB still carries energy
/// and still raises the combined level slightly. Combining with a silent
/// level returns the other side bit-exact (no log/exp round trip).
pub fn combine_db(a: f64, b: f64) -> f64 {
    let power_a = db_to_power(a);
    let power_b = db_to_power(b);
    if power_b == 0.0 {
        return a.max(SILENCE_DB);
    }
    if power_a == 0.0 {
        return b.max(SILENCE_DB);
    }
    power_to_db(power_a + power_b)
}

/// An 8-band octave spectrum of sound levels in dB.
///
/// Index 0 is the 63Hz band, index 7 the 8000Hz band; see
/// [`BAND_CENTERS_HZ`]. The band order is part of the contract with every
/// caller and is never rearranged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    pub levels: [f64; NUM_BANDS],
}

impl Spectrum {
    /// Spectrum with the same level in every band.
    pub fn flat(db: f64) -> Self {
        Self {
            levels: [db; NUM_BANDS],
        }
    }

    /// Spectrum carrying no energy in any band.
    pub fn silence() -> Self {
        Self::flat(SILENCE_DB)
    }

    pub fn from_levels(levels: [f64; NUM_BANDS]) -> Self {
        Self { levels }
    }

    /// Level of the band at `index` (0 = 63Hz .. 7 = 8000Hz).
    pub fn level(&self, index: usize) -> f64 {
        self.levels[index]
    }

    /// Subtract an attenuation spectrum band-by-band, flooring each band at
    /// 0dB. Attenuation can silence a band but never drive it negative.
    pub fn attenuate(&self, attenuation: &Spectrum) -> Spectrum {
        let mut out = [0.0; NUM_BANDS];
        for i in 0..NUM_BANDS {
            out[i] = (self.levels[i] - attenuation.levels[i]).max(0.0);
        }
        Spectrum { levels: out }
    }

    /// Combine another spectrum into this one using power-domain addition
    /// per band. Applies to every band value, including negative ones - a
    /// generated-noise band below 0dB still contributes its energy.
    pub fn combine(&self, other: &Spectrum) -> Spectrum {
        let mut out = [0.0; NUM_BANDS];
        for i in 0..NUM_BANDS {
            out[i] = combine_db(self.levels[i], other.levels[i]);
        }
        Spectrum { levels: out }
    }

    /// Per-band difference `self - other`, unfloored. Used for diagnostic
    /// deltas, not for propagation.
    pub fn delta(&self, other: &Spectrum) -> [f64; NUM_BANDS] {
        let mut out = [0.0; NUM_BANDS];
        for i in 0..NUM_BANDS {
            out[i] = self.levels[i] - other.levels[i];
        }
        out
    }

    /// Overall unweighted level: power sum across all 8 bands.
    pub fn overall_db(&self) -> f64 {
        power_to_db(self.levels.iter().map(|&l| db_to_power(l)).sum())
    }

    /// A-weighted overall level in dB(A): each band is corrected by the
    /// standard A-weighting offset, then power-summed.
    pub fn a_weighted_db(&self) -> f64 {
        let weighted: f64 = self
            .levels
            .iter()
            .zip(A_WEIGHTING_DB.iter())
            .map(|(&l, &w)| db_to_power(l + w))
            .sum();
        power_to_db(weighted)
    }

    /// Sum two attenuation spectra band-by-band. Losses stack
    /// arithmetically, unlike levels.
    pub fn stack(&self, other: &Spectrum) -> Spectrum {
        let mut out = self.levels;
        for (band, level) in out.iter_mut().zip(other.levels.iter()) {
            *band += level;
        }
        Spectrum { levels: out }
    }

    /// True if every band is at or below the silence floor.
    pub fn is_silent(&self) -> bool {
        self.levels.iter().all(|&l| l <= SILENCE_DB)
    }
}

impl Default for Spectrum {
    fn default() -> Self {
        Self::silence()
    }
}
