//! Fitting-generated (regenerated) noise
//!
//! Fittings do not just pass noise along - turbulence shed at elbows,
//! takeoffs, and damper blades makes new noise, and it scales steeply
//! with velocity. The model here is the classic velocity-power form:
//!
//! ```text
//! Lw(band) = base(band) + 50*log10(V / 1000fpm) + 10*log10(S) + corrections
//! ```
//!
//! - `base` is a characteristic spectrum per fitting type at the
//!   1000fpm reference velocity, falling ~4dB per octave (turbulence is
//!   a low-frequency phenomenon).
//! - The 50*log10 velocity term is why duct sizing matters: doubling
//!   velocity adds 15dB of regenerated noise.
//! - `S` is the fitting cross-section in square feet (a bigger fitting
//!   radiates more).
//! - Turning vanes break the single large vortex into smaller, weaker
//!   ones: each doubling of vane count takes roughly 3dB off.
//!
//! At low velocities the computed levels go negative. They are still
//! returned as-is: a negative dB level carries (tiny) energy and must
//! participate in the power-domain combination downstream. Guarding them
//! out with an `if > 0` check was a shipped bug in an earlier generation
//! of this calculation and is deliberately absent here.

use super::DuctShape;
use crate::spectrum::{Spectrum, NUM_BANDS};

/// Reference velocity for the characteristic spectra, feet per minute.
const REFERENCE_VELOCITY_FPM: f64 = 1000.0;

// Characteristic spectra at 1000fpm through a 1ft2 fitting.
const ELBOW_90_BASE: [f64; NUM_BANDS] = [48.0, 45.0, 41.0, 37.0, 33.0, 29.0, 25.0, 21.0];
const ELBOW_45_BASE: [f64; NUM_BANDS] = [44.0, 41.0, 37.0, 33.0, 29.0, 25.0, 21.0, 17.0];
const JUNCTION_BASE: [f64; NUM_BANDS] = [46.0, 44.0, 41.0, 38.0, 34.0, 30.0, 26.0, 22.0];
const DAMPER_BASE: [f64; NUM_BANDS] = [41.0, 40.0, 38.0, 36.0, 34.0, 31.0, 27.0, 23.0];
const REDUCER_BASE: [f64; NUM_BANDS] = [38.0, 36.0, 34.0, 32.0, 30.0, 27.0, 23.0, 19.0];

/// Velocity scaling term. Non-positive velocity means no airflow and no
/// regenerated noise at all.
fn velocity_term(velocity_fpm: f64) -> Option<f64> {
    if velocity_fpm <= 0.0 {
        return None;
    }
    Some(50.0 * (velocity_fpm / REFERENCE_VELOCITY_FPM).log10())
}

/// Area radiation term, 10*log10 of the cross-section in ft2.
fn area_term(shape: DuctShape) -> f64 {
    let area = shape.area_ft2();
    if area <= 0.0 {
        0.0
    } else {
        10.0 * area.log10()
    }
}

fn build(base: &[f64; NUM_BANDS], offset: f64) -> Spectrum {
    let mut levels = [0.0; NUM_BANDS];
    for band in 0..NUM_BANDS {
        levels[band] = base[band] + offset;
    }
    Spectrum::from_levels(levels)
}

/// Noise generated by an elbow.
///
/// `vanes` is the turning-vane count (0 = plain mitred elbow); vanes
/// reduce the generated level by 10*log10(1 + vanes). `angle_45` selects
/// the gentler 45-degree characteristic.
pub fn elbow_generated(
    velocity_fpm: f64,
    shape: DuctShape,
    vanes: u32,
    angle_45: bool,
) -> Spectrum {
    let velocity = match velocity_term(velocity_fpm) {
        Some(v) => v,
        None => return Spectrum::silence(),
    };

    let base = if angle_45 { &ELBOW_45_BASE } else { &ELBOW_90_BASE };
    let vane_reduction = 10.0 * (1.0 + f64::from(vanes)).log10();

    build(base, velocity + area_term(shape) - vane_reduction)
}

/// Noise generated by a junction or tee takeoff.
///
/// The split itself adds turbulence on top of the base characteristic:
/// the more of the upstream flow the branch leg draws, the stronger the
/// shear layer across the takeoff. The branch fraction term contributes
/// up to ~3dB at an even split.
pub fn junction_generated(
    velocity_fpm: f64,
    shape: DuctShape,
    flow_cfm: f64,
    branch_flow_cfm: f64,
) -> Spectrum {
    let velocity = match velocity_term(velocity_fpm) {
        Some(v) => v,
        None => return Spectrum::silence(),
    };

    let branch_fraction = if flow_cfm > 0.0 {
        (branch_flow_cfm / flow_cfm).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let split_term = 10.0 * (1.0 + branch_fraction).log10();

    build(&JUNCTION_BASE, velocity + area_term(shape) + split_term)
}

/// Noise generated by a balancing damper in the airstream. Blade shear
/// is broadband and sits higher in frequency than elbow turbulence.
pub fn damper_generated(velocity_fpm: f64) -> Spectrum {
    match velocity_term(velocity_fpm) {
        Some(velocity) => build(&DAMPER_BASE, velocity),
        None => Spectrum::silence(),
    }
}

/// Noise generated by a cross-section change. A smooth reducer sheds far
/// less turbulence than a damper blade at the same velocity.
pub fn reducer_generated(velocity_fpm: f64) -> Spectrum {
    match velocity_term(velocity_fpm) {
        Some(velocity) => build(&REDUCER_BASE, velocity),
        None => Spectrum::silence(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // REGENERATED NOISE TESTS
    // ==========================================================================
    //
    // The 50*log10 velocity law is the load-bearing behavior: it is what
    // makes an undersized duct audibly hiss. Reference points:
    // - 2x velocity: +15.05dB
    // - 1/2 velocity: -15.05dB (levels go negative at low speed - kept!)
    // ==========================================================================

    fn one_ft2() -> DuctShape {
        DuctShape::Rectangular {
            width_in: 12.0,
            height_in: 12.0,
        }
    }

    #[test]
    fn test_reference_velocity_returns_base() {
        let result = elbow_generated(1000.0, one_ft2(), 0, false);
        for band in 0..NUM_BANDS {
            assert!(
                (result.level(band) - ELBOW_90_BASE[band]).abs() < 1e-9,
                "band {}",
                band
            );
        }
    }

    #[test]
    fn test_doubling_velocity_adds_15db() {
        let slow = elbow_generated(1000.0, one_ft2(), 0, false);
        let fast = elbow_generated(2000.0, one_ft2(), 0, false);
        let delta = fast.level(0) - slow.level(0);
        assert!((delta - 15.05).abs() < 0.01, "got {}", delta);
    }

    #[test]
    fn test_low_velocity_levels_go_negative_and_stay() {
        // At 200fpm the velocity term is -35dB: bands go negative, and the
        // calculator must return them rather than zeroing them out
        let result = elbow_generated(200.0, one_ft2(), 0, false);
        assert!(
            result.level(7) < 0.0,
            "8kHz band should be negative, got {}",
            result.level(7)
        );
        assert!(!result.is_silent(), "negative levels are not silence");
    }

    #[test]
    fn test_zero_velocity_is_silence() {
        assert!(elbow_generated(0.0, one_ft2(), 0, false).is_silent());
        assert!(damper_generated(0.0).is_silent());
        assert!(junction_generated(0.0, one_ft2(), 1000.0, 500.0).is_silent());
    }

    #[test]
    fn test_turning_vanes_reduce_noise() {
        let plain = elbow_generated(1500.0, one_ft2(), 0, false);
        let vaned = elbow_generated(1500.0, one_ft2(), 3, false);

        let reduction = plain.level(0) - vaned.level(0);
        // 10*log10(4) ~= 6.02dB
        assert!((reduction - 6.02).abs() < 0.01, "got {}", reduction);
    }

    #[test]
    fn test_45_degree_quieter_than_90() {
        let sharp = elbow_generated(1500.0, one_ft2(), 0, false);
        let gentle = elbow_generated(1500.0, one_ft2(), 0, true);
        for band in 0..NUM_BANDS {
            assert!(gentle.level(band) < sharp.level(band));
        }
    }

    #[test]
    fn test_junction_split_adds_noise() {
        let pass_through = junction_generated(1500.0, one_ft2(), 2000.0, 0.0);
        let even_split = junction_generated(1500.0, one_ft2(), 2000.0, 1000.0);

        let delta = even_split.level(0) - pass_through.level(0);
        // 10*log10(1.5) ~= 1.76dB
        assert!((delta - 1.76).abs() < 0.01, "got {}", delta);
    }

    #[test]
    fn test_spectra_fall_with_frequency() {
        // Turbulence noise is low-frequency biased; every characteristic
        // spectrum must slope downward
        for base in [
            &ELBOW_90_BASE,
            &ELBOW_45_BASE,
            &JUNCTION_BASE,
            &DAMPER_BASE,
            &REDUCER_BASE,
        ] {
            for pair in base.windows(2) {
                assert!(pair[1] < pair[0]);
            }
        }
    }

    #[test]
    fn test_reducer_quieter_than_damper() {
        let damper = damper_generated(1500.0);
        let reducer = reducer_generated(1500.0);
        for band in 0..NUM_BANDS {
            assert!(reducer.level(band) < damper.level(band));
        }
    }

    #[test]
    fn test_small_fitting_quieter_than_large() {
        let small = DuctShape::Circular { diameter_in: 8.0 };
        let large = DuctShape::Rectangular {
            width_in: 24.0,
            height_in: 24.0,
        };
        let small_noise = elbow_generated(1500.0, small, 0, false);
        let large_noise = elbow_generated(1500.0, large, 0, false);
        assert!(small_noise.level(0) < large_noise.level(0));
    }
}
