//! Receiver-room correction
//!
//! Sound power delivered at a terminal is not the sound pressure an
//! occupant hears: the room's size, its absorption, and the listener's
//! distance from the outlet all intervene. The correction uses the
//! classic diffuse-room relation (imperial units):
//!
//! ```text
//! Lp = Lw + 10*log10(Q/(4*pi*r^2) + 4/R) + 10.5
//! R  = S*a / (1 - a)        (room constant, ft2)
//! ```
//!
//! with directivity Q = 2 (the terminal radiates from a wall or ceiling
//! surface), listener distance `r` in feet, and total surface area `S`
//! estimated from the room volume. Absorption `a` is per octave band:
//! a carpeted, furnished room soaks up hiss far better than rumble, so
//! the correction grows with frequency.
//!
//! Applied only when the terminal serves a modeled room; a bare grille
//! delivers its spectrum as-is. Very small live rooms at short distances
//! can produce a small positive (gain) term; that is clamped to zero so
//! the room never amplifies in the result.

use crate::request::RoomRecord;
use crate::spectrum::{Spectrum, NUM_BANDS};

/// Directivity for a terminal mounted in a room surface.
const DIRECTIVITY_Q: f64 = 2.0;

/// Per-band absorption assumed when the record supplies none: a typical
/// furnished room, more absorptive as frequency rises.
const DEFAULT_ABSORPTION: [f64; NUM_BANDS] = [0.10, 0.15, 0.20, 0.25, 0.30, 0.35, 0.35, 0.30];

/// Surface area estimate from volume, cube-proportioned room.
fn surface_area_ft2(volume_ft3: f64) -> f64 {
    6.0 * volume_ft3.powf(2.0 / 3.0)
}

/// Room correction as a per-band attenuation spectrum (>= 0 dB).
pub fn correction(record: &RoomRecord) -> Spectrum {
    let volume = record.volume_ft3.max(1.0);
    let distance = record.distance_ft.max(1.0);
    let surface = surface_area_ft2(volume);
    let absorption = record.absorption.unwrap_or(DEFAULT_ABSORPTION);

    let direct = DIRECTIVITY_Q / (4.0 * std::f64::consts::PI * distance * distance);

    let mut levels = [0.0; NUM_BANDS];
    for band in 0..NUM_BANDS {
        let alpha = absorption[band].clamp(0.01, 0.95);
        let room_constant = surface * alpha / (1.0 - alpha);
        let relative = 10.0 * (direct + 4.0 / room_constant).log10() + 10.5;
        // relative is the pressure-vs-power term; negative means the room
        // attenuates. Expressed as a positive attenuation, floored at 0.
        levels[band] = (-relative).max(0.0);
    }

    Spectrum::from_levels(levels)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // ROOM CORRECTION TESTS
    // ==========================================================================

    fn room(volume_ft3: f64, distance_ft: f64) -> RoomRecord {
        RoomRecord {
            volume_ft3,
            distance_ft,
            absorption: None,
        }
    }

    #[test]
    fn test_typical_office_attenuates_several_db() {
        let correction = correction(&room(3000.0, 5.0));
        // Mid-band correction for a typical office lands in single digits
        assert!(
            correction.level(4) > 3.0 && correction.level(4) < 12.0,
            "1kHz correction out of plausible range: {}",
            correction.level(4)
        );
    }

    #[test]
    fn test_absorptive_room_attenuates_more() {
        let hard = RoomRecord {
            volume_ft3: 3000.0,
            distance_ft: 5.0,
            absorption: Some([0.05; NUM_BANDS]),
        };
        let soft = RoomRecord {
            volume_ft3: 3000.0,
            distance_ft: 5.0,
            absorption: Some([0.5; NUM_BANDS]),
        };
        for band in 0..NUM_BANDS {
            assert!(correction(&soft).level(band) >= correction(&hard).level(band));
        }
    }

    #[test]
    fn test_distance_increases_correction() {
        let near = correction(&room(5000.0, 3.0));
        let far = correction(&room(5000.0, 15.0));
        assert!(far.level(4) >= near.level(4));
    }

    #[test]
    fn test_default_absorption_rises_with_frequency() {
        // The default room absorbs hiss better than rumble, so the
        // correction grows with band index
        let result = correction(&room(3000.0, 5.0));
        assert!(result.level(5) > result.level(0));
    }

    #[test]
    fn test_never_negative() {
        // A tiny live room at arm's length would compute a gain; the
        // correction clamps it out
        let result = correction(&RoomRecord {
            volume_ft3: 400.0,
            distance_ft: 2.0,
            absorption: Some([0.05; NUM_BANDS]),
        });
        for band in 0..NUM_BANDS {
            assert!(result.level(band) >= 0.0);
        }
    }

    #[test]
    fn test_degenerate_inputs_guarded() {
        // Zero volume/distance must not divide by zero or log(0)
        let result = correction(&room(0.0, 0.0));
        for band in 0..NUM_BANDS {
            assert!(result.level(band).is_finite());
        }
    }
}
