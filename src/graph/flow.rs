//! Flow-rate propagation along an ordered path
//!
//! Only active equipment knows its own airflow; every duct and fitting
//! downstream just carries whatever arrives. This pass walks the ordered
//! element list once and annotates each element with its flow (CFM) and
//! face velocity (fpm), so the acoustic calculators never have to reason
//! about where the air came from.
//!
//! Velocity falls straight out of the units: CFM divided by area in
//! square feet *is* feet per minute. (Keeping everything in fpm matters -
//! the regenerated-noise law is calibrated in fpm, and feeding it ft/s
//! understates fitting noise by 50*log10(60) = 89dB. That unit mix-up
//! has shipped before, in an earlier generation of this calculation.)
//!
//! At a junction the branch draw is subtracted from the continuing main
//! leg, never below zero: flow is conserved, and a branch cannot draw
//! more than arrives.

use crate::elements::{ElementKind, PathElement};

/// Flow assumed for a path whose records carry none at all.
pub const DEFAULT_FLOW_CFM: f64 = 500.0;

/// Velocity substituted when an element's area is non-positive, instead
/// of dividing by zero.
pub const DEFAULT_VELOCITY_FPM: f64 = 600.0;

/// Annotate every element with flow and velocity, walking source to
/// terminal. Returns nothing; results land on the elements, problems
/// land in `warnings`.
pub fn propagate(elements: &mut [PathElement], warnings: &mut Vec<String>) {
    let mut current_flow: Option<f64> = None;

    for element in elements.iter_mut() {
        let flow = match &element.kind {
            ElementKind::Source { rated_flow_cfm, .. } => {
                let flow = match rated_flow_cfm {
                    Some(f) if *f > 0.0 => *f,
                    _ => {
                        warnings.push(format!("flow_defaulted({})", element.id));
                        DEFAULT_FLOW_CFM
                    }
                };
                current_flow = Some(flow);
                flow
            }
            ElementKind::Junction {
                branch_flow_cfm, ..
            } => {
                let upstream = inherited_flow(&mut current_flow, &element.id, warnings);
                // The junction itself sees the full upstream flow; the
                // split applies downstream of it.
                let branch = match branch_flow_cfm {
                    Some(b) => b.clamp(0.0, upstream),
                    None => {
                        warnings.push(format!("branch_flow_inferred({})", element.id));
                        upstream / 2.0
                    }
                };
                current_flow = Some((upstream - branch).max(0.0));
                upstream
            }
            _ => inherited_flow(&mut current_flow, &element.id, warnings),
        };

        element.flow_cfm = flow;
        element.velocity_fpm = velocity(element, flow);
    }
}

/// Flow inherited from the nearest upstream source, defaulting (with a
/// warning) when the walk has not passed one.
fn inherited_flow(
    current_flow: &mut Option<f64>,
    element_id: &str,
    warnings: &mut Vec<String>,
) -> f64 {
    match current_flow {
        Some(flow) => *flow,
        None => {
            warnings.push(format!("flow_defaulted({})", element_id));
            *current_flow = Some(DEFAULT_FLOW_CFM);
            DEFAULT_FLOW_CFM
        }
    }
}

/// Face velocity in fpm: CFM / ft2. Elements with no cross-section (the
/// source) carry zero; a degenerate area falls back to a safe default.
fn velocity(element: &PathElement, flow_cfm: f64) -> f64 {
    match element.kind.shape() {
        None => 0.0,
        Some(shape) => {
            let area = shape.area_ft2();
            if area > 0.0 {
                flow_cfm / area
            } else {
                DEFAULT_VELOCITY_FPM
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::DuctShape;
    use crate::request::Termination;
    use crate::spectrum::Spectrum;

    // ==========================================================================
    // FLOW PROPAGATION TESTS
    // ==========================================================================
    //
    // The conservation rules under test:
    // - passive elements inherit the nearest upstream source's flow
    // - branch draw <= upstream, continuing = upstream - branch, never < 0
    // - velocity = CFM / ft2 (which is already fpm)
    // ==========================================================================

    fn source(id: &str, flow: Option<f64>) -> PathElement {
        PathElement {
            id: id.to_string(),
            kind: ElementKind::Source {
                spectrum: Some(Spectrum::flat(72.0)),
                rated_flow_cfm: flow,
            },
            flow_cfm: 0.0,
            velocity_fpm: 0.0,
        }
    }

    fn duct(id: &str, width_in: f64, height_in: f64) -> PathElement {
        PathElement {
            id: id.to_string(),
            kind: ElementKind::Duct {
                shape: DuctShape::Rectangular {
                    width_in,
                    height_in,
                },
                length_ft: 10.0,
                lining_in: 0.0,
            },
            flow_cfm: 0.0,
            velocity_fpm: 0.0,
        }
    }

    fn junction(id: &str, branch_flow: Option<f64>) -> PathElement {
        PathElement {
            id: id.to_string(),
            kind: ElementKind::Junction {
                shape: DuctShape::Rectangular {
                    width_in: 12.0,
                    height_in: 12.0,
                },
                branch_flow_cfm: branch_flow,
            },
            flow_cfm: 0.0,
            velocity_fpm: 0.0,
        }
    }

    fn terminal(id: &str) -> PathElement {
        PathElement {
            id: id.to_string(),
            kind: ElementKind::Terminal {
                shape: DuctShape::Circular { diameter_in: 12.0 },
                termination: Termination::Flush,
                room: None,
            },
            flow_cfm: 0.0,
            velocity_fpm: 0.0,
        }
    }

    #[test]
    fn test_passive_elements_inherit_source_flow() {
        let mut elements = vec![source("F", Some(2000.0)), duct("S1", 12.0, 12.0), terminal("T")];
        let mut warnings = Vec::new();
        propagate(&mut elements, &mut warnings);

        assert_eq!(elements[0].flow_cfm, 2000.0);
        assert_eq!(elements[1].flow_cfm, 2000.0);
        assert_eq!(elements[2].flow_cfm, 2000.0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_velocity_is_cfm_over_ft2() {
        // 2000 CFM through a 12x12 (1 ft2) duct = 2000 fpm
        let mut elements = vec![source("F", Some(2000.0)), duct("S1", 12.0, 12.0)];
        let mut warnings = Vec::new();
        propagate(&mut elements, &mut warnings);

        assert!((elements[1].velocity_fpm - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_junction_subtracts_branch_flow() {
        let mut elements = vec![
            source("F", Some(2000.0)),
            junction("J", Some(600.0)),
            duct("S2", 12.0, 12.0),
        ];
        let mut warnings = Vec::new();
        propagate(&mut elements, &mut warnings);

        // The junction sees the full upstream flow
        assert_eq!(elements[1].flow_cfm, 2000.0);
        // The continuing leg sees upstream minus branch
        assert_eq!(elements[2].flow_cfm, 1400.0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_branch_cannot_exceed_upstream() {
        let mut elements = vec![
            source("F", Some(1000.0)),
            junction("J", Some(5000.0)),
            duct("S2", 12.0, 12.0),
        ];
        let mut warnings = Vec::new();
        propagate(&mut elements, &mut warnings);

        // Branch clamps to upstream; continuing leg bottoms at zero
        assert_eq!(elements[2].flow_cfm, 0.0);
    }

    #[test]
    fn test_unknown_branch_flow_infers_even_split() {
        let mut elements = vec![
            source("F", Some(2000.0)),
            junction("J", None),
            duct("S2", 12.0, 12.0),
        ];
        let mut warnings = Vec::new();
        propagate(&mut elements, &mut warnings);

        assert_eq!(elements[2].flow_cfm, 1000.0);
        assert_eq!(warnings, vec!["branch_flow_inferred(J)"]);
    }

    #[test]
    fn test_no_source_defaults_with_warning() {
        let mut elements = vec![duct("S1", 12.0, 12.0), terminal("T")];
        let mut warnings = Vec::new();
        propagate(&mut elements, &mut warnings);

        assert_eq!(elements[0].flow_cfm, DEFAULT_FLOW_CFM);
        assert_eq!(elements[1].flow_cfm, DEFAULT_FLOW_CFM);
        // Warned once, at the first element that needed the default
        assert_eq!(warnings, vec!["flow_defaulted(S1)"]);
    }

    #[test]
    fn test_source_without_rating_defaults_with_warning() {
        let mut elements = vec![source("F", None), duct("S1", 12.0, 12.0)];
        let mut warnings = Vec::new();
        propagate(&mut elements, &mut warnings);

        assert_eq!(elements[0].flow_cfm, DEFAULT_FLOW_CFM);
        assert_eq!(warnings, vec!["flow_defaulted(F)"]);
    }

    #[test]
    fn test_zero_area_velocity_falls_back() {
        let mut elements = vec![source("F", Some(1000.0)), duct("S1", 0.0, 0.0)];
        let mut warnings = Vec::new();
        propagate(&mut elements, &mut warnings);

        assert_eq!(elements[1].velocity_fpm, DEFAULT_VELOCITY_FPM);
    }

    #[test]
    fn test_source_has_no_face_velocity() {
        let mut elements = vec![source("F", Some(1000.0))];
        let mut warnings = Vec::new();
        propagate(&mut elements, &mut warnings);
        assert_eq!(elements[0].velocity_fpm, 0.0);
    }
}
