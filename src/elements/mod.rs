//! Path elements and per-element acoustic calculators
//!
//! The orderer hands over a node sequence; this module turns it into
//! [`PathElement`]s - the closed tagged-variant model the propagation
//! engine matches on exhaustively - and dispatches each element to its
//! physics calculator:
//!
//! ```text
//! Element      | Attenuates       | Generates        | Calculator
//! -------------|------------------|------------------|------------------
//! source       | -                | source spectrum  | (engine seed)
//! duct         | dB/ft tables     | -                | duct
//! flex duct    | IL/ft table      | -                | flexduct
//! elbow        | -                | velocity noise   | fittings
//! junction/tee | -                | velocity noise   | fittings
//! reducer      | -                | velocity noise   | fittings
//! damper       | -                | velocity noise   | fittings
//! silencer     | IL/ft table      | -                | duct
//! terminal     | end reflection,  | -                | terminal, room
//!              | room correction  |                  |
//! ```
//!
//! Every calculator is a pure function of geometry + flow + band. Missing
//! or non-positive geometry never aborts the path: a documented default is
//! substituted and the substitution recorded as a warning, so one sloppy
//! record degrades one element instead of killing the calculation.

pub mod duct;
pub mod fittings;
pub mod flexduct;
pub mod room;
pub mod terminal;

use crate::graph::order::PathNode;
use crate::request::{ComponentKind, ComponentRecord, RoomRecord, SegmentRecord, Termination};
use crate::spectrum::Spectrum;
use serde::Serialize;

/// Default substituted for a missing/zero duct run length.
pub const DEFAULT_LENGTH_FT: f64 = 10.0;
/// Default substituted for missing/zero duct dimensions (width, height,
/// or diameter alike).
pub const DEFAULT_DIMENSION_IN: f64 = 12.0;

/// Duct cross-section geometry, dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuctShape {
    Rectangular { width_in: f64, height_in: f64 },
    Circular { diameter_in: f64 },
}

impl DuctShape {
    /// Cross-sectional area in square feet.
    pub fn area_ft2(&self) -> f64 {
        match *self {
            DuctShape::Rectangular {
                width_in,
                height_in,
            } => (width_in * height_in) / 144.0,
            DuctShape::Circular { diameter_in } => {
                let r_ft = diameter_in / 24.0;
                std::f64::consts::PI * r_ft * r_ft
            }
        }
    }

    /// Diameter of the circle with the same area, inches. Lets circular
    /// reference tables serve rectangular geometry.
    pub fn equivalent_diameter_in(&self) -> f64 {
        match *self {
            DuctShape::Circular { diameter_in } => diameter_in,
            DuctShape::Rectangular {
                width_in,
                height_in,
            } => (4.0 * width_in * height_in / std::f64::consts::PI).sqrt(),
        }
    }
}

/// What a path element is, with the data its calculator needs.
///
/// Closed set: the dispatch below matches exhaustively, so a new fitting
/// kind will not compile until it has a calculator.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Source {
        spectrum: Option<Spectrum>,
        /// Flow the equipment delivers, CFM, when the record supplies it.
        rated_flow_cfm: Option<f64>,
    },
    Duct {
        shape: DuctShape,
        length_ft: f64,
        lining_in: f64,
    },
    FlexDuct {
        diameter_in: f64,
        length_ft: f64,
    },
    Elbow {
        shape: DuctShape,
        vanes: u32,
        angle_45: bool,
    },
    Junction {
        shape: DuctShape,
        /// Flow drawn off by the branch leg, if known.
        branch_flow_cfm: Option<f64>,
    },
    Reducer {
        shape: DuctShape,
    },
    Damper {
        shape: DuctShape,
    },
    Silencer {
        shape: DuctShape,
        length_ft: f64,
    },
    Terminal {
        shape: DuctShape,
        termination: Termination,
        room: Option<RoomRecord>,
    },
}

impl ElementKind {
    pub fn is_source(&self) -> bool {
        matches!(self, ElementKind::Source { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ElementKind::Terminal { .. })
    }

    /// Cross-section the element presents to the airstream, if it has one.
    pub fn shape(&self) -> Option<DuctShape> {
        match *self {
            ElementKind::Source { .. } => None,
            ElementKind::Duct { shape, .. } => Some(shape),
            ElementKind::FlexDuct { diameter_in, .. } => {
                Some(DuctShape::Circular { diameter_in })
            }
            ElementKind::Elbow { shape, .. } => Some(shape),
            ElementKind::Junction { shape, .. } => Some(shape),
            ElementKind::Reducer { shape } => Some(shape),
            ElementKind::Damper { shape } => Some(shape),
            ElementKind::Silencer { shape, .. } => Some(shape),
            ElementKind::Terminal { shape, .. } => Some(shape),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Source { .. } => "source",
            ElementKind::Duct { .. } => "duct",
            ElementKind::FlexDuct { .. } => "flex duct",
            ElementKind::Elbow { .. } => "elbow",
            ElementKind::Junction { .. } => "junction",
            ElementKind::Reducer { .. } => "reducer",
            ElementKind::Damper { .. } => "damper",
            ElementKind::Silencer { .. } => "silencer",
            ElementKind::Terminal { .. } => "terminal",
        }
    }
}

/// One element of an ordered path. Flow and velocity are filled in by the
/// flow propagator before the engine walks the sequence.
#[derive(Debug, Clone)]
pub struct PathElement {
    pub id: String,
    pub kind: ElementKind,
    /// Airflow through the element, CFM.
    pub flow_cfm: f64,
    /// Face velocity, feet per minute (CFM / area in ft2).
    pub velocity_fpm: f64,
}

/// Acoustic effect of one element: what it removes and what it adds.
///
/// Attenuation is in positive dB (subtracted band-by-band, floored at 0);
/// generated noise is a sound level spectrum combined in the power domain.
/// An element with no effect returns zero attenuation and a silent
/// generated spectrum - never an absent one.
#[derive(Debug, Clone)]
pub struct ElementEffect {
    pub attenuation: Spectrum,
    pub generated: Spectrum,
    pub warnings: Vec<String>,
}

impl ElementEffect {
    fn none() -> Self {
        Self {
            attenuation: Spectrum::flat(0.0),
            generated: Spectrum::silence(),
            warnings: Vec::new(),
        }
    }
}

/// Compute the acoustic effect of an element. Pure: geometry + flow in,
/// spectra out. Calculator anomalies (out-of-table geometry) degrade to a
/// zero effect with a warning, per the error-handling contract.
pub fn effect(element: &PathElement) -> ElementEffect {
    let mut result = ElementEffect::none();

    match &element.kind {
        ElementKind::Source { .. } => {
            // The engine seeds the running spectrum from the source
            // record; the element itself neither adds nor removes.
        }
        ElementKind::Duct {
            shape,
            length_ft,
            lining_in,
        } => {
            result.attenuation = duct::attenuation(*shape, *lining_in, *length_ft);
        }
        ElementKind::FlexDuct {
            diameter_in,
            length_ft,
        } => match flexduct::insertion_loss(*diameter_in, *length_ft) {
            Ok(spectrum) => result.attenuation = spectrum,
            Err(err) => {
                result
                    .warnings
                    .push(format!("flex_duct_skipped({}): {}", element.id, err));
            }
        },
        ElementKind::Elbow {
            shape,
            vanes,
            angle_45,
        } => {
            result.generated =
                fittings::elbow_generated(element.velocity_fpm, *shape, *vanes, *angle_45);
        }
        ElementKind::Junction {
            shape,
            branch_flow_cfm,
        } => {
            result.generated = fittings::junction_generated(
                element.velocity_fpm,
                *shape,
                element.flow_cfm,
                branch_flow_cfm.unwrap_or(0.0),
            );
        }
        ElementKind::Reducer { shape: _ } => {
            result.generated = fittings::reducer_generated(element.velocity_fpm);
        }
        ElementKind::Damper { shape: _ } => {
            result.generated = fittings::damper_generated(element.velocity_fpm);
        }
        ElementKind::Silencer { shape: _, length_ft } => {
            result.attenuation = duct::silencer_insertion_loss(*length_ft);
        }
        ElementKind::Terminal {
            shape,
            termination,
            room,
        } => {
            let erl = terminal::end_reflection_loss(*shape, *termination);
            result.attenuation = match room {
                Some(record) => erl.stack(&room::correction(record)),
                None => erl,
            };
        }
    }

    result
}

/// Resolve a record's geometry fields into a shape, inheriting the
/// surrounding duct's cross-section when the record has none of its own,
/// and falling back to the documented default (with a warning) otherwise.
fn resolve_shape(
    id: &str,
    width_in: Option<f64>,
    height_in: Option<f64>,
    diameter_in: Option<f64>,
    inherited: Option<DuctShape>,
    warnings: &mut Vec<String>,
) -> DuctShape {
    if let Some(d) = diameter_in {
        if d > 0.0 {
            return DuctShape::Circular { diameter_in: d };
        }
    }
    if let (Some(w), Some(h)) = (width_in, height_in) {
        if w > 0.0 && h > 0.0 {
            return DuctShape::Rectangular {
                width_in: w,
                height_in: h,
            };
        }
    }

    let supplied_any =
        width_in.is_some() || height_in.is_some() || diameter_in.is_some();

    if let Some(shape) = inherited {
        if supplied_any {
            // Dimensions were supplied but unusable (zero/negative/partial)
            warnings.push(format!("default_geometry({})", id));
        }
        return shape;
    }

    warnings.push(format!("default_geometry({})", id));
    DuctShape::Rectangular {
        width_in: DEFAULT_DIMENSION_IN,
        height_in: DEFAULT_DIMENSION_IN,
    }
}

fn resolve_length(id: &str, length_ft: Option<f64>, warnings: &mut Vec<String>) -> f64 {
    match length_ft {
        Some(l) if l > 0.0 => l,
        _ => {
            warnings.push(format!("default_length({})", id));
            DEFAULT_LENGTH_FT
        }
    }
}

fn component_element(
    record: &ComponentRecord,
    inherited: Option<DuctShape>,
    warnings: &mut Vec<String>,
) -> PathElement {
    let kind = match record.kind {
        ComponentKind::Fan
        | ComponentKind::AirHandlingUnit
        | ComponentKind::Blower
        | ComponentKind::Compressor => ElementKind::Source {
            spectrum: record.source_spectrum.map(Spectrum::from_levels),
            rated_flow_cfm: record.flow_cfm,
        },
        ComponentKind::Elbow => ElementKind::Elbow {
            shape: resolve_shape(
                &record.id,
                record.width_in,
                record.height_in,
                record.diameter_in,
                inherited,
                warnings,
            ),
            vanes: record.vanes.unwrap_or(0),
            angle_45: record.angle_45,
        },
        ComponentKind::Junction | ComponentKind::Tee => ElementKind::Junction {
            shape: resolve_shape(
                &record.id,
                record.width_in,
                record.height_in,
                record.diameter_in,
                inherited,
                warnings,
            ),
            branch_flow_cfm: record.branch_flow_cfm,
        },
        ComponentKind::Reducer => ElementKind::Reducer {
            shape: resolve_shape(
                &record.id,
                record.width_in,
                record.height_in,
                record.diameter_in,
                inherited,
                warnings,
            ),
        },
        ComponentKind::Damper => ElementKind::Damper {
            shape: resolve_shape(
                &record.id,
                record.width_in,
                record.height_in,
                record.diameter_in,
                inherited,
                warnings,
            ),
        },
        ComponentKind::Silencer => ElementKind::Silencer {
            shape: resolve_shape(
                &record.id,
                record.width_in,
                record.height_in,
                record.diameter_in,
                inherited,
                warnings,
            ),
            length_ft: resolve_length(&record.id, record.length_ft, warnings),
        },
        ComponentKind::FlexibleDuct => {
            let shape = resolve_shape(
                &record.id,
                record.width_in,
                record.height_in,
                record.diameter_in,
                inherited,
                warnings,
            );
            ElementKind::FlexDuct {
                diameter_in: shape.equivalent_diameter_in(),
                length_ft: resolve_length(&record.id, record.length_ft, warnings),
            }
        }
        ComponentKind::Terminal => ElementKind::Terminal {
            shape: resolve_shape(
                &record.id,
                record.width_in,
                record.height_in,
                record.diameter_in,
                inherited,
                warnings,
            ),
            termination: record.termination,
            room: record.room.clone(),
        },
    };

    PathElement {
        id: record.id.clone(),
        kind,
        flow_cfm: 0.0,
        velocity_fpm: 0.0,
    }
}

fn segment_element(
    record: &SegmentRecord,
    inherited: Option<DuctShape>,
    warnings: &mut Vec<String>,
) -> PathElement {
    let shape = resolve_shape(
        &record.id,
        record.width_in,
        record.height_in,
        record.diameter_in,
        inherited,
        warnings,
    );
    PathElement {
        id: record.id.clone(),
        kind: ElementKind::Duct {
            shape,
            length_ft: resolve_length(&record.id, record.length_ft, warnings),
            lining_in: record.lining_in.max(0.0),
        },
        flow_cfm: 0.0,
        velocity_fpm: 0.0,
    }
}

/// Turn the ordered node sequence into path elements. Fittings without
/// geometry of their own inherit the cross-section of the duct they sit
/// in (the most recently seen shape along the walk).
pub fn from_nodes(nodes: &[PathNode], warnings: &mut Vec<String>) -> Vec<PathElement> {
    let mut elements = Vec::with_capacity(nodes.len());
    let mut last_shape: Option<DuctShape> = None;

    for node in nodes {
        let element = match node {
            PathNode::Component(record) => component_element(record, last_shape, warnings),
            PathNode::Segment(record) => segment_element(record, last_shape, warnings),
        };
        if let Some(shape) = element.kind.shape() {
            last_shape = Some(shape);
        }
        elements.push(element);
    }

    elements
}
