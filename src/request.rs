//! Path-description input records
//!
//! The engine is fed plain records by its collaborators (the persistence
//! layer, the drawing overlay, the schedule importer). A path arrives as a
//! [`PathRequest`]: a bag of component records plus the segments connecting
//! them. Nothing here touches a database or a UI - records deserialize from
//! JSON and that is the whole contract.
//!
//! ```text
//! {
//!   "path_id": "AHU-1 / VAV-12 / Office 204",
//!   "components": [
//!     { "id": "C1", "kind": "fan", "flow_cfm": 2000,
//!       "source_spectrum": [78, 75, 72, 69, 66, 63, 60, 57] },
//!     { "id": "C2", "kind": "elbow", "vanes": 4 },
//!     { "id": "C3", "kind": "terminal", "diameter_in": 12 }
//!   ],
//!   "segments": [
//!     { "id": "S1", "from": "C1", "to": "C2", "length_ft": 10,
//!       "width_in": 12, "height_in": 8, "order_index": 0 },
//!     { "id": "S2", "from": "C2", "to": "C3", "length_ft": 6,
//!       "diameter_in": 12, "order_index": 1 }
//!   ]
//! }
//! ```
//!
//! Components are not required to arrive in path order - ordering them is
//! the graph orderer's job. The `order_index` on each segment is only the
//! stored fallback used when the graph cannot be traversed.

use crate::spectrum::NUM_BANDS;
use serde::{Deserialize, Serialize};

/// Kind of a mechanical component on a path.
///
/// Active kinds produce airflow and noise; passive kinds shape both. The
/// set is closed: the propagation engine matches on it exhaustively, so a
/// new fitting kind is a compile-time-checked addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Fan,
    AirHandlingUnit,
    Blower,
    Compressor,
    Elbow,
    Junction,
    Tee,
    Reducer,
    Damper,
    Silencer,
    FlexibleDuct,
    Terminal,
}

impl ComponentKind {
    /// Active equipment defines its own flow rate; everything else
    /// inherits flow from upstream.
    pub fn is_source(&self) -> bool {
        matches!(
            self,
            ComponentKind::Fan
                | ComponentKind::AirHandlingUnit
                | ComponentKind::Blower
                | ComponentKind::Compressor
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ComponentKind::Terminal)
    }

    /// Short label for result lines and traces.
    pub fn label(&self) -> &'static str {
        match self {
            ComponentKind::Fan => "fan",
            ComponentKind::AirHandlingUnit => "ahu",
            ComponentKind::Blower => "blower",
            ComponentKind::Compressor => "compressor",
            ComponentKind::Elbow => "elbow",
            ComponentKind::Junction => "junction",
            ComponentKind::Tee => "tee",
            ComponentKind::Reducer => "reducer",
            ComponentKind::Damper => "damper",
            ComponentKind::Silencer => "silencer",
            ComponentKind::FlexibleDuct => "flex duct",
            ComponentKind::Terminal => "terminal",
        }
    }
}

/// How a terminal meets the space it serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Duct end mounted flush in a wall or ceiling.
    #[default]
    Flush,
    /// Duct end hanging free in the space.
    Free,
}

/// Receiver-room description attached to a terminal that delivers into a
/// modeled occupied space (absent for a bare grille).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// Room volume in cubic feet.
    pub volume_ft3: f64,
    /// Distance from terminal to the listening position, feet.
    #[serde(default = "default_listener_distance")]
    pub distance_ft: f64,
    /// Per-band absorption coefficients (0..1). Defaults to a typical
    /// furnished-room average when omitted.
    #[serde(default)]
    pub absorption: Option<[f64; NUM_BANDS]>,
}

fn default_listener_distance() -> f64 {
    5.0
}

/// One mechanical component as supplied by the collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub id: String,
    pub kind: ComponentKind,

    /// Airflow for active equipment, CFM. Passive components leave this
    /// unset and inherit from upstream.
    #[serde(default)]
    pub flow_cfm: Option<f64>,

    /// Sound power spectrum for active equipment, 8 octave bands in dB.
    #[serde(default)]
    pub source_spectrum: Option<[f64; NUM_BANDS]>,

    /// Rectangular face dimensions, inches.
    #[serde(default)]
    pub width_in: Option<f64>,
    #[serde(default)]
    pub height_in: Option<f64>,

    /// Circular face diameter, inches.
    #[serde(default)]
    pub diameter_in: Option<f64>,

    /// Run length for components that have one (flexible duct), feet.
    #[serde(default)]
    pub length_ft: Option<f64>,

    /// Turning-vane count for elbows (0 or absent = plain elbow).
    #[serde(default)]
    pub vanes: Option<u32>,

    /// 45-degree fitting rather than the default 90-degree geometry.
    #[serde(default)]
    pub angle_45: bool,

    /// Flow drawn off by the branch leg at a junction/tee, CFM. When
    /// absent an even split is inferred (with a warning).
    #[serde(default)]
    pub branch_flow_cfm: Option<f64>,

    /// Termination style for terminals.
    #[serde(default)]
    pub termination: Termination,

    /// Receiver room served by a terminal, when modeled.
    #[serde(default)]
    pub room: Option<RoomRecord>,
}

/// One duct segment connecting two components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub id: String,
    /// Component id at the upstream end.
    pub from: String,
    /// Component id at the downstream end.
    pub to: String,

    /// Run length in feet.
    #[serde(default)]
    pub length_ft: Option<f64>,

    /// Rectangular duct dimensions, inches. A segment with a diameter
    /// instead is circular.
    #[serde(default)]
    pub width_in: Option<f64>,
    #[serde(default)]
    pub height_in: Option<f64>,
    #[serde(default)]
    pub diameter_in: Option<f64>,

    /// Acoustic lining thickness in inches, 0 = unlined sheet metal.
    #[serde(default)]
    pub lining_in: f64,

    /// Stored fallback ordering, used only when the graph cannot be
    /// traversed from source to terminal.
    pub order_index: u32,
}

/// A complete path-description request: everything the engine needs to
/// calculate one source-to-terminal path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRequest {
    pub path_id: String,
    pub components: Vec<ComponentRecord>,
    pub segments: Vec<SegmentRecord>,

    /// Preferred source component when a path has more than one candidate
    /// piece of active equipment.
    #[serde(default)]
    pub preferred_source: Option<String>,
}

/// Parse a request file: either a single request object or an array of
/// them, so batch exports and single-path exports share a format.
pub fn parse_requests(data: &str) -> Result<Vec<PathRequest>, serde_json::Error> {
    if data.trim_start().starts_with('[') {
        serde_json::from_str(data)
    } else {
        serde_json::from_str::<PathRequest>(data).map(|r| vec![r])
    }
}
