//! Path graph model
//!
//! A path arrives as an unordered bag of components and segments. This
//! module holds the explicit adjacency structure the orderer traverses:
//! components keyed by id, segments as edges, each component knowing which
//! segments touch it. Ordering logic lives in [`order`]; flow annotation in
//! [`flow`]. Nothing here depends on how the records were stored upstream.

pub mod flow;
pub mod order;

use crate::request::{ComponentRecord, PathRequest, SegmentRecord};
use std::collections::HashMap;
use std::fmt;

/// Structural errors that make a path impossible to calculate.
///
/// These are fatal to the path (but only to that path - a batch run
/// isolates them per path). Everything softer than this degrades to a
/// warning instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// No active source component (and no usable preferred-source hint).
    MissingSource,
    /// A segment references a component id that was not supplied.
    DisconnectedGraph {
        segment_id: String,
        component_id: String,
    },
    /// Traversal from the source never reaches a terminal component.
    IncompletePath { reached: String },
    /// Request carried no components at all.
    EmptyPath,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::MissingSource => {
                write!(f, "no source component (fan/ahu/blower/compressor) on path")
            }
            PathError::DisconnectedGraph {
                segment_id,
                component_id,
            } => write!(
                f,
                "segment {} references unknown component {}",
                segment_id, component_id
            ),
            PathError::IncompletePath { reached } => write!(
                f,
                "no terminal reachable from source (traversal ended at {})",
                reached
            ),
            PathError::EmptyPath => write!(f, "path has no components"),
        }
    }
}

impl std::error::Error for PathError {}

/// Adjacency view of one path request: components by id, segments as
/// edges, and per-component lists of touching segment indices.
#[derive(Debug, Clone)]
pub struct PathGraph {
    pub components: HashMap<String, ComponentRecord>,
    pub segments: Vec<SegmentRecord>,
    /// component id -> indices into `segments`
    adjacency: HashMap<String, Vec<usize>>,
}

impl PathGraph {
    /// Build the adjacency structure, validating that every segment's
    /// endpoints exist in the component set.
    pub fn build(request: &PathRequest) -> Result<Self, PathError> {
        if request.components.is_empty() {
            return Err(PathError::EmptyPath);
        }

        let components: HashMap<String, ComponentRecord> = request
            .components
            .iter()
            .map(|c| (c.id.clone(), c.clone()))
            .collect();

        let mut adjacency: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, segment) in request.segments.iter().enumerate() {
            for endpoint in [&segment.from, &segment.to] {
                if !components.contains_key(endpoint) {
                    return Err(PathError::DisconnectedGraph {
                        segment_id: segment.id.clone(),
                        component_id: endpoint.clone(),
                    });
                }
            }
            adjacency
                .entry(segment.from.clone())
                .or_default()
                .push(index);
            adjacency.entry(segment.to.clone()).or_default().push(index);
        }

        Ok(Self {
            components,
            segments: request.segments.clone(),
            adjacency,
        })
    }

    /// Segment indices touching a component.
    pub fn segments_at(&self, component_id: &str) -> &[usize] {
        self.adjacency
            .get(component_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of segments touching a component.
    pub fn degree(&self, component_id: &str) -> usize {
        self.segments_at(component_id).len()
    }

    /// The opposite endpoint of a segment, seen from `component_id`.
    pub fn other_end<'a>(&'a self, segment_index: usize, component_id: &str) -> &'a str {
        let segment = &self.segments[segment_index];
        if segment.from == component_id {
            &segment.to
        } else {
            &segment.from
        }
    }

    /// True if the component has a segment arriving at it (it is some
    /// segment's `to` end).
    pub fn has_incoming(&self, component_id: &str) -> bool {
        self.segments.iter().any(|s| s.to == component_id)
    }
}
