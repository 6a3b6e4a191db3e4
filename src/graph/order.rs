//! Graph-to-sequence ordering
//!
//! Turns the unordered component/segment bag into one deterministic
//! source-to-terminal sequence. The rules, in the order they apply:
//!
//! 1. **Source**: the caller's preferred-source hint if it names a real
//!    component; otherwise an active component with no incoming segment;
//!    otherwise any active component (lowest id wins, with a warning).
//! 2. **Traversal**: walk outward from the source along unvisited
//!    segments. At a junction (degree >= 3) the main line is assumed to
//!    continue through the branch with the *larger connected subtree*;
//!    ties prefer the branch that can reach a terminal, then the lower
//!    component id. Branches not taken are recorded as warnings, never
//!    silently dropped.
//! 3. **Fallback**: if the graph cannot be traversed (no source, stranded
//!    segments, or the bounded iteration budget runs out), the segments'
//!    stored `order_index` is used instead and a warning is recorded.
//!
//! The subtree heuristic is an approximation used because true geometric
//! angle data is unavailable; it is isolated in [`branch_preference`] so it
//! can be replaced by angle-based reasoning without touching the walk.

use super::{PathError, PathGraph};
use crate::request::{ComponentRecord, SegmentRecord};
use std::collections::HashSet;

/// One entry in the ordered source-to-terminal sequence.
#[derive(Debug, Clone)]
pub enum PathNode {
    Component(ComponentRecord),
    Segment(SegmentRecord),
}

impl PathNode {
    pub fn id(&self) -> &str {
        match self {
            PathNode::Component(c) => &c.id,
            PathNode::Segment(s) => &s.id,
        }
    }
}

/// Result of ordering: the node sequence plus everything worth telling
/// the caller about how it was derived.
#[derive(Debug, Clone)]
pub struct Ordering {
    pub nodes: Vec<PathNode>,
    pub warnings: Vec<String>,
}

/// Order a path graph into a single source-to-terminal sequence.
pub fn order(graph: &PathGraph, preferred_source: Option<&str>) -> Result<Ordering, PathError> {
    let mut warnings = Vec::new();

    let source = match find_source(graph, preferred_source, &mut warnings) {
        Some(id) => id,
        None => {
            // No active equipment anywhere: stored order is all we have.
            warnings.push("source_missing_fallback_order".to_string());
            let nodes = fallback_order(graph);
            return finish(nodes, warnings);
        }
    };

    match traverse(graph, &source, &mut warnings) {
        Some(nodes) => finish(nodes, warnings),
        None => {
            warnings.push("fallback_order_used".to_string());
            let nodes = fallback_order(graph);
            finish(nodes, warnings)
        }
    }
}

/// Verify the ordered sequence actually ends at a terminal.
fn finish(nodes: Vec<PathNode>, warnings: Vec<String>) -> Result<Ordering, PathError> {
    let last_component = nodes.iter().rev().find_map(|n| match n {
        PathNode::Component(c) => Some(c),
        PathNode::Segment(_) => None,
    });

    match last_component {
        Some(c) if c.kind.is_terminal() => Ok(Ordering { nodes, warnings }),
        Some(c) => Err(PathError::IncompletePath {
            reached: c.id.clone(),
        }),
        None => Err(PathError::EmptyPath),
    }
}

/// Pick the source component. Preference order: caller hint, active with
/// no incoming segment, any active (lowest id).
fn find_source(
    graph: &PathGraph,
    preferred: Option<&str>,
    warnings: &mut Vec<String>,
) -> Option<String> {
    if let Some(hint) = preferred {
        if graph.components.contains_key(hint) {
            return Some(hint.to_string());
        }
        warnings.push(format!("preferred_source_unknown({})", hint));
    }

    let mut candidates: Vec<&str> = graph
        .components
        .values()
        .filter(|c| c.kind.is_source())
        .map(|c| c.id.as_str())
        .collect();
    candidates.sort_unstable();

    if candidates.is_empty() {
        return None;
    }

    let without_incoming: Vec<&str> = candidates
        .iter()
        .copied()
        .filter(|id| !graph.has_incoming(id))
        .collect();

    let pool = if without_incoming.is_empty() {
        &candidates
    } else {
        &without_incoming
    };

    if pool.len() > 1 {
        warnings.push(format!("multiple_candidate_sources({})", pool.join(",")));
    }
    pool.first().map(|id| id.to_string())
}

/// Walk from the source along unvisited segments, resolving junctions via
/// [`branch_preference`]. Bounded at segment count + 4 iterations so a
/// malformed graph can never loop forever. Returns None when the walk
/// must give way to the stored fallback order.
fn traverse(graph: &PathGraph, source: &str, warnings: &mut Vec<String>) -> Option<Vec<PathNode>> {
    let mut nodes = vec![PathNode::Component(graph.components[source].clone())];
    let mut visited: HashSet<usize> = HashSet::new();
    let mut current = source.to_string();

    let budget = graph.segments.len() + 4;
    for _ in 0..budget {
        let mut candidates: Vec<usize> = graph
            .segments_at(&current)
            .iter()
            .copied()
            .filter(|i| !visited.contains(i))
            .collect();

        if candidates.is_empty() {
            // Walk is complete. If segments remain unvisited the graph has
            // a stranded piece and the stored order is more trustworthy.
            if visited.len() < graph.segments.len() {
                for (index, segment) in graph.segments.iter().enumerate() {
                    if !visited.contains(&index) {
                        warnings.push(format!("segment_unreachable({})", segment.id));
                    }
                }
                return None;
            }
            return Some(nodes);
        }

        let chosen = if candidates.len() == 1 {
            candidates[0]
        } else {
            // Skipped branches are reported by the sweep when the
            // terminal is reached, so the walk only has to choose here.
            let mut keyed: Vec<_> = candidates
                .iter()
                .map(|&i| (branch_preference(graph, &current, i, &visited), i))
                .collect();
            keyed.sort_by(|a, b| b.0.cmp(&a.0));
            keyed[0].1
        };

        visited.insert(chosen);
        let next = graph.other_end(chosen, &current).to_string();
        nodes.push(PathNode::Segment(graph.segments[chosen].clone()));
        nodes.push(PathNode::Component(graph.components[&next].clone()));

        if graph.components[&next].kind.is_terminal() {
            for (index, segment) in graph.segments.iter().enumerate() {
                if !visited.contains(&index) {
                    warnings.push(format!("branch_not_traversed({})", segment.id));
                }
            }
            return Some(nodes);
        }
        current = next;
    }

    // Budget exhausted: the graph has a cycle or is otherwise malformed.
    warnings.push("traversal_budget_exceeded".to_string());
    None
}

/// Preference key for continuing through a candidate segment at a
/// junction: larger reachable subtree first, then terminal reachability,
/// then lower component id (inverted so lower sorts as preferred).
///
/// Heuristic stand-in for geometric angle data; see module docs.
fn branch_preference(
    graph: &PathGraph,
    from: &str,
    segment_index: usize,
    visited: &HashSet<usize>,
) -> (usize, bool, std::cmp::Reverse<String>) {
    let mut reachable: HashSet<usize> = HashSet::new();
    let mut has_terminal = false;

    let start = graph.other_end(segment_index, from).to_string();
    reachable.insert(segment_index);

    let mut queue = vec![start];
    let mut seen_components: HashSet<String> = HashSet::new();
    seen_components.insert(from.to_string());

    while let Some(component) = queue.pop() {
        if !seen_components.insert(component.clone()) {
            continue;
        }
        if graph.components[&component].kind.is_terminal() {
            has_terminal = true;
        }
        for &i in graph.segments_at(&component) {
            if visited.contains(&i) || reachable.contains(&i) {
                continue;
            }
            reachable.insert(i);
            queue.push(graph.other_end(i, &component).to_string());
        }
    }

    let next_id = graph.other_end(segment_index, from).to_string();
    (reachable.len(), has_terminal, std::cmp::Reverse(next_id))
}

/// Stored-order fallback: segments sorted by their fallback order index,
/// components threaded through in encounter order.
fn fallback_order(graph: &PathGraph) -> Vec<PathNode> {
    let mut segments: Vec<&SegmentRecord> = graph.segments.iter().collect();
    segments.sort_by_key(|s| s.order_index);

    let mut nodes: Vec<PathNode> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for segment in segments {
        if seen.insert(&segment.from) {
            nodes.push(PathNode::Component(graph.components[&segment.from].clone()));
        }
        nodes.push(PathNode::Segment(segment.clone()));
        if seen.insert(&segment.to) {
            nodes.push(PathNode::Component(graph.components[&segment.to].clone()));
        }
    }

    if nodes.is_empty() {
        // No segments at all: emit components in id order.
        let mut components: Vec<&ComponentRecord> = graph.components.values().collect();
        components.sort_by(|a, b| a.id.cmp(&b.id));
        nodes = components
            .into_iter()
            .map(|c| PathNode::Component(c.clone()))
            .collect();
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{parse_requests, PathRequest};

    // ==========================================================================
    // ORDERING TESTS
    // ==========================================================================
    //
    // The orderer must produce the same sequence every run for the same
    // input - results land in reports that get diffed between revisions,
    // so nondeterminism here shows up as phantom design changes.
    // ==========================================================================

    fn request(json: &str) -> PathRequest {
        parse_requests(json).unwrap().remove(0)
    }

    fn ordered_ids(ordering: &Ordering) -> Vec<&str> {
        ordering.nodes.iter().map(|n| n.id()).collect()
    }

    #[test]
    fn test_linear_path_orders_source_to_terminal() {
        // Components supplied out of order on purpose
        let req = request(
            r#"{
                "path_id": "t",
                "components": [
                    { "id": "C3", "kind": "terminal", "diameter_in": 12.0 },
                    { "id": "C1", "kind": "fan", "flow_cfm": 2000.0 },
                    { "id": "C2", "kind": "elbow" }
                ],
                "segments": [
                    { "id": "S2", "from": "C2", "to": "C3", "length_ft": 6.0, "order_index": 1 },
                    { "id": "S1", "from": "C1", "to": "C2", "length_ft": 10.0, "order_index": 0 }
                ]
            }"#,
        );
        let graph = PathGraph::build(&req).unwrap();
        let ordering = order(&graph, None).unwrap();

        assert_eq!(ordered_ids(&ordering), ["C1", "S1", "C2", "S2", "C3"]);
        assert!(ordering.warnings.is_empty());
    }

    #[test]
    fn test_junction_prefers_larger_subtree() {
        // C2 is a junction: a short stub to a dead-end damper vs a longer
        // run to the terminal. The longer branch is the main line.
        let req = request(
            r#"{
                "path_id": "t",
                "components": [
                    { "id": "C1", "kind": "fan", "flow_cfm": 2000.0 },
                    { "id": "C2", "kind": "junction" },
                    { "id": "D1", "kind": "damper" },
                    { "id": "C4", "kind": "elbow" },
                    { "id": "C5", "kind": "terminal", "diameter_in": 10.0 }
                ],
                "segments": [
                    { "id": "S1", "from": "C1", "to": "C2", "length_ft": 8.0, "order_index": 0 },
                    { "id": "SB", "from": "C2", "to": "D1", "length_ft": 4.0, "order_index": 9 },
                    { "id": "S2", "from": "C2", "to": "C4", "length_ft": 12.0, "order_index": 1 },
                    { "id": "S3", "from": "C4", "to": "C5", "length_ft": 6.0, "order_index": 2 }
                ]
            }"#,
        );
        let graph = PathGraph::build(&req).unwrap();
        let ordering = order(&graph, None).unwrap();

        assert_eq!(
            ordered_ids(&ordering),
            ["C1", "S1", "C2", "S2", "C4", "S3", "C5"]
        );
        // The stub branch is noted, not silently dropped
        assert!(
            ordering
                .warnings
                .iter()
                .any(|w| w == "branch_not_traversed(SB)"),
            "warnings: {:?}",
            ordering.warnings
        );
    }

    #[test]
    fn test_equal_branches_prefer_terminal() {
        // Both branches reach one more segment; only one ends in a terminal
        let req = request(
            r#"{
                "path_id": "t",
                "components": [
                    { "id": "C1", "kind": "fan", "flow_cfm": 1000.0 },
                    { "id": "J", "kind": "junction" },
                    { "id": "X", "kind": "damper" },
                    { "id": "T", "kind": "terminal", "diameter_in": 8.0 }
                ],
                "segments": [
                    { "id": "S1", "from": "C1", "to": "J", "length_ft": 5.0, "order_index": 0 },
                    { "id": "SX", "from": "J", "to": "X", "length_ft": 5.0, "order_index": 1 },
                    { "id": "ST", "from": "J", "to": "T", "length_ft": 5.0, "order_index": 2 }
                ]
            }"#,
        );
        let graph = PathGraph::build(&req).unwrap();
        let ordering = order(&graph, None).unwrap();

        assert_eq!(ordered_ids(&ordering), ["C1", "S1", "J", "ST", "T"]);
    }

    #[test]
    fn test_preferred_source_hint_wins() {
        let req = request(
            r#"{
                "path_id": "t",
                "preferred_source": "F2",
                "components": [
                    { "id": "F1", "kind": "fan", "flow_cfm": 1000.0 },
                    { "id": "F2", "kind": "fan", "flow_cfm": 1500.0 },
                    { "id": "T", "kind": "terminal", "diameter_in": 8.0 }
                ],
                "segments": [
                    { "id": "S1", "from": "F1", "to": "F2", "length_ft": 4.0, "order_index": 0 },
                    { "id": "S2", "from": "F2", "to": "T", "length_ft": 4.0, "order_index": 1 }
                ]
            }"#,
        );
        let graph = PathGraph::build(&req).unwrap();
        let ordering = order(&graph, Some("F2")).unwrap();

        assert_eq!(ordered_ids(&ordering)[0], "F2");
    }

    #[test]
    fn test_no_terminal_is_incomplete_path() {
        let req = request(
            r#"{
                "path_id": "t",
                "components": [
                    { "id": "C1", "kind": "fan", "flow_cfm": 2000.0 },
                    { "id": "C2", "kind": "elbow" }
                ],
                "segments": [
                    { "id": "S1", "from": "C1", "to": "C2", "length_ft": 10.0, "order_index": 0 }
                ]
            }"#,
        );
        let graph = PathGraph::build(&req).unwrap();
        match order(&graph, None) {
            Err(PathError::IncompletePath { reached }) => assert_eq!(reached, "C2"),
            other => panic!("expected IncompletePath, got {:?}", other),
        }
    }

    #[test]
    fn test_stranded_segment_falls_back_to_stored_order() {
        // S2 is not connected to the walk from C1 (island between C4/C5
        // reached only via stored order), so the orderer falls back.
        let req = request(
            r#"{
                "path_id": "t",
                "components": [
                    { "id": "C1", "kind": "fan", "flow_cfm": 2000.0 },
                    { "id": "C2", "kind": "elbow" },
                    { "id": "C4", "kind": "damper" },
                    { "id": "C5", "kind": "terminal", "diameter_in": 10.0 }
                ],
                "segments": [
                    { "id": "S1", "from": "C1", "to": "C2", "length_ft": 10.0, "order_index": 0 },
                    { "id": "S2", "from": "C4", "to": "C5", "length_ft": 6.0, "order_index": 1 }
                ]
            }"#,
        );
        let graph = PathGraph::build(&req).unwrap();
        let ordering = order(&graph, None).unwrap();

        assert!(ordering
            .warnings
            .iter()
            .any(|w| w == "fallback_order_used"));
        // Fallback still ends at the terminal
        assert_eq!(*ordered_ids(&ordering).last().unwrap(), "C5");
    }

    #[test]
    fn test_cycle_terminates_and_reports_error() {
        // A loop of fittings must not spin the walk forever; the visited
        // set and the iteration budget both bound it, and a loop with no
        // terminal is a structural error.
        let req = request(
            r#"{
                "path_id": "t",
                "components": [
                    { "id": "C1", "kind": "fan", "flow_cfm": 2000.0 },
                    { "id": "C2", "kind": "elbow" },
                    { "id": "C3", "kind": "elbow" }
                ],
                "segments": [
                    { "id": "S1", "from": "C1", "to": "C2", "length_ft": 5.0, "order_index": 0 },
                    { "id": "S2", "from": "C2", "to": "C3", "length_ft": 5.0, "order_index": 1 },
                    { "id": "S3", "from": "C3", "to": "C1", "length_ft": 5.0, "order_index": 2 }
                ]
            }"#,
        );
        let graph = PathGraph::build(&req).unwrap();
        // Terminates (bounded) and reports the structural failure
        assert!(order(&graph, None).is_err());
    }

    #[test]
    fn test_no_source_uses_stored_order() {
        let req = request(
            r#"{
                "path_id": "t",
                "components": [
                    { "id": "C2", "kind": "elbow" },
                    { "id": "C3", "kind": "terminal", "diameter_in": 12.0 }
                ],
                "segments": [
                    { "id": "S1", "from": "C2", "to": "C3", "length_ft": 10.0, "order_index": 0 }
                ]
            }"#,
        );
        let graph = PathGraph::build(&req).unwrap();
        let ordering = order(&graph, None).unwrap();

        assert!(ordering
            .warnings
            .iter()
            .any(|w| w == "source_missing_fallback_order"));
        assert_eq!(ordered_ids(&ordering), ["C2", "S1", "C3"]);
    }
}
