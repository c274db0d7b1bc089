use serde::Serialize;

use crate::geometry::are_segments_aligned;
use crate::graph::RoadGraph;
use crate::types::Coordinate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntersectionKind {
    /// More than two roads meet at this node.
    Junction,
    /// A plain road node where the stage bends.
    Turn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Intersection {
    pub index: usize,
    pub kind: IntersectionKind,
}

/// Classifies every interior point of `path` that is a junction or a turn.
///
/// The degree comes from the whole graph, so a node also shared by roads the
/// stage does not use still counts as a junction. Endpoints are never reported.
pub fn classify_intersections(path: &[Coordinate], graph: &RoadGraph) -> Vec<Intersection> {
    let mut found = Vec::new();
    if path.len() < 3 {
        return found;
    }

    for idx in 1..path.len() - 1 {
        let Some(node) = graph.node_id(&path[idx]) else {
            continue;
        };
        let degree = graph.degree(node);
        if degree > 2 {
            log::debug!("Junction at [{}]: {} neighbors", idx, degree);
            found.push(Intersection {
                index: idx,
                kind: IntersectionKind::Junction,
            });
        } else if degree == 2 && !are_segments_aligned(path[idx - 1], path[idx], path[idx + 1]) {
            log::debug!("Turn at [{}]: segments not aligned", idx);
            found.push(Intersection {
                index: idx,
                kind: IntersectionKind::Turn,
            });
        }
    }
    found
}

/// Indices (ascending) of the path points worth a PK marker.
pub fn detect_intersections(path: &[Coordinate], graph: &RoadGraph) -> Vec<usize> {
    classify_intersections(path, graph)
        .into_iter()
        .map(|i| i.index)
        .collect()
}
