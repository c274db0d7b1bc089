use std::collections::HashSet;

use crate::graph::{NodeId, RoadGraph};
use crate::types::{Coordinate, StageBounds};

/// A way of picking one stage out of the road graph.
pub trait PathStrategy {
    /// Returns the chosen path, or an empty one when nothing fits the bounds.
    fn find_best_path(&self, graph: &RoadGraph, bounds: StageBounds) -> Vec<Coordinate>;
}

/// Greedy single pass over the graph.
///
/// Walks from every node not consumed by an earlier walk, always taking the first
/// unvisited neighbor, and keeps the longest walk that fits the bounds. This is
/// O(V + E) and makes no attempt at finding the optimal path: a node reached by
/// one walk is never used as a start again, and a walk never backtracks.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyWalk;

struct Walk {
    nodes: Vec<NodeId>,
    length_km: f64,
}

impl GreedyWalk {
    fn walk(&self, graph: &RoadGraph, start: NodeId, consumed: &mut [bool], max_km: f64) -> Walk {
        let mut nodes = Vec::new();
        let mut visited = HashSet::new();
        let mut prev: Option<NodeId> = None;
        let mut current = start;
        let mut length_km = 0.0;

        loop {
            nodes.push(current);
            visited.insert(current);
            consumed[current] = true;

            let next = graph
                .neighbors(current)
                .iter()
                .find(|n| Some(n.node) != prev && !visited.contains(&n.node));
            let Some(next) = next else {
                break;
            };
            // The step that overshoots is dropped, its node stays available for later walks.
            if length_km + next.length_km > max_km {
                break;
            }
            length_km += next.length_km;
            prev = Some(current);
            current = next.node;
        }

        Walk { nodes, length_km }
    }
}

impl PathStrategy for GreedyWalk {
    fn find_best_path(&self, graph: &RoadGraph, bounds: StageBounds) -> Vec<Coordinate> {
        let mut consumed = vec![false; graph.node_count()];
        let mut best: Option<Walk> = None;
        let mut best_length_km = 0.0;
        let mut walks = 0;

        for start in graph.node_ids() {
            if consumed[start] {
                continue;
            }
            let walk = self.walk(graph, start, &mut consumed, bounds.max_km);
            walks += 1;

            let fits = walk.length_km >= bounds.min_km && walk.length_km <= bounds.max_km;
            if fits && walk.nodes.len() > 2 && walk.length_km > best_length_km {
                best_length_km = walk.length_km;
                best = Some(walk);
            }
        }

        log::info!(
            "{} walks over {} nodes, best stage {:.3} km",
            walks,
            graph.node_count(),
            best_length_km
        );

        best.map(|w| w.nodes.into_iter().map(|id| graph.coordinate(id)).collect())
            .unwrap_or_default()
    }
}

/// Runs the default greedy strategy.
pub fn find_best_path(graph: &RoadGraph, bounds: StageBounds) -> Vec<Coordinate> {
    GreedyWalk.find_best_path(graph, bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::path_length_km;
    use crate::graph::build_graph;
    use crate::testing::{collection, line};

    fn bounds(min_km: f64, max_km: f64) -> StageBounds {
        StageBounds { min_km, max_km }
    }

    // 0.01 degree of latitude is about 1.11 km.
    fn straight_road(points: usize) -> Vec<[f64; 2]> {
        (0..points).map(|i| [5.0, 45.0 + 0.01 * i as f64]).collect()
    }

    #[test]
    fn single_edge_never_qualifies() {
        let graph = build_graph(&collection(vec![line(&[[0.0, 0.0], [0.0, 0.1]])]));
        assert!(find_best_path(&graph, bounds(0.001, 100.0)).is_empty());
    }

    #[test]
    fn whole_road_when_it_fits() {
        let road = straight_road(6);
        let graph = build_graph(&collection(vec![line(&road)]));
        let path = find_best_path(&graph, bounds(1.0, 100.0));
        assert_eq!(path.len(), 6);
        assert_eq!(path[0], Coordinate::new(5.0, 45.0));
        assert_eq!(path[5], Coordinate::new(5.0, 45.05));
    }

    #[test]
    fn walk_stops_before_exceeding_max() {
        let road = straight_road(11);
        let graph = build_graph(&collection(vec![line(&road)]));
        let path = find_best_path(&graph, bounds(1.0, 3.5));
        // Three steps of ~1.11 km fit, the fourth would not.
        assert_eq!(path.len(), 4);
        let length = path_length_km(&path);
        assert!((1.0..=3.5).contains(&length), "length {}", length);
    }

    #[test]
    fn only_taken_edges_count_towards_the_length() {
        // One way A-B-C-D-E-F with legs of about 0.1, 1, 1, 1 and 0.99 km.
        let lats = [0.0, 0.0009, 0.0099, 0.0189, 0.0279, 0.0368];
        let road: Vec<[f64; 2]> = lats.iter().map(|&lat| [0.0, lat]).collect();
        let graph = build_graph(&collection(vec![line(&road)]));
        let path = find_best_path(&graph, bounds(0.5, 3.05));

        // From A the walk stops at D (2.1 km) and leaves E unconsumed. Starting again
        // from E gives E-D-C-B (3.0 km), which beats both A-B-C-D and F-E-D-C.
        let walked: Vec<f64> = path.iter().map(|c| c.lat).collect();
        assert_eq!(walked, vec![0.0279, 0.0189, 0.0099, 0.0009]);
        let length = path_length_km(&path);
        assert!(length <= 3.05 && length > 2.9, "length {}", length);
    }

    #[test]
    fn too_short_gives_empty_path() {
        let graph = build_graph(&collection(vec![line(&straight_road(4))]));
        assert!(find_best_path(&graph, bounds(10.0, 15.0)).is_empty());
    }

    #[test]
    fn longest_component_wins() {
        let short = vec![[0.0, 10.0], [0.0, 10.01], [0.0, 10.02]];
        let long = straight_road(8);
        let graph = build_graph(&collection(vec![line(&short), line(&long)]));
        let path = find_best_path(&graph, bounds(0.5, 100.0));
        assert_eq!(path.len(), 8);
        assert_eq!(path[0], Coordinate::new(5.0, 45.0));
    }

    #[test]
    fn equal_lengths_keep_the_first() {
        let first = vec![[0.0, 10.0], [0.0, 10.01], [0.0, 10.02]];
        let second = vec![[1.0, 10.0], [1.0, 10.01], [1.0, 10.02]];
        let graph = build_graph(&collection(vec![line(&first), line(&second)]));
        let path = find_best_path(&graph, bounds(0.5, 100.0));
        assert_eq!(path[0], Coordinate::new(0.0, 10.0));
    }

    #[test]
    fn walk_takes_first_neighbor_at_a_fork() {
        // A trunk with two branches leaving its end; the branch added first is followed.
        let graph = build_graph(&collection(vec![
            line(&[[0.0, 0.0], [0.0, 0.01], [0.0, 0.02]]),
            line(&[[0.0, 0.02], [0.01, 0.03], [0.02, 0.04]]),
            line(&[[0.0, 0.02], [-0.01, 0.03]]),
        ]));
        let path = find_best_path(&graph, bounds(0.5, 100.0));
        assert_eq!(
            path,
            vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(0.0, 0.01),
                Coordinate::new(0.0, 0.02),
                Coordinate::new(0.01, 0.03),
                Coordinate::new(0.02, 0.04),
            ]
        );
    }

    #[test]
    fn loop_is_walked_once() {
        let graph = build_graph(&collection(vec![line(&[
            [0.0, 0.0],
            [0.0, 0.01],
            [0.01, 0.01],
            [0.01, 0.0],
            [0.0, 0.0],
        ])]));
        let path = find_best_path(&graph, bounds(0.5, 100.0));
        assert_eq!(path.len(), 4);
        let unique: HashSet<_> = path.iter().map(crate::graph::NodeKey::of).collect();
        assert_eq!(unique.len(), path.len());
    }

    #[test]
    fn empty_graph() {
        let graph = RoadGraph::new();
        assert!(find_best_path(&graph, StageBounds::default()).is_empty());
    }
}
