use std::collections::HashMap;

use geojson::FeatureCollection;

use crate::geometry::distance_km;
use crate::types::{line_string_coordinates, Coordinate};

pub type NodeId = usize;

/// Identity of a graph node: the exact bit pattern of its coordinate.
///
/// No snapping is done, two positions a rounding error apart are different nodes.
/// `-0.0` is folded into `0.0` since both print as the same number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey(u64, u64);

impl NodeKey {
    pub fn of(coordinate: &Coordinate) -> Self {
        fn bits(v: f64) -> u64 {
            if v == 0.0 {
                0.0f64.to_bits()
            } else {
                v.to_bits()
            }
        }
        NodeKey(bits(coordinate.lon), bits(coordinate.lat))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub node: NodeId,
    pub length_km: f64,
}

pub struct RoadNode {
    pub coordinate: Coordinate,
    pub neighbors: Vec<Neighbor>,
}

/// Undirected road graph. Nodes and neighbor lists keep their first-insertion order.
#[derive(Default)]
pub struct RoadGraph {
    index: HashMap<NodeKey, NodeId>,
    nodes: Vec<RoadNode>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.neighbors.len()).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node for this coordinate, inserting it if it is new.
    pub fn add_node(&mut self, coordinate: Coordinate) -> NodeId {
        let next_id = self.nodes.len();
        let id = *self.index.entry(NodeKey::of(&coordinate)).or_insert(next_id);
        if id == next_id {
            self.nodes.push(RoadNode {
                coordinate,
                neighbors: Vec::new(),
            });
        }
        id
    }

    /// Sets the undirected edge `a - b`, overwriting the length of an existing one.
    /// Self-loops are ignored.
    pub fn set_edge(&mut self, a: NodeId, b: NodeId, length_km: f64) {
        if a == b {
            return;
        }
        self.upsert_neighbor(a, b, length_km);
        self.upsert_neighbor(b, a, length_km);
    }

    fn upsert_neighbor(&mut self, from: NodeId, to: NodeId, length_km: f64) {
        let neighbors = &mut self.nodes[from].neighbors;
        match neighbors.iter().position(|n| n.node == to) {
            Some(i) => neighbors[i].length_km = length_km,
            None => neighbors.push(Neighbor { node: to, length_km }),
        }
    }

    pub fn node_id(&self, coordinate: &Coordinate) -> Option<NodeId> {
        self.index.get(&NodeKey::of(coordinate)).copied()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        0..self.nodes.len()
    }

    pub fn coordinate(&self, id: NodeId) -> Coordinate {
        self.nodes[id].coordinate
    }

    pub fn neighbors(&self, id: NodeId) -> &[Neighbor] {
        &self.nodes[id].neighbors
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.nodes[id].neighbors.len()
    }

    pub fn edge_length(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.neighbors(a)
            .iter()
            .find(|n| n.node == b)
            .map(|n| n.length_km)
    }
}

/// Builds the road graph from every LineString of the collection.
///
/// Consecutive positions of a way become an edge weighted by their great-circle
/// distance. Features that are not usable LineStrings are skipped.
pub fn build_graph(collection: &FeatureCollection) -> RoadGraph {
    let mut graph = RoadGraph::new();
    let mut skipped = 0;

    for feature in &collection.features {
        let Some(coords) = line_string_coordinates(feature) else {
            skipped += 1;
            continue;
        };
        for pair in coords.windows(2) {
            let a = graph.add_node(pair[0]);
            let b = graph.add_node(pair[1]);
            graph.set_edge(a, b, distance_km(pair[0], pair[1]));
        }
    }

    if skipped > 0 {
        log::debug!("Skipped {} features without a usable LineString", skipped);
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{collection, line};
    use geojson::{Feature, Geometry, Value};

    #[test]
    fn shared_endpoints_become_one_node() {
        let graph = build_graph(&collection(vec![
            line(&[[0.0, 0.0], [0.01, 0.0], [0.02, 0.0]]),
            line(&[[0.02, 0.0], [0.02, 0.01]]),
        ]));
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);

        let joint = graph.node_id(&Coordinate::new(0.02, 0.0)).unwrap();
        assert_eq!(graph.degree(joint), 2);
        let start = graph.node_id(&Coordinate::new(0.0, 0.0)).unwrap();
        assert_eq!(graph.degree(start), 1);
    }

    #[test]
    fn node_identity_is_exact() {
        let graph = build_graph(&collection(vec![
            line(&[[0.0, 0.0], [0.01, 0.0]]),
            line(&[[0.0100000001, 0.0], [0.02, 0.0]]),
        ]));
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn negative_zero_is_the_same_node() {
        let graph = build_graph(&collection(vec![
            line(&[[0.0, 1.0], [0.01, 1.0]]),
            line(&[[-0.0, 1.0], [0.0, 1.01]]),
        ]));
        assert_eq!(graph.node_count(), 3);
        let id = graph.node_id(&Coordinate::new(0.0, 1.0)).unwrap();
        assert_eq!(graph.degree(id), 2);
    }

    #[test]
    fn duplicate_edges_collapse() {
        let graph = build_graph(&collection(vec![
            line(&[[0.0, 0.0], [0.01, 0.0]]),
            line(&[[0.01, 0.0], [0.0, 0.0]]),
        ]));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let a = graph.node_id(&Coordinate::new(0.0, 0.0)).unwrap();
        let b = graph.node_id(&Coordinate::new(0.01, 0.0)).unwrap();
        let length = graph.edge_length(a, b).unwrap();
        assert_eq!(graph.edge_length(b, a), Some(length));
        assert!((length - distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.01, 0.0))).abs() < 1e-12);
    }

    #[test]
    fn repeated_position_adds_no_self_loop() {
        let graph = build_graph(&collection(vec![line(&[[0.0, 0.0], [0.0, 0.0], [0.01, 0.0]])]));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn malformed_features_are_skipped() {
        let point = Feature {
            geometry: Some(Geometry::new(Value::Point(vec![0.0, 0.0]))),
            ..Default::default()
        };
        let graph = build_graph(&collection(vec![
            point,
            Feature::default(),
            line(&[[0.0, 0.0]]),
            line(&[[1.0, 1.0], [1.01, 1.0]]),
        ]));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn empty_collection_gives_empty_graph() {
        let graph = build_graph(&collection(Vec::new()));
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }
}
