use geojson::{Feature, FeatureCollection};
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::graph::build_graph;
use crate::intersections::detect_intersections;
use crate::path::{GreedyWalk, PathStrategy};
use crate::types::{Speciale, StageBounds};

/// Generates a stage from filtered road features with the greedy strategy.
pub fn generate_speciale(collection: &FeatureCollection, bounds: StageBounds) -> Speciale {
    generate_speciale_with(collection, bounds, &GreedyWalk)
}

pub fn generate_speciale_with<S: PathStrategy + ?Sized>(
    collection: &FeatureCollection,
    bounds: StageBounds,
    strategy: &S,
) -> Speciale {
    if collection.features.is_empty() {
        return Speciale::default();
    }

    let graph = build_graph(collection);
    log::info!("Graph: {} nodes, {} edges", graph.node_count(), graph.edge_count());

    let path = strategy.find_best_path(&graph, bounds);
    log::info!("Path found: {} points", path.len());

    let intersections = detect_intersections(&path, &graph);
    log::info!("Intersections: {}", intersections.len());

    Speciale { path, intersections }
}

/// Reads a FeatureCollection leniently and generates a stage from it.
///
/// `null`, a missing or null `features` member and an empty list all give an
/// empty stage. Features that do not parse are dropped. Only text that is not
/// JSON at all is an error.
pub fn generate_speciale_json(geojson: &str, bounds: StageBounds) -> Result<Speciale> {
    let value: JsonValue = serde_json::from_str(geojson)?;
    let collection = lenient_collection(value);
    Ok(generate_speciale(&collection, bounds))
}

fn lenient_collection(value: JsonValue) -> FeatureCollection {
    let raw_features = match value {
        JsonValue::Object(mut map) => match map.remove("features") {
            Some(JsonValue::Array(features)) => features,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let total = raw_features.len();
    let features: Vec<Feature> = raw_features
        .into_iter()
        .filter_map(|f| serde_json::from_value(f).ok())
        .collect();
    if features.len() < total {
        log::debug!("Dropped {} unreadable features", total - features.len());
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
