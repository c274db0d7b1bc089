use std::collections::HashMap;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::geometry::path_length_km;
use crate::types::{line_string_coordinates, Coordinate, Location, NetworkStats};

const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub(crate) const USER_AGENT: &str = "rally-stage-generator/1.0";

const MIN_RADIUS_M: f64 = 1000.0;
const MAX_RADIUS_M: f64 = 50000.0;

// ** Overpass response **

#[derive(Debug, Default, Deserialize)]
pub struct OsmResponse {
    #[serde(default)]
    pub elements: Vec<OsmElement>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OsmElement {
    Node {
        id: u64,
        lat: f64,
        lon: f64,
        #[serde(default)]
        tags: JsonObject,
    },
    Way {
        id: u64,
        #[serde(default)]
        nodes: Vec<u64>,
        #[serde(default)]
        tags: JsonObject,
    },
    // Relations are not roads.
    #[serde(other)]
    Other,
}

/// Search radius in metres for a requested radius in km, kept within 1 to 50 km.
pub fn clamp_radius_m(radius_km: f64) -> f64 {
    MIN_RADIUS_M.max((radius_km * 1000.0).min(MAX_RADIUS_M))
}

/// Overpass QL for the drivable ways around a point, with their nodes.
pub fn overpass_query(center: &Location, radius_m: f64) -> String {
    format!(
        r#"
[out:json][timeout:90];
(
  way
    (around:{},{},{})
    ["highway"~"^(primary|secondary|tertiary|unclassified|track|road)$"]
    ["surface"!~"^(paving_stones|cobblestone)$"];
);
out body;
>;
out body qt;
"#,
        radius_m, center.latitude, center.longitude
    )
}

/// Downloads the raw road network around `center` from the Overpass API.
pub async fn fetch_roads(center: &Location, radius_m: f64) -> Result<OsmResponse> {
    log::info!("Overpass query around {}, {} within {} m", center.latitude, center.longitude, radius_m);

    let client = Client::new();
    let response = client
        .post(OVERPASS_URL)
        .header(reqwest::header::CONTENT_TYPE, "text/plain")
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .body(overpass_query(center, radius_m))
        .send()
        .await?
        .error_for_status()?
        .json::<OsmResponse>()
        .await?;

    log::info!("Elements received: {}", response.elements.len());
    Ok(response)
}

// ** Conversion to GeoJSON **

fn properties(kind: &str, id: u64, tags: &JsonObject) -> JsonObject {
    let mut props = tags.clone();
    props.insert("id".to_string(), JsonValue::String(format!("{}/{}", kind, id)));
    props
}

fn feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        geometry: Some(Geometry::new(value)),
        properties: Some(properties),
        ..Default::default()
    }
}

// Closed ways are areas unless they carry a highway tag, as roundabouts do.
fn is_area(nodes: &[u64], tags: &JsonObject) -> bool {
    let closed = nodes.len() > 3 && nodes.first() == nodes.last();
    let area_tag = tags.get("area").and_then(|v| v.as_str()) == Some("yes");
    closed && (area_tag || !tags.contains_key("highway"))
}

/// Turns raw OSM elements into GeoJSON features, with way count and total length.
///
/// Ways become LineStrings (Polygons for closed areas), tagged nodes become Points.
/// Node references that cannot be resolved are left out of the geometry.
pub fn osm_to_geojson(osm: &OsmResponse) -> (FeatureCollection, NetworkStats) {
    // Parse nodes and ways independently in case ways refer to nodes listed after them.
    let mut locations = HashMap::new();
    for element in &osm.elements {
        if let OsmElement::Node { id, lat, lon, .. } = element {
            locations.insert(*id, Coordinate::new(*lon, *lat));
        }
    }

    let mut features = Vec::new();
    for element in &osm.elements {
        match element {
            OsmElement::Way { id, nodes, tags } => {
                let positions: Vec<Vec<f64>> = nodes
                    .iter()
                    .filter_map(|n| locations.get(n))
                    .map(|c| c.to_position())
                    .collect();
                if positions.len() < 2 {
                    log::debug!("Way {} has fewer than 2 known nodes", id);
                    continue;
                }
                let value = if is_area(nodes, tags) {
                    Value::Polygon(vec![positions])
                } else {
                    Value::LineString(positions)
                };
                features.push(feature(value, properties("way", *id, tags)));
            }
            OsmElement::Node { id, lat, lon, tags } if !tags.is_empty() => {
                features.push(feature(Value::Point(vec![*lon, *lat]), properties("node", *id, tags)));
            }
            _ => {}
        }
    }

    let mut stats = NetworkStats::default();
    for f in &features {
        if let Some(coords) = line_string_coordinates(f) {
            stats.ways_count += 1;
            stats.total_km += path_length_km(&coords);
        }
    }

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    (collection, stats)
}
