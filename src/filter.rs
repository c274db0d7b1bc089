use geojson::{Feature, FeatureCollection, JsonObject};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::geometry::path_length_km;
use crate::types::line_string_coordinates;

// ** Road properties **

/// The OSM tags the rally filter looks at. Everything else is kept in `other`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RoadProperties {
    #[serde(default)]
    pub highway: Option<String>,
    #[serde(default)]
    pub surface: Option<String>,
    #[serde(default)]
    pub landuse: Option<String>,
    #[serde(default, rename = "addr:street")]
    pub addr_street: Option<JsonValue>,
    #[serde(default)]
    pub parking: Option<JsonValue>,
    #[serde(flatten)]
    pub other: JsonObject,
}

impl RoadProperties {
    pub fn from_feature(feature: &Feature) -> Option<Self> {
        match &feature.properties {
            Some(props) => serde_json::from_value(JsonValue::Object(props.clone())).ok(),
            None => Some(RoadProperties::default()),
        }
    }
}

// Tags count as set when they would read as true in the OSM JSON: not null, false, 0 or "".
fn is_set(value: &Option<JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => false,
        Some(JsonValue::Bool(b)) => *b,
        Some(JsonValue::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(true),
        Some(JsonValue::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

// ** Filter configuration **

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub allowed_highways: Vec<String>,
    pub forbidden_highways: Vec<String>,
    pub allowed_surfaces: Vec<String>,
    pub forbidden_landuse: Vec<String>,
    pub min_length_km: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            allowed_highways: strings(&["track", "unclassified", "road", "secondary", "tertiary", "residential"]),
            forbidden_highways: strings(&[
                "primary",
                "motorway",
                "trunk",
                "service",
                "footway",
                "cycleway",
                "path",
                "pedestrian",
            ]),
            allowed_surfaces: strings(&[
                "asphalt",
                "paved",
                "compacted",
                "fine_gravel",
                "gravel",
                "dirt",
                "ground",
                "unpaved",
            ]),
            forbidden_landuse: strings(&["industrial", "commercial", "retail"]),
            min_length_km: 0.08,
        }
    }
}

impl FilterConfig {
    fn contains(list: &[String], value: &str) -> bool {
        list.iter().any(|v| v == value)
    }

    /// Whether a feature is a road worth racing on.
    pub fn accepts(&self, feature: &Feature) -> bool {
        let Some(coords) = line_string_coordinates(feature) else {
            return false;
        };
        let Some(props) = RoadProperties::from_feature(feature) else {
            return false;
        };

        let Some(highway) = props.highway.as_deref() else {
            return false;
        };
        if Self::contains(&self.forbidden_highways, highway) || !Self::contains(&self.allowed_highways, highway) {
            return false;
        }

        if let Some(surface) = props.surface.as_deref().filter(|s| !s.is_empty()) {
            if !Self::contains(&self.allowed_surfaces, &surface.to_lowercase()) {
                return false;
            }
        }

        if path_length_km(&coords) < self.min_length_km {
            return false;
        }

        if is_set(&props.addr_street) || is_set(&props.parking) {
            return false;
        }

        match props.landuse.as_deref() {
            Some(landuse) => !Self::contains(&self.forbidden_landuse, landuse),
            None => true,
        }
    }
}

/// Keeps only the ways suitable for a rally stage.
pub fn filter_rally_ways(collection: &FeatureCollection, config: &FilterConfig) -> FeatureCollection {
    let features: Vec<Feature> = collection
        .features
        .iter()
        .filter(|f| config.accepts(f))
        .cloned()
        .collect();

    log::info!("Filtered roads: {} of {}", features.len(), collection.features.len());
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
