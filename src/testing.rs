use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};

pub fn line(coords: &[[f64; 2]]) -> Feature {
    Feature {
        geometry: Some(Geometry::new(Value::LineString(
            coords.iter().map(|c| c.to_vec()).collect(),
        ))),
        ..Default::default()
    }
}

pub fn road(coords: &[[f64; 2]], properties: serde_json::Value) -> Feature {
    let properties: Option<JsonObject> = match properties {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    };
    Feature {
        properties,
        ..line(coords)
    }
}

pub fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
