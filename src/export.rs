use geo::{BoundingRect, LineString};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};

use crate::types::Coordinate;

/// Wraps a stage path in a FeatureCollection holding a single LineString.
pub fn coords_to_geojson(path: &[Coordinate]) -> FeatureCollection {
    if path.len() < 2 {
        return FeatureCollection {
            bbox: None,
            features: Vec::new(),
            foreign_members: None,
        };
    }

    let line: LineString<f64> = path.iter().map(|c| (c.lon, c.lat)).collect::<Vec<_>>().into();
    let bbox = line
        .bounding_rect()
        .map(|r| vec![r.min().x, r.min().y, r.max().x, r.max().y]);

    let feature = Feature {
        geometry: Some(Geometry::new(Value::LineString(
            path.iter().map(|c| c.to_position()).collect(),
        ))),
        properties: Some(JsonObject::new()),
        ..Default::default()
    };

    FeatureCollection {
        bbox,
        features: vec![feature],
        foreign_members: None,
    }
}

pub fn to_kml(path: &[Coordinate]) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let coordinates = path
        .iter()
        .map(|c| format!("{},{},0", c.lon, c.lat))
        .collect::<Vec<_>>()
        .join(" ");

    Some(format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>Rally Stage</name>
    <Placemark>
      <name>Spéciale</name>
      <LineString>
        <coordinates>{}</coordinates>
      </LineString>
    </Placemark>
  </Document>
</kml>"#,
        coordinates
    ))
}

pub fn to_gpx(path: &[Coordinate]) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let trackpoints = path
        .iter()
        .map(|c| format!(r#"      <trkpt lat="{}" lon="{}"></trkpt>"#, c.lat, c.lon))
        .collect::<Vec<_>>()
        .join("\n");

    Some(format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="RallyStageGenerator">
  <trk>
    <name>Spéciale</name>
    <trkseg>
{}
    </trkseg>
  </trk>
</gpx>"#,
        trackpoints
    ))
}
