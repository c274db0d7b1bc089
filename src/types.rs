use geojson::{Feature, Value};
use serde::{Deserialize, Serialize};

// ** Coordinates **

/// A `[longitude, latitude]` position in degrees, as found in GeoJSON.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Coordinate { lon, lat }
    }

    /// Reads the first two components of a GeoJSON position, ignoring altitude.
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [lon, lat, ..] => Some(Coordinate::new(*lon, *lat)),
            _ => None,
        }
    }

    pub fn to_position(&self) -> Vec<f64> {
        vec![self.lon, self.lat]
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Coordinate::new(lon, lat)
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lon, c.lat]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

// Every way is a LineString with at least two usable positions; anything else is not a road.
pub fn line_string_coordinates(feature: &Feature) -> Option<Vec<Coordinate>> {
    let geometry = feature.geometry.as_ref()?;
    let Value::LineString(positions) = &geometry.value else {
        return None;
    };
    if positions.len() < 2 {
        return None;
    }
    positions
        .iter()
        .map(|p| Coordinate::from_position(p))
        .collect()
}

// ** Stage generation **

/// Length window (km) a stage has to fit in.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct StageBounds {
    pub min_km: f64,
    pub max_km: f64,
}

impl Default for StageBounds {
    fn default() -> Self {
        StageBounds {
            min_km: 3.0,
            max_km: 15.0,
        }
    }
}

/// The selected stage: the ordered path and the indices of its notable points.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Speciale {
    pub path: Vec<Coordinate>,
    pub intersections: Vec<usize>,
}

impl Speciale {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

// ** Road network **

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub ways_count: usize,
    pub total_km: f64,
}

// ** Request parameters **

fn default_radius_km() -> f64 {
    10.0
}

fn default_min_km() -> f64 {
    StageBounds::default().min_km
}

fn default_max_km() -> f64 {
    StageBounds::default().max_km
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageParams {
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub postal: Option<String>,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_min_km")]
    pub min_km: f64,
    #[serde(default = "default_max_km")]
    pub max_km: f64,
}

impl StageParams {
    pub fn bounds(&self) -> StageBounds {
        StageBounds {
            min_km: self.min_km,
            max_km: self.max_km,
        }
    }
}
