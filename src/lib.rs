use geojson::FeatureCollection;
use log::Level;
use serde::Serialize;
use serde_json::json;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use wasm_bindgen_futures::js_sys;

pub mod error;
pub mod export;
pub mod filter;
pub mod geocoder;
pub mod geometry;
pub mod graph;
pub mod intersections;
pub mod osm_fetcher;
pub mod path;
pub mod speciale;
pub mod stats;
pub mod types;

#[cfg(test)]
mod testing;

pub use self::error::{Error, Result};
pub use self::filter::{filter_rally_ways, FilterConfig};
pub use self::graph::{build_graph, RoadGraph};
pub use self::intersections::detect_intersections;
pub use self::path::{find_best_path, GreedyWalk, PathStrategy};
pub use self::speciale::{generate_speciale, generate_speciale_json, generate_speciale_with};
pub use self::types::{Coordinate, Location, NetworkStats, Speciale, StageBounds, StageParams};

use self::export::coords_to_geojson;
use self::geocoder::geocode;
use self::osm_fetcher::{clamp_radius_m, fetch_roads, osm_to_geojson};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageResponse {
    pub ok: bool,
    pub center: Location,
    pub radius_meters: f64,
    pub stats: NetworkStats,
    pub geojson: FeatureCollection,
    pub intersections: Vec<usize>,
    pub speciales: Vec<Vec<Coordinate>>,
}

/// Full pipeline: place name to rally stage.
pub async fn generate_stage(params: &StageParams, filter: &FilterConfig) -> Result<StageResponse> {
    let place = params
        .place
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(Error::MissingPlace)?;
    log::info!("Generating stage for {} {}", place, params.postal.as_deref().unwrap_or(""));

    let center = geocode(place, params.postal.as_deref()).await?;

    let radius_m = clamp_radius_m(params.radius_km);
    let osm = fetch_roads(&center, radius_m).await?;

    let (roads, stats) = osm_to_geojson(&osm);
    if stats.ways_count == 0 {
        return Err(Error::NoRoads { radius_m });
    }

    let rally_roads = filter_rally_ways(&roads, filter);
    let Speciale { path, intersections } = generate_speciale(&rally_roads, params.bounds());
    log::info!("Stage generated: {} points, {} intersections", path.len(), intersections.len());

    Ok(StageResponse {
        ok: true,
        center,
        radius_meters: radius_m,
        stats,
        geojson: coords_to_geojson(&path),
        intersections,
        speciales: if path.is_empty() { Vec::new() } else { vec![path] },
    })
}

pub async fn generate_stage_async(params_json: &str) -> std::result::Result<String, String> {
    let params: StageParams = serde_json::from_str(params_json).map_err(|e| error_json(&Error::from(e)))?;
    let response = generate_stage(&params, &FilterConfig::default())
        .await
        .map_err(|e| error_json(&e))?;
    serde_json::to_string(&response).map_err(|e| error_json(&Error::from(e)))
}

fn error_json(error: &Error) -> String {
    log::error!("Stage generation failed: {}", error);
    json!({ "ok": false, "error": error.to_string() }).to_string()
}

// ** wasm entry points **

#[wasm_bindgen]
pub fn rust_init() {
    if console_log::init_with_level(Level::Info).is_err() {
        // Already initialized.
        return;
    }
    log::info!("Logger initialized from library");
}

#[wasm_bindgen]
pub fn generate_stage_json(params: String) -> js_sys::Promise {
    future_to_promise(async move {
        match generate_stage_async(&params).await {
            Ok(response) => Ok(JsValue::from_str(&response)),
            Err(e) => Err(JsValue::from_str(&e)),
        }
    })
}

/// Core only: stage from an already filtered FeatureCollection.
#[wasm_bindgen]
pub fn generate_speciale_geojson(geojson: String, min_km: f64, max_km: f64) -> std::result::Result<String, JsValue> {
    let speciale = generate_speciale_json(&geojson, StageBounds { min_km, max_km })
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&speciale).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn export_stage(path: JsValue, format: String) -> std::result::Result<String, JsValue> {
    let path: Vec<Coordinate> = serde_wasm_bindgen::from_value(path)?;
    let exported = match format.as_str() {
        "geojson" => serde_json::to_string_pretty(&coords_to_geojson(&path)).ok(),
        "kml" => export::to_kml(&path),
        "gpx" => export::to_gpx(&path),
        other => return Err(JsValue::from_str(&format!("Unknown export format: {}", other))),
    };
    exported.ok_or_else(|| JsValue::from_str("Nothing to export"))
}

fn indices(values: Vec<u32>) -> Vec<usize> {
    values.into_iter().map(|i| i as usize).collect()
}

#[wasm_bindgen]
pub fn stage_waypoints(path: JsValue, intersections: Vec<u32>) -> std::result::Result<JsValue, JsValue> {
    let path: Vec<Coordinate> = serde_wasm_bindgen::from_value(path)?;
    let waypoints = stats::pk_waypoints(&path, &indices(intersections));
    Ok(serde_wasm_bindgen::to_value(&waypoints)?)
}

#[wasm_bindgen]
pub fn stage_stats(
    path: JsValue,
    intersections: Vec<u32>,
    elevations: Option<Vec<f64>>,
) -> std::result::Result<JsValue, JsValue> {
    let path: Vec<Coordinate> = serde_wasm_bindgen::from_value(path)?;
    let summary = stats::stage_stats(&path, &indices(intersections), elevations.as_deref());
    Ok(serde_wasm_bindgen::to_value(&summary)?)
}
