use serde::Serialize;

use crate::geometry::{distance_km, path_length_km};
use crate::types::Coordinate;

/// A PK marker: a notable point of the stage and how far into it it lies.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Waypoint {
    pub label: String,
    pub index: usize,
    pub coordinate: Coordinate,
    pub distance_km: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ElevationStats {
    pub min: f64,
    pub max: f64,
    pub gain: f64,
    pub loss: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageStats {
    pub length_km: f64,
    pub intersections: usize,
    pub avg_distance_between_pk_km: f64,
    pub elevation: ElevationStats,
    pub avg_slope_percent: f64,
}

/// A PK marker at each intersection index, with the distance driven to reach it.
///
/// The PK number is that distance in hundreds of metres: PK11 lies about 1.1 km in.
/// Indices outside the path are ignored.
pub fn pk_waypoints(path: &[Coordinate], intersections: &[usize]) -> Vec<Waypoint> {
    let mut cumulative = Vec::with_capacity(path.len());
    let mut total = 0.0;
    for (i, c) in path.iter().enumerate() {
        if i > 0 {
            total += distance_km(path[i - 1], *c);
        }
        cumulative.push(total);
    }

    intersections
        .iter()
        .filter(|&&idx| idx < path.len())
        .map(|&idx| Waypoint {
            label: format!("PK{}", (cumulative[idx] * 10.0).round() as u64),
            index: idx,
            coordinate: path[idx],
            distance_km: cumulative[idx],
        })
        .collect()
}

// Straight-line distances between consecutive PK points, not along the road.
fn avg_distance_between_pk(path: &[Coordinate], intersections: &[usize]) -> f64 {
    if intersections.len() < 2 {
        return 0.0;
    }
    let total: f64 = intersections
        .windows(2)
        .map(|w| distance_km(path[w[0]], path[w[1]]))
        .sum();
    total / (intersections.len() - 1) as f64
}

// Figures are reported to 2 decimals, as shown on the stage sheet.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn elevation_stats(elevations: &[f64]) -> ElevationStats {
    if elevations.is_empty() {
        return ElevationStats::default();
    }
    let min = elevations.iter().copied().fold(f64::INFINITY, f64::min);
    let max = elevations.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let (mut gain, mut loss) = (0.0, 0.0);
    for w in elevations.windows(2) {
        let diff = w[1] - w[0];
        if diff > 0.0 {
            gain += diff;
        } else {
            loss += -diff;
        }
    }

    ElevationStats {
        min,
        max,
        gain: gain.round(),
        loss: loss.round(),
    }
}

fn avg_slope_percent(path: &[Coordinate], elevations: &[f64], intersections: &[usize]) -> f64 {
    if elevations.len() < 2 || intersections.len() < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut segments = 0;
    for w in intersections.windows(2) {
        let (Some(start), Some(end)) = (elevations.get(w[0]), elevations.get(w[1])) else {
            continue;
        };
        let distance_m = distance_km(path[w[0]], path[w[1]]) * 1000.0;
        if distance_m == 0.0 {
            continue;
        }
        total += (end - start).abs() / distance_m * 100.0;
        segments += 1;
    }

    if segments > 0 {
        total / segments as f64
    } else {
        0.0
    }
}

/// Summary figures for a generated stage. `elevations`, when known, follow the path points.
pub fn stage_stats(path: &[Coordinate], intersections: &[usize], elevations: Option<&[f64]>) -> StageStats {
    if path.is_empty() {
        return StageStats::default();
    }
    let intersections: Vec<usize> = intersections.iter().copied().filter(|&i| i < path.len()).collect();
    let elevations = elevations.unwrap_or(&[]);

    StageStats {
        length_km: round2(path_length_km(path)),
        intersections: intersections.len(),
        avg_distance_between_pk_km: round2(avg_distance_between_pk(path, &intersections)),
        elevation: elevation_stats(elevations),
        avg_slope_percent: round2(avg_slope_percent(path, elevations, &intersections)),
    }
}
