//! Planar predicates on lon/lat coordinates and great-circle distances.
//!
//! The predicates work directly in degrees, so their tolerances are tuned for
//! geographic coordinates and are not scale-independent.

use crate::types::Coordinate;

const PARALLEL_EPSILON: f64 = 1e-10;
// Crossings this close to either end of a segment are treated as shared endpoints.
const ENDPOINT_MARGIN: f64 = 0.05;
const ALIGNMENT_EPSILON: f64 = 1e-6;
pub const NEAR_SEGMENT_TOLERANCE: f64 = 0.0001;

/// True when segment `p1-p2` crosses segment `p3-p4` away from their ends.
pub fn segments_intersect(p1: Coordinate, p2: Coordinate, p3: Coordinate, p4: Coordinate) -> bool {
    let (x1, y1) = (p1.lon, p1.lat);
    let (x2, y2) = (p2.lon, p2.lat);
    let (x3, y3) = (p3.lon, p3.lat);
    let (x4, y4) = (p4.lon, p4.lat);

    let denom = (y4 - y3) * (x2 - x1) - (x4 - x3) * (y2 - y1);
    if denom.abs() < PARALLEL_EPSILON {
        return false;
    }

    let ua = ((x4 - x3) * (y1 - y3) - (y4 - y3) * (x1 - x3)) / denom;
    let ub = ((x2 - x1) * (y1 - y3) - (y2 - y1) * (x1 - x3)) / denom;

    let inside = |t: f64| t > ENDPOINT_MARGIN && t < 1.0 - ENDPOINT_MARGIN;
    inside(ua) && inside(ub)
}

/// Coarse proximity filter: is `point` inside the segment's bounding box grown by `tolerance`?
///
/// This is not a point-to-segment distance.
pub fn is_near_segment(point: Coordinate, segment: [Coordinate; 2], tolerance: f64) -> bool {
    let [a, b] = segment;
    let min_x = a.lon.min(b.lon) - tolerance;
    let max_x = a.lon.max(b.lon) + tolerance;
    let min_y = a.lat.min(b.lat) - tolerance;
    let max_y = a.lat.max(b.lat) + tolerance;

    point.lon >= min_x && point.lon <= max_x && point.lat >= min_y && point.lat <= max_y
}

/// True when `a -> b -> c` continues in a straight line (raw cross product below 1e-6).
pub fn are_segments_aligned(a: Coordinate, b: Coordinate, c: Coordinate) -> bool {
    let v1 = (b.lon - a.lon, b.lat - a.lat);
    let v2 = (c.lon - b.lon, c.lat - b.lat);
    let cross = v1.0 * v2.1 - v1.1 * v2.0;
    cross.abs() < ALIGNMENT_EPSILON
}

pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let ap = haversine_rs::point::Point { latitude: a.lat, longitude: a.lon };
    let bp = haversine_rs::point::Point { latitude: b.lat, longitude: b.lon };
    haversine_rs::distance(ap, bp, haversine_rs::units::Unit::Meters) / 1000.0
}

/// Sum of the great-circle distances between consecutive coordinates.
pub fn path_length_km(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|w| distance_km(w[0], w[1])).sum()
}
