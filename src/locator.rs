//! Maps a distance along a decoded route back to a coordinate.
//!
//! Used to keep a map cursor on the point matching a hovered distance in the
//! speed chart. The default planar metric treats a degree as 111 km in both
//! axes, which is good enough at city or country scale.

use crate::coordinate::Coordinate;

/// Meters per degree used by the planar approximation.
const METERS_PER_DEGREE: f64 = 111_000.0;

/// Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistanceMetric {
    /// `sqrt(dlat² + dlon²) * 111 km`.
    #[default]
    Planar,
    /// Great-circle distance.
    Haversine,
}

impl DistanceMetric {
    /// Distance between two coordinates in meters.
    pub fn between(self, from: Coordinate, to: Coordinate) -> f64 {
        match self {
            DistanceMetric::Planar => planar_m(from, to),
            DistanceMetric::Haversine => haversine_m(from, to),
        }
    }
}

fn planar_m(from: Coordinate, to: Coordinate) -> f64 {
    let delta_lat = to.lat - from.lat;
    let delta_lon = to.lon - from.lon;
    (delta_lat * delta_lat + delta_lon * delta_lon).sqrt() * METERS_PER_DEGREE
}

fn haversine_m(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Running distance from the first coordinate to each coordinate.
pub fn cumulative_distances(coordinates: &[Coordinate], metric: DistanceMetric) -> Vec<f64> {
    let mut total = 0.0;
    let mut distances = Vec::with_capacity(coordinates.len());

    for (index, coordinate) in coordinates.iter().enumerate() {
        if index > 0 {
            total += metric.between(coordinates[index - 1], *coordinate);
        }
        distances.push(total);
    }

    distances
}

/// Coordinate whose cumulative planar distance is closest to `target`.
///
/// Ties resolve to the earlier coordinate. `None` for an empty path.
pub fn locate(coordinates: &[Coordinate], target: f64) -> Option<Coordinate> {
    locate_with(coordinates, target, DistanceMetric::Planar)
}

pub fn locate_with(
    coordinates: &[Coordinate],
    target: f64,
    metric: DistanceMetric,
) -> Option<Coordinate> {
    let distances = cumulative_distances(coordinates, metric);

    let mut best: Option<(usize, f64)> = None;
    for (index, distance) in distances.iter().enumerate() {
        let gap = (distance - target).abs();
        if best.is_none_or(|(_, best_gap)| gap < best_gap) {
            best = Some((index, gap));
        }
    }

    best.map(|(index, _)| coordinates[index])
}
