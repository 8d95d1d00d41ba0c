//! Geographic coordinates as exchanged with the routing provider.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A (longitude, latitude) pair in degrees.
///
/// Serialized as a `[lon, lat]` array, the order the routing provider
/// expects on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Returns true when both components are finite and inside
    /// `[-180, 180]` / `[-90, 90]`.
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(coordinate: Coordinate) -> Self {
        [coordinate.lon, coordinate.lat]
    }
}

/// Checks that a waypoint chain is routable: at least two points, all in range.
pub fn validate_waypoints(coordinates: &[Coordinate]) -> Result<(), ValidationError> {
    if coordinates.len() < 2 {
        return Err(ValidationError::TooFewCoordinates {
            count: coordinates.len(),
        });
    }

    if let Some((index, invalid)) = coordinates
        .iter()
        .enumerate()
        .find(|(_, coordinate)| !coordinate.is_valid())
    {
        return Err(ValidationError::InvalidCoordinate {
            index,
            lon: invalid.lon,
            lat: invalid.lat,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Coordinate::new(-180.0, -90.0).is_valid());
        assert!(Coordinate::new(180.0, 90.0).is_valid());
        assert!(!Coordinate::new(180.1, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -90.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_wire_order_is_lon_lat() {
        let coordinate = Coordinate::new(-115.1728, 36.1147);
        let json = serde_json::to_string(&coordinate).unwrap();
        assert_eq!(json, "[-115.1728,36.1147]");

        let parsed: Coordinate = serde_json::from_str("[4.35, 50.85]").unwrap();
        assert_eq!(parsed, Coordinate::new(4.35, 50.85));
    }

    #[test]
    fn test_validate_requires_two_points() {
        let err = validate_waypoints(&[Coordinate::new(0.0, 0.0)]).unwrap_err();
        assert_eq!(err, ValidationError::TooFewCoordinates { count: 1 });
        assert!(validate_waypoints(&[]).is_err());
    }

    #[test]
    fn test_validate_reports_first_invalid_index() {
        let coordinates = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(200.0, 1.0),
        ];
        let err = validate_waypoints(&coordinates).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidCoordinate { index: 2, .. }
        ));
    }
}
