//! Canned routing responses.

use route_profile::coordinate::Coordinate;
use route_profile::polyline::{Precision, encode};
use route_profile::response::{Geometry, Leg, RouteResponse, RouteResult, Step, Waypoint};

/// Single-leg route with one step per `(distance, duration)` pair.
pub fn route_with_steps(waypoints: &[Coordinate], steps: &[(f64, f64)]) -> RouteResponse {
    let distance = steps.iter().map(|(distance, _)| distance).sum();
    let duration = steps.iter().map(|(_, duration)| duration).sum();

    RouteResponse {
        code: Some("Ok".to_string()),
        message: None,
        routes: vec![RouteResult {
            distance,
            duration,
            geometry: Some(Geometry::Encoded(encode(waypoints, Precision::Five))),
            legs: vec![Leg {
                distance,
                duration,
                summary: None,
                steps: steps
                    .iter()
                    .map(|&(distance, duration)| Step {
                        distance,
                        duration,
                        geometry: None,
                        name: None,
                    })
                    .collect(),
                annotation: None,
            }],
        }],
        waypoints: waypoints
            .iter()
            .map(|&location| Waypoint {
                location,
                name: None,
                distance: None,
                hint: None,
            })
            .collect(),
    }
}

/// Single-leg route without finer detail.
pub fn simple_route(waypoints: &[Coordinate], distance: f64, duration: f64) -> RouteResponse {
    route_with_steps(waypoints, &[(distance, duration)])
}

/// Same route as JSON text, as the provider would send it.
pub fn route_json(waypoints: &[Coordinate], distance: f64, duration: f64) -> String {
    serde_json::to_string(&simple_route(waypoints, distance, duration)).unwrap_or_default()
}
