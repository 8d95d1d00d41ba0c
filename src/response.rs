//! Route response payloads.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coordinate::Coordinate;
use crate::polyline::{self, Precision};
use crate::request::GeometryFormat;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    /// Provider status code, `"Ok"` on success when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default)]
    pub routes: Vec<RouteResult>,

    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
}

impl RouteResponse {
    /// The route the speed pipeline works on. Alternatives are ignored.
    pub fn primary(&self) -> Option<&RouteResult> {
        self.routes.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,

    #[serde(default)]
    pub legs: Vec<Leg>,
}

impl RouteResult {
    /// Decodes this route's overview geometry. Empty when absent or corrupt.
    pub fn coordinates(&self, format: GeometryFormat) -> Vec<Coordinate> {
        self.geometry
            .as_ref()
            .map(|geometry| geometry.decode(format))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub distance: f64,
    pub duration: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

/// The finest level of detail available for a leg.
///
/// Speed extraction always uses the first available of: steps, then
/// per-segment annotation, then the leg totals. [`Leg::detail`] is the single
/// place that order is decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegDetail<'a> {
    Steps(&'a [Step]),
    Annotation(&'a Annotation),
    Whole { distance: f64, duration: f64 },
}

impl Leg {
    pub fn detail(&self) -> LegDetail<'_> {
        if !self.steps.is_empty() {
            return LegDetail::Steps(&self.steps);
        }

        match &self.annotation {
            Some(annotation) if annotation.has_segments() => LegDetail::Annotation(annotation),
            _ => LegDetail::Whole {
                distance: self.distance,
                duration: self.duration,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub distance: f64,
    pub duration: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Per-segment metadata between consecutive geometry points of a leg.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub distance: Vec<f64>,
    #[serde(default)]
    pub duration: Vec<f64>,
}

impl Annotation {
    pub fn has_segments(&self) -> bool {
        !self.distance.is_empty() && !self.duration.is_empty()
    }

    /// `(distance, duration)` pairs; a length mismatch truncates to the shorter.
    pub fn segments(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.distance
            .iter()
            .copied()
            .zip(self.duration.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub location: Coordinate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Snapping distance from the requested coordinate, meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Route or step geometry as shipped by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Geometry {
    Encoded(String),
    GeoJson(LineString),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    pub coordinates: Vec<Coordinate>,
}

impl Geometry {
    /// Decodes according to the requested `format`.
    ///
    /// GeoJSON bypasses the polyline codec; it is accepted both inline and as
    /// a JSON document carried in a string. Any failure, including an
    /// out-of-range coordinate, yields an empty sequence.
    pub fn decode(&self, format: GeometryFormat) -> Vec<Coordinate> {
        let coordinates = match (self, format) {
            (Geometry::GeoJson(line), _) => line.coordinates.clone(),
            (Geometry::Encoded(text), GeometryFormat::GeoJson) => {
                match serde_json::from_str::<LineString>(text) {
                    Ok(line) => line.coordinates,
                    Err(err) => {
                        debug!("Discarding unparsable GeoJSON geometry: {}", err);
                        return Vec::new();
                    }
                }
            }
            (Geometry::Encoded(text), GeometryFormat::Polyline) => {
                return polyline::decode(text, Precision::Five);
            }
            (Geometry::Encoded(text), GeometryFormat::Polyline6) => {
                return polyline::decode(text, Precision::Six);
            }
        };

        if coordinates.iter().all(Coordinate::is_valid) {
            coordinates
        } else {
            Vec::new()
        }
    }
}
