//! Route request body sent to the routing provider.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::coordinate::{Coordinate, validate_waypoints};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    Car,
    Bike,
    Truck,
    ElectricCar,
    ElectricBike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoutingEngine {
    Osm,
    TomTom,
    Google,
    AnyMap,
}

/// How route geometry is encoded in the response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryFormat {
    /// Encoded path, 5 decimal digits.
    #[default]
    Polyline,
    /// Encoded path, 6 decimal digits.
    Polyline6,
    /// Inline `{ "coordinates": [[lon, lat], ...] }`.
    GeoJson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overview {
    Full,
    Simplified,
    False,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Snapping {
    Default,
    Any,
}

/// Per-request options. Every field is optional and omitted from the body
/// when unset so the provider applies its own default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<VehicleType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_engine: Option<RoutingEngine>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometries: Option<GeometryFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<Overview>,

    #[serde(rename = "continue_straight", skip_serializing_if = "Option::is_none")]
    pub continue_straight: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapping: Option<Snapping>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpolate: Option<bool>,

    #[serde(rename = "generate_hints", skip_serializing_if = "Option::is_none")]
    pub generate_hints: Option<bool>,
}

impl RouteConfig {
    pub fn geometry_format(&self) -> GeometryFormat {
        self.geometries.unwrap_or_default()
    }

    /// True when the caller pinned neither a vehicle class nor an engine.
    pub fn is_unconstrained(&self) -> bool {
        self.vehicle_type.is_none() && self.routing_engine.is_none()
    }
}

/// A validated, immutable request for one route computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRequest {
    coordinates: Vec<Coordinate>,
    #[serde(flatten)]
    config: RouteConfig,
}

impl RouteRequest {
    pub fn new(coordinates: Vec<Coordinate>, config: RouteConfig) -> Result<Self, ValidationError> {
        validate_waypoints(&coordinates)?;
        Ok(Self {
            coordinates,
            config,
        })
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    /// Same waypoints routed through a traffic-capable engine, departing `now`.
    pub fn traffic_variant(&self, engine: RoutingEngine, now: Timestamp) -> Self {
        let mut config = self.config.clone();
        config.routing_engine = Some(engine);
        config.departure_time = Some(now);

        Self {
            coordinates: self.coordinates.clone(),
            config,
        }
    }
}
