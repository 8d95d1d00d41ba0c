//! Error taxonomy for route computation.
//!
//! Stale (superseded) results are not errors and have no variant here: the
//! coordinator drops them before they can reach any observer.

use serde::Deserialize;
use thiserror::Error;

/// Input rejected before any network call is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("At least 2 coordinates are required, got {count}")]
    TooFewCoordinates { count: usize },

    #[error("Coordinate {index} is out of range: [{lon}, {lat}]")]
    InvalidCoordinate { index: usize, lon: f64, lat: f64 },
}

/// Failure of a single route fetch. Each coordinator slot holds its own.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unable to reach the routing service. Check your connection and try again.")]
    Network,

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("No route found between the given points")]
    NoRouteFound,

    #[error("Malformed routing response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for RouteError {
    fn from(err: reqwest::Error) -> Self {
        tracing::warn!("Routing transport failure: {}", err);
        RouteError::Network
    }
}

/// Explanatory payload some providers attach to failed responses.
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamErrorPayload {
    pub code: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl UpstreamErrorPayload {
    /// Builds the slot error for an upstream failure, preferring the
    /// provider's own wording over a bare status code.
    pub fn into_route_error(self, status: u16) -> RouteError {
        if self.code.as_deref() == Some("NoRoute") {
            return RouteError::NoRouteFound;
        }

        let detail = self.message.or(self.error).filter(|text| !text.is_empty());
        let message = match (self.code, detail) {
            (Some(code), Some(detail)) => format!("{code}: {detail}"),
            (None, Some(detail)) => detail,
            (Some(code), None) => format!("Routing request failed ({code}, status {status})"),
            (None, None) => format!("Routing request failed with status {status}"),
        };

        RouteError::Upstream { status, message }
    }
}

/// Maps a non-success response body to a [`RouteError`].
pub fn upstream_error(status: u16, body: &str) -> RouteError {
    serde_json::from_str::<UpstreamErrorPayload>(body)
        .unwrap_or_default()
        .into_route_error(status)
}
