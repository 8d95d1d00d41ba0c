//! HTTP adapter for the routing provider.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{RouteError, upstream_error};
use crate::request::RouteRequest;
use crate::response::RouteResponse;
use crate::traits::RouteFetcher;

const BASE_URL_ENV_VAR: &str = "ROUTING_BASE_URL";
const ROUTE_PATH_ENV_VAR: &str = "ROUTING_ROUTE_PATH";
const TIMEOUT_ENV_VAR: &str = "ROUTING_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub route_path: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            route_path: "/route".to_string(),
            timeout_secs: 10,
        }
    }
}

impl ClientConfig {
    /// Reads overrides from the environment; unset or unparsable values keep
    /// their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            base_url: std::env::var(BASE_URL_ENV_VAR).unwrap_or(defaults.base_url),
            route_path: std::env::var(ROUTE_PATH_ENV_VAR).unwrap_or(defaults.route_path),
            timeout_secs: std::env::var(TIMEOUT_ENV_VAR)
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn route_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.route_path
        )
    }
}

#[derive(Debug, Clone)]
pub struct RoutingClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl RoutingClient {
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn route(&self, request: &RouteRequest) -> Result<RouteResponse, RouteError> {
        let url = self.config.route_url();
        debug!(
            "Requesting route over {} coordinates from {}",
            request.coordinates().len(),
            url
        );

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Routing provider answered {}", status);
            return Err(upstream_error(status.as_u16(), &body));
        }

        parse_route_response(status.as_u16(), &body)
    }
}

/// Interprets a 2xx body: provider-level failure codes and empty route lists
/// are errors even when the transport succeeded.
pub fn parse_route_response(status: u16, body: &str) -> Result<RouteResponse, RouteError> {
    let response: RouteResponse = serde_json::from_str(body)
        .map_err(|err| RouteError::MalformedResponse(err.to_string()))?;

    match response.code.as_deref() {
        None | Some("Ok") => {}
        Some(_) => return Err(upstream_error(status, body)),
    }

    if response.routes.is_empty() {
        return Err(RouteError::NoRouteFound);
    }

    Ok(response)
}

impl RouteFetcher for RoutingClient {
    async fn fetch_route(&self, request: &RouteRequest) -> Result<RouteResponse, RouteError> {
        self.route(request).await
    }
}
