use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use route_profile::client::{ClientConfig, RoutingClient};
use route_profile::coordinate::Coordinate;
use route_profile::coordinator::{
    CoordinatorOptions, CoordinatorState, RequestCoordinator, SlotPhase, TrafficPolicy,
};
use route_profile::locator::locate;
use route_profile::request::{GeometryFormat, Overview, RouteConfig, RoutingEngine, VehicleType};
use route_profile::speed::RouteComparison;

/// Fetch a route and compare its speed profile against live traffic
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Waypoints as "lon,lat;lon,lat;..."
    #[arg(short, long, value_parser = parse_coordinates)]
    coords: Waypoints,

    /// Vehicle class (car, bike, truck, electric_car, electric_bike)
    #[arg(long, value_parser = parse_upper::<VehicleType>)]
    vehicle: Option<VehicleType>,

    /// Routing engine (osm, tomtom, google, anymap)
    #[arg(long, value_parser = parse_upper::<RoutingEngine>)]
    engine: Option<RoutingEngine>,

    /// Geometry encoding (polyline, polyline6, geojson)
    #[arg(long, value_parser = parse_lower::<GeometryFormat>)]
    geometries: Option<GeometryFormat>,

    /// Also fetch a traffic-adjusted route for comparison
    #[arg(long)]
    traffic: bool,

    /// Engine used for the traffic-adjusted route
    #[arg(long, value_parser = parse_upper::<RoutingEngine>, default_value = "tomtom")]
    traffic_engine: RoutingEngine,

    #[arg(long, default_value_t = 0)]
    debounce_ms: u64,

    /// Report the route coordinate closest to this distance, in meters
    #[arg(long)]
    at: Option<f64>,

    /// Routing service base URL (overrides ROUTING_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Waypoints(Vec<Coordinate>);

fn parse_coordinates(value: &str) -> Result<Waypoints, String> {
    value
        .split(';')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| {
            let (lon, lat) = pair
                .split_once(',')
                .ok_or_else(|| format!("expected lon,lat but got {pair:?}"))?;
            let lon = lon.trim().parse::<f64>().map_err(|err| err.to_string())?;
            let lat = lat.trim().parse::<f64>().map_err(|err| err.to_string())?;
            Ok(Coordinate::new(lon, lat))
        })
        .collect::<Result<Vec<_>, String>>()
        .map(Waypoints)
}

fn parse_upper<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.to_uppercase()))
        .map_err(|err| err.to_string())
}

fn parse_lower<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .map_err(|err| err.to_string())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    request: u64,
    distance_m: Option<f64>,
    duration_s: Option<f64>,
    traffic_duration_s: Option<f64>,
    elapsed_ms: Option<u128>,
    baseline_error: Option<String>,
    traffic_error: Option<String>,
    comparison: RouteComparison,
    located: Option<Coordinate>,
}

impl Report {
    fn new(state: &CoordinatorState, at: Option<f64>) -> Self {
        let baseline = state.baseline.response.as_ref().and_then(|r| r.primary());
        let traffic = state.traffic.response.as_ref().and_then(|r| r.primary());
        let geometry = state.baseline_geometry();

        Self {
            request: state.token.get(),
            distance_m: baseline.map(|route| route.distance),
            duration_s: baseline.map(|route| route.duration),
            traffic_duration_s: traffic.map(|route| route.duration),
            elapsed_ms: state.baseline_elapsed.map(|elapsed| elapsed.as_millis()),
            baseline_error: state.baseline.error.as_ref().map(ToString::to_string),
            traffic_error: state.traffic.error.as_ref().map(ToString::to_string),
            comparison: state.comparison(),
            located: at.and_then(|distance| locate(&geometry, distance)),
        }
    }
}

fn is_settled(state: &CoordinatorState) -> bool {
    matches!(state.baseline.phase, SlotPhase::Resolved | SlotPhase::Errored)
        && !matches!(state.traffic.phase, SlotPhase::Debouncing | SlotPhase::InFlight)
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let mut client_config = ClientConfig::from_env();
    if let Some(base_url) = cli.base_url {
        client_config.base_url = base_url;
    }
    info!("Routing through {}", client_config.route_url());
    let client = RoutingClient::new(client_config).context("building HTTP client")?;

    let options = CoordinatorOptions {
        debounce: std::time::Duration::from_millis(cli.debounce_ms),
        traffic_engine: cli.traffic_engine,
        traffic_policy: if cli.traffic {
            TrafficPolicy::Always
        } else {
            TrafficPolicy::Never
        },
    };

    let config = RouteConfig {
        vehicle_type: cli.vehicle,
        routing_engine: cli.engine,
        geometries: cli.geometries,
        steps: Some(true),
        overview: Some(Overview::Full),
        ..RouteConfig::default()
    };

    let mut coordinator = RequestCoordinator::new(client, options);
    let mut updates = coordinator.subscribe();
    coordinator.schedule_with_policy(cli.coords.0, config)?;

    let state = updates
        .wait_for(is_settled)
        .await
        .context("coordinator stopped before the route settled")?
        .clone();

    let report = Report::new(&state, cli.at);
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
