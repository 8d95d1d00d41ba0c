//! Debounced, last-write-wins route computation.
//!
//! [`RequestCoordinator`] turns a stream of (waypoints, config) inputs into
//! at most one current computation. Each debounced input that fires is
//! stamped with a fresh [`RequestToken`]; the baseline fetch and the optional
//! traffic fetch run concurrently and each writes its own [`Slot`] when it
//! settles, but only if its token is still the latest one issued. Superseded
//! outcomes are dropped without a trace in the observable state.
//!
//! In-flight network calls are never aborted: staleness is detected when a
//! call settles.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::coordinate::Coordinate;
use crate::debounce::DelayedTask;
use crate::error::{RouteError, ValidationError};
use crate::request::{RouteConfig, RouteRequest, RoutingEngine};
use crate::response::RouteResponse;
use crate::speed::RouteComparison;
use crate::traits::RouteFetcher;

/// Identifies one issued computation. Strictly increasing per coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Baseline,
    Traffic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlotPhase {
    #[default]
    Idle,
    Debouncing,
    InFlight,
    Resolved,
    Errored,
}

/// Latest applied outcome for one kind of route.
#[derive(Debug, Clone, Default)]
pub struct Slot {
    pub phase: SlotPhase,
    pub response: Option<Arc<RouteResponse>>,
    pub error: Option<RouteError>,
}

impl Slot {
    pub fn is_loading(&self) -> bool {
        self.phase == SlotPhase::InFlight
    }

    fn resolve(&mut self, response: RouteResponse) {
        self.phase = SlotPhase::Resolved;
        self.response = Some(Arc::new(response));
        self.error = None;
    }

    fn fail(&mut self, error: RouteError) {
        self.phase = SlotPhase::Errored;
        self.response = None;
        self.error = Some(error);
    }
}

/// Everything the coordinator exposes to observers.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorState {
    /// Latest issued token.
    pub token: RequestToken,
    /// The request the slots currently belong to.
    pub request: Option<RouteRequest>,
    pub baseline: Slot,
    pub traffic: Slot,
    /// Wall-clock time of the latest current baseline call.
    pub baseline_elapsed: Option<Duration>,
}

impl CoordinatorState {
    pub fn slot(&self, kind: SlotKind) -> &Slot {
        match kind {
            SlotKind::Baseline => &self.baseline,
            SlotKind::Traffic => &self.traffic,
        }
    }

    fn slot_mut(&mut self, kind: SlotKind) -> &mut Slot {
        match kind {
            SlotKind::Baseline => &mut self.baseline,
            SlotKind::Traffic => &mut self.traffic,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.baseline.is_loading() || self.traffic.is_loading()
    }

    /// Speed comparison built from the primary route of each slot.
    pub fn comparison(&self) -> RouteComparison {
        RouteComparison::from_routes(
            self.baseline.response.as_deref().and_then(RouteResponse::primary),
            self.traffic.response.as_deref().and_then(RouteResponse::primary),
        )
    }

    /// Decoded geometry of the primary baseline route, empty if unavailable.
    pub fn baseline_geometry(&self) -> Vec<Coordinate> {
        let format = self
            .request
            .as_ref()
            .map(|request| request.config().geometry_format())
            .unwrap_or_default();

        self.baseline
            .response
            .as_deref()
            .and_then(RouteResponse::primary)
            .map(|route| route.coordinates(format))
            .unwrap_or_default()
    }
}

/// When [`RequestCoordinator::schedule_with_policy`] asks for a traffic route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrafficPolicy {
    #[default]
    Always,
    Never,
    /// Only when the baseline config pins neither vehicle nor engine.
    WhenUnconstrained,
}

impl TrafficPolicy {
    pub fn should_compare(self, config: &RouteConfig) -> bool {
        match self {
            TrafficPolicy::Always => true,
            TrafficPolicy::Never => false,
            TrafficPolicy::WhenUnconstrained => config.is_unconstrained(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    pub debounce: Duration,
    /// Engine used for the traffic-adjusted route.
    pub traffic_engine: RoutingEngine,
    pub traffic_policy: TrafficPolicy,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            traffic_engine: RoutingEngine::TomTom,
            traffic_policy: TrafficPolicy::Always,
        }
    }
}

pub struct RequestCoordinator<F> {
    fetcher: Arc<F>,
    state: Arc<watch::Sender<CoordinatorState>>,
    pending: DelayedTask,
    options: CoordinatorOptions,
}

impl<F: RouteFetcher> RequestCoordinator<F> {
    pub fn new(fetcher: F, options: CoordinatorOptions) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            state: Arc::new(watch::Sender::new(CoordinatorState::default())),
            pending: DelayedTask::new(),
            options,
        }
    }

    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> CoordinatorState {
        self.state.borrow().clone()
    }

    /// Schedules a computation for `coordinates` after `debounce`.
    ///
    /// Any computation still waiting out its debounce is cancelled. Invalid
    /// input clears the displayed result immediately, invalidates everything
    /// in flight, and issues no network call.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(
        &mut self,
        coordinates: Vec<Coordinate>,
        config: RouteConfig,
        debounce: Duration,
        compare_traffic: bool,
    ) -> Result<(), ValidationError> {
        self.pending.cancel();

        let request = match RouteRequest::new(coordinates, config) {
            Ok(request) => request,
            Err(err) => {
                debug!("Not routing: {}", err);
                self.clear();
                return Err(err);
            }
        };

        self.state.send_modify(|state| {
            state.baseline.phase = SlotPhase::Debouncing;
            if compare_traffic {
                state.traffic.phase = SlotPhase::Debouncing;
            }
        });

        let fetcher = Arc::clone(&self.fetcher);
        let state = Arc::clone(&self.state);
        let traffic_engine = compare_traffic.then_some(self.options.traffic_engine);

        self.pending.schedule(debounce, async move {
            issue(fetcher, state, request, traffic_engine).await;
        });

        Ok(())
    }

    /// [`schedule`](Self::schedule) with the configured debounce and traffic policy.
    pub fn schedule_with_policy(
        &mut self,
        coordinates: Vec<Coordinate>,
        config: RouteConfig,
    ) -> Result<(), ValidationError> {
        let compare_traffic = self.options.traffic_policy.should_compare(&config);
        let debounce = self.options.debounce;
        self.schedule(coordinates, config, debounce, compare_traffic)
    }

    /// Drops the displayed result and makes every in-flight call stale.
    pub fn clear(&mut self) {
        self.pending.cancel();
        self.state.send_modify(|state| {
            let token = state.token.next();
            *state = CoordinatorState {
                token,
                ..CoordinatorState::default()
            };
        });
    }
}

async fn issue<F: RouteFetcher>(
    fetcher: Arc<F>,
    state: Arc<watch::Sender<CoordinatorState>>,
    request: RouteRequest,
    traffic_engine: Option<RoutingEngine>,
) {
    let mut token = RequestToken::default();
    state.send_modify(|current| {
        current.token = current.token.next();
        token = current.token;
        current.request = Some(request.clone());
        current.baseline.phase = SlotPhase::InFlight;
        current.baseline_elapsed = None;
        if traffic_engine.is_some() {
            current.traffic.phase = SlotPhase::InFlight;
        } else {
            current.traffic = Slot::default();
        }
    });

    info!(
        "Issuing route request {} over {} coordinates{}",
        token,
        request.coordinates().len(),
        if traffic_engine.is_some() { " with traffic comparison" } else { "" }
    );

    let baseline = async {
        let started = Instant::now();
        let outcome = fetcher.fetch_route(&request).await;
        settle(&state, token, SlotKind::Baseline, outcome, Some(started.elapsed()));
    };

    match traffic_engine {
        Some(engine) => {
            let traffic_request = request.traffic_variant(engine, Timestamp::now());
            let traffic = async {
                let outcome = fetcher.fetch_route(&traffic_request).await;
                settle(&state, token, SlotKind::Traffic, outcome, None);
            };
            tokio::join!(baseline, traffic);
        }
        None => baseline.await,
    }
}

fn settle(
    state: &watch::Sender<CoordinatorState>,
    token: RequestToken,
    kind: SlotKind,
    outcome: Result<RouteResponse, RouteError>,
    elapsed: Option<Duration>,
) {
    let applied = state.send_if_modified(|current| {
        if current.token != token {
            return false;
        }

        match outcome {
            Ok(response) => {
                current.slot_mut(kind).resolve(response);
                if kind == SlotKind::Baseline {
                    current.baseline_elapsed = elapsed;
                }
            }
            Err(err) => {
                warn!("{:?} route for request {} failed: {}", kind, token, err);
                current.slot_mut(kind).fail(err);
            }
        }
        true
    });

    if !applied {
        debug!("Dropping superseded {:?} outcome of request {}", kind, token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::VehicleType;

    #[test]
    fn test_token_order() {
        let first = RequestToken::default().next();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.get(), 2);
        assert_eq!(second.to_string(), "#2");
    }

    #[test]
    fn test_traffic_policy() {
        let unconstrained = RouteConfig::default();
        let pinned = RouteConfig {
            vehicle_type: Some(VehicleType::Truck),
            ..RouteConfig::default()
        };

        assert!(TrafficPolicy::Always.should_compare(&pinned));
        assert!(!TrafficPolicy::Never.should_compare(&unconstrained));
        assert!(TrafficPolicy::WhenUnconstrained.should_compare(&unconstrained));
        assert!(!TrafficPolicy::WhenUnconstrained.should_compare(&pinned));
    }

    #[test]
    fn test_slot_transitions() {
        let mut slot = Slot::default();
        assert_eq!(slot.phase, SlotPhase::Idle);

        slot.resolve(RouteResponse {
            code: None,
            message: None,
            routes: Vec::new(),
            waypoints: Vec::new(),
        });
        assert_eq!(slot.phase, SlotPhase::Resolved);
        assert!(slot.response.is_some());

        slot.fail(RouteError::Network);
        assert_eq!(slot.phase, SlotPhase::Errored);
        assert!(slot.response.is_none());
        assert_eq!(slot.error, Some(RouteError::Network));
    }

    #[test]
    fn test_empty_state_derivations() {
        let state = CoordinatorState::default();
        assert!(!state.is_loading());
        assert!(state.baseline_geometry().is_empty());
        assert_eq!(state.comparison().series.len(), 1);
        assert!(!state.comparison().has_traffic());
    }
}
