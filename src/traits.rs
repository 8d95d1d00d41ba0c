//! Seams between the route pipeline and the outside world.

use std::future::Future;

use crate::error::RouteError;
use crate::request::RouteRequest;
use crate::response::RouteResponse;

/// Computes routes for a request. The coordinator only ever talks to the
/// routing provider through this trait.
///
/// Implementations report connectivity failures as [`RouteError::Network`],
/// non-success provider responses as [`RouteError::Upstream`], and a valid
/// response without any route as [`RouteError::NoRouteFound`].
pub trait RouteFetcher: Send + Sync + 'static {
    fn fetch_route(
        &self,
        request: &RouteRequest,
    ) -> impl Future<Output = Result<RouteResponse, RouteError>> + Send;
}

/// Adapts a closure into a [`RouteFetcher`].
pub struct FnFetcher<F>(pub F);

impl<F, Fut> RouteFetcher for FnFetcher<F>
where
    F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RouteResponse, RouteError>> + Send,
{
    fn fetch_route(
        &self,
        request: &RouteRequest,
    ) -> impl Future<Output = Result<RouteResponse, RouteError>> + Send {
        (self.0)(request.clone())
    }
}
