//! route-profile core
//!
//! Route computation against an external routing provider, geometry
//! decoding, and speed-profile comparison between a baseline and a
//! traffic-adjusted route.

pub mod client;
pub mod coordinate;
pub mod coordinator;
pub mod debounce;
pub mod error;
pub mod locator;
pub mod polyline;
pub mod request;
pub mod response;
pub mod speed;
pub mod traits;
