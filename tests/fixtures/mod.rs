//! Test fixtures for route-profile.
//!
//! Provides:
//! - Real Las Vegas / Henderson locations (from OpenStreetMap)
//! - Canned route responses

#![allow(dead_code)]

pub mod las_vegas_locations;
pub mod routes;

pub use las_vegas_locations::*;
pub use routes::*;
