//! Real Las Vegas / Henderson locations for route fixtures.
//!
//! Coordinates sourced from OpenStreetMap.

use route_profile::coordinate::Coordinate;

/// A named location.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub name: &'static str,
    pub lon: f64,
    pub lat: f64,
}

impl Location {
    pub const fn new(name: &'static str, lon: f64, lat: f64) -> Self {
        Self { name, lon, lat }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lon, self.lat)
    }
}

pub const BELLAGIO: Location = Location::new("Bellagio", -115.1767, 36.1126);
pub const WYNN: Location = Location::new("Wynn Las Vegas", -115.1658180, 36.1263781);
pub const MGM_GRAND: Location = Location::new("MGM Grand", -115.1688720, 36.1023654);
pub const FREMONT_STREET: Location = Location::new("Fremont Street", -115.1428, 36.1707);
pub const HENDERSON_CITY_HALL: Location =
    Location::new("Henderson City Hall", -114.9817, 36.0303);

/// Strip tour: Bellagio → Wynn.
pub fn strip_pair() -> Vec<Coordinate> {
    vec![BELLAGIO.coordinate(), WYNN.coordinate()]
}

/// Downtown → Henderson via MGM Grand.
pub fn cross_town() -> Vec<Coordinate> {
    vec![
        FREMONT_STREET.coordinate(),
        MGM_GRAND.coordinate(),
        HENDERSON_CITY_HALL.coordinate(),
    ]
}
