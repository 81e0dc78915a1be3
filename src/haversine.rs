//! Great-circle distance and a straight-line routing fallback.
//!
//! `HaversineRouter` ignores roads entirely. It is useful when OSRM is
//! unavailable and as a deterministic router in tests.

use crate::error::RouteError;
use crate::polyline::Polyline;
use crate::traits::{RoutePath, RoutingService};
use crate::Coordinate;

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Geodesic distance between two lon/lat coordinates in meters.
pub fn haversine_meters(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.y.to_radians();
    let lat2_rad = to.y.to_radians();
    let delta_lat = (to.y - from.y).to_radians();
    let delta_lng = (to.x - from.x).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Routes as the crow flies between origin and destination.
#[derive(Debug, Clone)]
pub struct HaversineRouter {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineRouter {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineRouter {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    fn meters_to_seconds(&self, meters: f64) -> f64 {
        let hours = meters / 1000.0 / self.speed_kmh;
        hours * 3600.0
    }
}

impl RoutingService for HaversineRouter {
    fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<RoutePath, RouteError> {
        let meters = haversine_meters(origin, destination);
        Ok(RoutePath {
            polyline: Polyline::new(vec![origin, destination]),
            distance_meters: meters,
            duration_seconds: self.meters_to_seconds(meters),
        })
    }
}
