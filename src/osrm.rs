//! OSRM HTTP adapter for point-to-point routes.

use serde::Deserialize;
use tracing::debug;

use crate::config::OsrmConfig;
use crate::error::RouteError;
use crate::polyline::Polyline;
use crate::traits::{RoutePath, RoutingService};
use crate::Coordinate;

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn route_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=full&geometries=geojson",
            self.config.base_url, self.config.profile, origin.x, origin.y, destination.x, destination.y
        )
    }
}

impl RoutingService for OsrmClient {
    fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<RoutePath, RouteError> {
        let url = self.route_url(origin, destination);
        debug!(%url, "requesting OSRM route");

        let body = self
            .client
            .get(url)
            .send()?
            .json::<OsrmRouteResponse>()?;
        body.into_path()
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl OsrmRouteResponse {
    fn into_path(self) -> Result<RoutePath, RouteError> {
        if self.code != "Ok" {
            return Err(RouteError::NoRoute(
                self.message.unwrap_or_else(|| self.code.clone()),
            ));
        }
        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RouteError::NoRoute("response contained no routes".to_string()))?;

        let points = route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lon, lat]| Coordinate { x: lon, y: lat })
            .collect();
        Ok(RoutePath {
            polyline: Polyline::new(points),
            distance_meters: route.distance,
            duration_seconds: route.duration,
        })
    }
}
