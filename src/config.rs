//! Tunables for the navigation core and the OSRM adapter.

use serde::Deserialize;

/// Default tolerance band around a parcel boundary, in meters.
pub const DEFAULT_BUFFER_METERS: f64 = 20.0;

/// Minimum movement before a new position fix is accepted, in meters.
pub const DEFAULT_MIN_MOVEMENT_METERS: f64 = 150.0;

/// Distances to the centroid closer than this are treated as ties.
pub const DEFAULT_TIE_TOLERANCE_METERS: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Width of the band extruded around the boundary line.
    pub buffer_meters: f64,
    /// Fixes within this distance of the last accepted one are ignored.
    pub min_movement_meters: f64,
    /// Tie window for the nearest-to-centroid access point policy.
    pub tie_tolerance_meters: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            buffer_meters: DEFAULT_BUFFER_METERS,
            min_movement_meters: DEFAULT_MIN_MOVEMENT_METERS,
            tie_tolerance_meters: DEFAULT_TIE_TOLERANCE_METERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

impl OsrmConfig {
    /// Defaults overridden by `OSRM_URL`, `OSRM_PROFILE` and `OSRM_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("OSRM_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(profile) = std::env::var("OSRM_PROFILE") {
            config.profile = profile;
        }
        if let Some(secs) = std::env::var("OSRM_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
        {
            config.timeout_secs = secs;
        }
        config
    }
}
