//! Boundary access-point resolution.
//!
//! A route "arrives" at a parcel where it crosses a thin band around the
//! parcel's boundary *line*, not where it enters the filled polygon. That
//! keeps parcels enclosed by other parcels from reporting an interior
//! destination that no road actually reaches.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{DEFAULT_BUFFER_METERS, DEFAULT_TIE_TOLERANCE_METERS, NavigatorConfig};
use crate::error::NavError;
use crate::haversine::haversine_meters;
use crate::parcel::Parcel;
use crate::planar::{BufferZone, PlanarGeometry};
use crate::routing::{Route, RouteId};
use crate::traits::GeometryService;
use crate::Coordinate;

/// The practical entry location of a parcel along a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessPoint {
    pub location: Coordinate,
    pub source_route: RouteId,
    pub distance_to_centroid_meters: f64,
}

/// Picks one crossing among several.
///
/// Candidates arrive in route traversal order.
pub trait AccessPointPolicy: fmt::Debug {
    fn choose(&self, candidates: &[Coordinate], centroid: Coordinate) -> Option<usize>;
}

/// Crossing closest (geodesically) to the parcel centroid; ties go to the
/// earliest along the route.
///
/// This is a heuristic for "most central access edge". It knows nothing
/// about road frontage and can pick a crossing on the far side of a parcel.
#[derive(Debug, Clone, Copy)]
pub struct NearestToCentroid {
    pub tie_tolerance_meters: f64,
}

impl Default for NearestToCentroid {
    fn default() -> Self {
        Self {
            tie_tolerance_meters: DEFAULT_TIE_TOLERANCE_METERS,
        }
    }
}

impl AccessPointPolicy for NearestToCentroid {
    fn choose(&self, candidates: &[Coordinate], centroid: Coordinate) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, candidate) in candidates.iter().enumerate() {
            let distance = haversine_meters(*candidate, centroid);
            match best {
                Some((_, best_distance)) if distance >= best_distance - self.tie_tolerance_meters => {}
                _ => best = Some((index, distance)),
            }
        }
        best.map(|(index, _)| index)
    }
}

/// The first crossing along the route.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstAlongRoute;

impl AccessPointPolicy for FirstAlongRoute {
    fn choose(&self, candidates: &[Coordinate], _centroid: Coordinate) -> Option<usize> {
        (!candidates.is_empty()).then_some(0)
    }
}

#[derive(Debug)]
pub struct GeometryEngine {
    service: Box<dyn GeometryService>,
    policy: Box<dyn AccessPointPolicy>,
    buffer_meters: f64,
}

impl Default for GeometryEngine {
    fn default() -> Self {
        Self::new(
            Box::new(PlanarGeometry),
            Box::new(NearestToCentroid::default()),
            DEFAULT_BUFFER_METERS,
        )
    }
}

impl GeometryEngine {
    pub fn new(
        service: Box<dyn GeometryService>,
        policy: Box<dyn AccessPointPolicy>,
        buffer_meters: f64,
    ) -> Self {
        Self {
            service,
            policy,
            buffer_meters,
        }
    }

    pub fn from_config(config: &NavigatorConfig) -> Self {
        Self::new(
            Box::new(PlanarGeometry),
            Box::new(NearestToCentroid {
                tie_tolerance_meters: config.tie_tolerance_meters,
            }),
            config.buffer_meters,
        )
    }

    pub fn with_policy(mut self, policy: Box<dyn AccessPointPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn buffer_meters(&self) -> f64 {
        self.buffer_meters
    }

    /// Routing hint target. Never reported as the access location.
    pub fn centroid(&self, parcel: &Parcel) -> Result<Coordinate, NavError> {
        self.service
            .centroid(&parcel.polygon())
            .ok_or_else(|| NavError::GeometryDegenerate {
                id: parcel.id().clone(),
                distinct_vertices: parcel.distinct_vertices(),
            })
    }

    pub fn buffered_boundary_line(&self, parcel: &Parcel, buffer_meters: f64) -> BufferZone {
        let line = self.service.boundary_line(&parcel.polygon());
        self.service.buffer(&line, buffer_meters)
    }

    /// Resolves with the engine's configured buffer.
    pub fn resolve_access_point(&self, route: &Route, parcel: &Parcel) -> Option<AccessPoint> {
        self.resolve_with_buffer(route, parcel, self.buffer_meters)
    }

    /// `None` means the route never crosses the band's outline: no boundary
    /// access. Only crossings count, so a route lying entirely inside the band
    /// (a user already standing at the boundary) also resolves to `None`.
    pub fn resolve_with_buffer(&self, route: &Route, parcel: &Parcel, buffer_meters: f64) -> Option<AccessPoint> {
        let centroid = match self.centroid(parcel) {
            Ok(centroid) => centroid,
            Err(err) => {
                warn!(parcel = %parcel.id(), error = %err, "cannot resolve access point");
                return None;
            }
        };
        let zone = self.buffered_boundary_line(parcel, buffer_meters);
        let candidates = self
            .service
            .line_intersections(&route.polyline.to_line_string(), &zone);
        debug!(
            parcel = %parcel.id(),
            route = %route.id,
            candidates = candidates.len(),
            "boundary crossings"
        );

        let index = self.policy.choose(&candidates, centroid)?;
        let location = *candidates.get(index)?;
        Some(AccessPoint {
            location,
            source_route: route.id,
            distance_to_centroid_meters: haversine_meters(location, centroid),
        })
    }
}
