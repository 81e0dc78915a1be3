//! Collaborator seams of the navigation core.
//!
//! The core never talks to a map, a routing engine, a GPS receiver or a UI
//! directly. Concrete apps implement these traits for their own stack.

use std::fmt;

use geo::{LineString, Polygon};

use crate::error::{NavError, RouteError};
use crate::parcel::{Parcel, ParcelRecord};
use crate::polyline::Polyline;
use crate::routing::CycleResult;
use crate::planar::BufferZone;
use crate::Coordinate;

/// Geometry operations delegated by [`crate::geometry::GeometryEngine`].
///
/// Results stay in the coordinate reference system of the input.
pub trait GeometryService: fmt::Debug {
    /// Area centroid, `None` for a degenerate polygon.
    fn centroid(&self, polygon: &Polygon<f64>) -> Option<Coordinate>;

    /// The polygon's exterior ring as a line (not an area).
    fn boundary_line(&self, polygon: &Polygon<f64>) -> LineString<f64>;

    /// Points within `meters` of `line`.
    fn buffer(&self, line: &LineString<f64>, meters: f64) -> BufferZone;

    /// Points where `line` meets the outline of `zone`, in traversal order of `line`.
    fn line_intersections(&self, line: &LineString<f64>, zone: &BufferZone) -> Vec<Coordinate>;
}

/// A route as returned by a routing engine, before the core assigns it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePath {
    pub polyline: Polyline,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// Computes a route between two points. May fail.
pub trait RoutingService {
    fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<RoutePath, RouteError>;
}

/// One-shot provider of parcel records.
pub trait ParcelSource {
    fn fetch(&self) -> Result<Vec<ParcelRecord>, NavError>;
}

/// A raw position event from the geolocation stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub coordinate: Coordinate,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
}

/// Continuous position stream. Fixes are pushed into
/// [`crate::navigator::Navigator::on_position`] while subscribed.
pub trait PositionSource {
    fn start(&mut self);
    fn stop(&mut self);
}

/// Consumer of everything the core wants shown to the user.
pub trait Presenter {
    fn parcel_selected(&mut self, parcel: &Parcel);

    fn parcel_deselected(&mut self, parcel: &Parcel);

    /// Asked after a selection before navigation starts.
    fn confirm_navigation(&mut self, _parcel: &Parcel) -> bool {
        true
    }

    fn location_changed(&mut self, location: Coordinate);

    fn cycle_finished(&mut self, result: &CycleResult);
}
