//! parcel-access core
//!
//! Navigates to a land parcel and resolves where a route actually enters the
//! parcel's boundary, rather than its interior centroid.

pub mod traits;
pub mod error;
pub mod config;
pub mod haversine;
pub mod polyline;
pub mod parcel;
pub mod store;
pub mod planar;
pub mod geometry;
pub mod tracker;
pub mod routing;
pub mod selection;
pub mod navigator;
pub mod osrm;

/// Geographic coordinate: `x` is longitude, `y` is latitude.
pub type Coordinate = geo::Coord<f64>;
