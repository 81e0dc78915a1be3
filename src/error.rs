//! Error taxonomy for parcel navigation.

use thiserror::Error;

use crate::parcel::ParcelId;

/// Failures surfaced to callers of the navigation core.
///
/// A parcel without boundary access is not an error; it is reported as
/// [`crate::routing::Outcome::NoBoundaryAccess`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavError {
    #[error("parcel data unavailable: {0}")]
    DataUnavailable(String),

    #[error("parcel {id} has a degenerate boundary ({distinct_vertices} distinct vertices)")]
    GeometryDegenerate {
        id: ParcelId,
        distinct_vertices: usize,
    },

    #[error("no parcel with id {0}")]
    UnknownParcel(ParcelId),

    #[error(transparent)]
    Route(#[from] RouteError),
}

/// Failures of a single routing request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("routing transport failed: {0}")]
    Transport(String),

    #[error("routing engine found no route: {0}")]
    NoRoute(String),

    #[error("invalid routing response: {0}")]
    InvalidResponse(String),

    #[error("route has fewer than two points")]
    EmptyGeometry,
}

impl From<reqwest::Error> for RouteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RouteError::InvalidResponse(err.to_string())
        } else {
            RouteError::Transport(err.to_string())
        }
    }
}
