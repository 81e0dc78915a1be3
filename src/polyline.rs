//! Polyline representation for route geometries.
//!
//! Points are decoded lon/lat coordinates. Wire formats (GeoJSON from
//! OSRM) are converted at the adapter boundary, not here.

use geo::LineString;
use serde::{Deserialize, Serialize};

use crate::haversine::haversine_meters;
use crate::Coordinate;

/// An ordered sequence of coordinates from origin to destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Coordinate> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Coordinate> {
        self.points.last().copied()
    }

    /// Sum of geodesic segment lengths in meters.
    pub fn length_meters(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| haversine_meters(pair[0], pair[1]))
            .sum()
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::new(self.points.clone())
    }
}
