//! Parcel entities as loaded from the external data source.

use std::fmt;

use geo::{LineString, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::NavError;
use crate::Coordinate;

/// Stable external identifier of a parcel (district prefix + number suffix).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelId(String);

impl ParcelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Joins a district prefix and a parcel number, e.g. `("12A", "0345")` -> `12A0345`.
    pub fn compose(district: &str, number: &str) -> Self {
        Self(format!("{}{}", district.trim(), number.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParcelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParcelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Raw record shape delivered by a [`crate::traits::ParcelSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelRecord {
    pub id: String,
    /// `[lon, lat]` pairs of the boundary ring.
    pub boundary: Vec<[f64; 2]>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// A land parcel: identifier, closed boundary ring and opaque attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    id: ParcelId,
    boundary: Vec<Coordinate>,
    attributes: Map<String, Value>,
}

impl Parcel {
    /// Builds a parcel, closing the ring if the source left it open.
    pub fn new(id: ParcelId, mut boundary: Vec<Coordinate>, attributes: Map<String, Value>) -> Self {
        if let (Some(first), Some(last)) = (boundary.first().copied(), boundary.last().copied()) {
            if first != last {
                boundary.push(first);
            }
        }
        Self {
            id,
            boundary,
            attributes,
        }
    }

    pub fn from_record(record: ParcelRecord) -> Self {
        let boundary = record
            .boundary
            .iter()
            .map(|[lon, lat]| Coordinate { x: *lon, y: *lat })
            .collect();
        Self::new(ParcelId::new(record.id), boundary, record.attributes)
    }

    pub fn id(&self) -> &ParcelId {
        &self.id
    }

    /// Closed ring: the first coordinate is repeated at the end.
    pub fn boundary(&self) -> &[Coordinate] {
        &self.boundary
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Number of distinct vertices of the ring.
    pub fn distinct_vertices(&self) -> usize {
        let open = match self.boundary.split_last() {
            Some((_, rest)) if self.boundary.len() > 1 => rest,
            _ => &self.boundary[..],
        };
        let mut distinct: Vec<Coordinate> = Vec::with_capacity(open.len());
        for coord in open {
            if !distinct.contains(coord) {
                distinct.push(*coord);
            }
        }
        distinct.len()
    }

    /// Rejects rings with fewer than three distinct vertices.
    pub fn validate(&self) -> Result<(), NavError> {
        let distinct_vertices = self.distinct_vertices();
        if distinct_vertices < 3 {
            return Err(NavError::GeometryDegenerate {
                id: self.id.clone(),
                distinct_vertices,
            });
        }
        Ok(())
    }

    pub fn polygon(&self) -> Polygon<f64> {
        Polygon::new(LineString::new(self.boundary.clone()), vec![])
    }
}
