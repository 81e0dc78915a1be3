//! Parcel builders.

use std::sync::Arc;

use geo::coord;
use parcel_access::Coordinate;
use parcel_access::parcel::{Parcel, ParcelId};
use parcel_access::traits::PositionFix;
use serde_json::Map;

/// Degrees of latitude per meter, close enough for fixtures.
pub const DEG_PER_METER: f64 = 1.0 / 111_195.0;

pub fn parcel(id: &str, ring: &[(f64, f64)]) -> Arc<Parcel> {
    let boundary = ring.iter().map(|&(x, y)| coord! { x: x, y: y }).collect();
    Arc::new(Parcel::new(ParcelId::new(id), boundary, Map::new()))
}

/// `[[0,0],[0,1],[1,1],[1,0],[0,0]]`, degrees read as a flat plane.
pub fn unit_square() -> Arc<Parcel> {
    parcel("UNIT", &[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)])
}

/// Axis-aligned square block with its south-west corner at `corner`.
pub fn block(id: &str, corner: (f64, f64), side_meters: f64) -> Arc<Parcel> {
    let side = side_meters * DEG_PER_METER;
    let (x, y) = corner;
    parcel(id, &[(x, y), (x, y + side), (x + side, y + side), (x + side, y)])
}

/// L-shaped parcel, 200 m arms, 80 m wide.
pub fn l_shape(id: &str) -> Arc<Parcel> {
    let m = DEG_PER_METER;
    parcel(
        id,
        &[
            (0.0, 0.0),
            (0.0, 200.0 * m),
            (80.0 * m, 200.0 * m),
            (80.0 * m, 80.0 * m),
            (200.0 * m, 80.0 * m),
            (200.0 * m, 0.0),
        ],
    )
}

pub fn at(x: f64, y: f64) -> Coordinate {
    coord! { x: x, y: y }
}

pub fn fix(x: f64, y: f64) -> PositionFix {
    PositionFix {
        coordinate: at(x, y),
        timestamp: 0,
    }
}
