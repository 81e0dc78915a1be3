//! Default [`GeometryService`] backed by `geo`.
//!
//! Buffering is exact: a [`BufferZone`] keeps the source line and radius, and
//! crossings with its outline are solved analytically per route segment in a
//! local equirectangular projection (meters), anchored at the zone line's
//! first vertex. Accurate for parcel-sized geometry, not continental spans.

use geo::line_intersection::{LineIntersection, line_intersection};
use geo::{Centroid, EuclideanDistance, Line, LineString, Point, Polygon};

use crate::Coordinate;
use crate::haversine::EARTH_RADIUS_M;
use crate::traits::GeometryService;

/// A candidate within this distance of the outline counts as lying on it.
const ON_OUTLINE_METERS: f64 = 1e-3;

/// Consecutive crossings closer than this are the same crossing.
const DEDUP_METERS: f64 = 1e-3;

/// Slack on segment parameters before clamping to `[0, 1]`.
const PARAM_EPS: f64 = 1e-9;

/// The set of points within `meters` of a line.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferZone {
    line: LineString<f64>,
    meters: f64,
}

impl BufferZone {
    pub fn new(line: LineString<f64>, meters: f64) -> Self {
        Self { line, meters }
    }

    pub fn line(&self) -> &LineString<f64> {
        &self.line
    }

    pub fn meters(&self) -> f64 {
        self.meters
    }

    /// Planar distance in meters from `point` to the zone's source line.
    pub fn distance_meters(&self, point: Coordinate) -> f64 {
        let Some(anchor) = self.line.0.first().copied() else {
            return f64::INFINITY;
        };
        let projection = LocalProjection::anchored_at(anchor);
        let line = projection.project_line(&self.line);
        Point::from(projection.project(point)).euclidean_distance(&line)
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        self.distance_meters(point) <= self.meters + ON_OUTLINE_METERS
    }
}

/// Equirectangular projection to meters around an anchor coordinate.
#[derive(Debug, Clone, Copy)]
struct LocalProjection {
    anchor: Coordinate,
    meters_per_lon: f64,
    meters_per_lat: f64,
}

impl LocalProjection {
    fn anchored_at(anchor: Coordinate) -> Self {
        // Arc length of one degree of latitude.
        let meters_per_lat = EARTH_RADIUS_M.to_radians();
        Self {
            anchor,
            meters_per_lon: (meters_per_lat * anchor.y.to_radians().cos()).max(1e-9),
            meters_per_lat,
        }
    }

    fn project(&self, coord: Coordinate) -> Coordinate {
        Coordinate {
            x: (coord.x - self.anchor.x) * self.meters_per_lon,
            y: (coord.y - self.anchor.y) * self.meters_per_lat,
        }
    }

    fn unproject(&self, coord: Coordinate) -> Coordinate {
        Coordinate {
            x: coord.x / self.meters_per_lon + self.anchor.x,
            y: coord.y / self.meters_per_lat + self.anchor.y,
        }
    }

    fn project_line(&self, line: &LineString<f64>) -> LineString<f64> {
        line.coords().map(|coord| self.project(*coord)).collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarGeometry;

impl GeometryService for PlanarGeometry {
    fn centroid(&self, polygon: &Polygon<f64>) -> Option<Coordinate> {
        polygon.centroid().map(|point| point.0)
    }

    fn boundary_line(&self, polygon: &Polygon<f64>) -> LineString<f64> {
        let mut ring = polygon.exterior().clone();
        ring.close();
        ring
    }

    fn buffer(&self, line: &LineString<f64>, meters: f64) -> BufferZone {
        BufferZone::new(line.clone(), meters)
    }

    fn line_intersections(&self, line: &LineString<f64>, zone: &BufferZone) -> Vec<Coordinate> {
        let Some(anchor) = zone.line.0.first().copied() else {
            return Vec::new();
        };
        let projection = LocalProjection::anchored_at(anchor);
        let ring = projection.project_line(&zone.line);
        let route: Vec<Coordinate> = line.coords().map(|coord| projection.project(*coord)).collect();

        let mut hits: Vec<Coordinate> = Vec::new();
        for pair in route.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            if start == end {
                continue;
            }
            let mut params = if zone.meters > 0.0 {
                outline_crossings(start, end, &ring, zone.meters)
            } else {
                ring_crossings(start, end, &ring)
            };
            params.sort_by(f64::total_cmp);

            for t in params {
                let point = lerp(start, end, t);
                if hits
                    .last()
                    .is_some_and(|last| planar_distance(*last, point) < DEDUP_METERS)
                {
                    continue;
                }
                hits.push(point);
            }
        }

        hits.into_iter().map(|point| projection.unproject(point)).collect()
    }
}

/// Parameters along `start -> end` where the distance to `ring` equals `radius`.
///
/// The outline of a buffered polyline is made of offset copies of each edge
/// and circular caps around each vertex. Every candidate is checked against
/// the whole ring so pieces buried inside a neighbouring edge's band drop out.
fn outline_crossings(start: Coordinate, end: Coordinate, ring: &LineString<f64>, radius: f64) -> Vec<f64> {
    let delta = end - start;
    let mut candidates = Vec::new();

    for edge in ring.lines() {
        circle_roots(start, delta, edge.start, radius, &mut candidates);

        let edge_delta = edge.delta();
        let length = edge_delta.x.hypot(edge_delta.y);
        if length == 0.0 {
            continue;
        }
        let normal = Coordinate {
            x: -edge_delta.y / length,
            y: edge_delta.x / length,
        };
        for side in [radius, -radius] {
            let shift = normal * side;
            let offset = Line::new(edge.start + shift, edge.end + shift);
            if let Some(t) = segment_param(start, delta, &offset) {
                candidates.push(t);
            }
        }
    }
    if let Some(last) = ring.0.last() {
        circle_roots(start, delta, *last, radius, &mut candidates);
    }

    candidates
        .into_iter()
        .filter(|t| (-PARAM_EPS..=1.0 + PARAM_EPS).contains(t))
        .map(|t| t.clamp(0.0, 1.0))
        .filter(|t| {
            let point = Point::from(start + delta * *t);
            (point.euclidean_distance(ring) - radius).abs() <= ON_OUTLINE_METERS
        })
        .collect()
}

/// Parameters along `start -> end` where it meets the ring itself.
fn ring_crossings(start: Coordinate, end: Coordinate, ring: &LineString<f64>) -> Vec<f64> {
    let segment = Line::new(start, end);
    let mut params = Vec::new();
    for edge in ring.lines() {
        match line_intersection(segment, edge) {
            Some(LineIntersection::SinglePoint { intersection, .. }) => {
                params.push(param_of(start, end, intersection));
            }
            Some(LineIntersection::Collinear { intersection }) => {
                params.push(param_of(start, end, intersection.start));
                params.push(param_of(start, end, intersection.end));
            }
            None => {}
        }
    }
    params
}

fn circle_roots(start: Coordinate, delta: Coordinate, center: Coordinate, radius: f64, out: &mut Vec<f64>) {
    let rel = start - center;
    let a = dot(delta, delta);
    let b = 2.0 * dot(delta, rel);
    let c = dot(rel, rel) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if a == 0.0 || discriminant < 0.0 {
        return;
    }
    let root = discriminant.sqrt();
    out.push((-b - root) / (2.0 * a));
    if root > 0.0 {
        out.push((-b + root) / (2.0 * a));
    }
}

/// Parameter along the segment `start + t * delta` where it crosses `other`.
/// Parallel segments yield nothing.
fn segment_param(start: Coordinate, delta: Coordinate, other: &Line<f64>) -> Option<f64> {
    let other_delta = other.delta();
    let denom = cross(delta, other_delta);
    if denom.abs() < f64::EPSILON * dot(delta, delta).max(dot(other_delta, other_delta)) {
        return None;
    }
    let offset = other.start - start;
    let t = cross(offset, other_delta) / denom;
    let u = cross(offset, delta) / denom;
    (-PARAM_EPS..=1.0 + PARAM_EPS).contains(&u).then_some(t)
}

fn param_of(start: Coordinate, end: Coordinate, point: Coordinate) -> f64 {
    let delta = end - start;
    dot(point - start, delta) / dot(delta, delta)
}

fn lerp(start: Coordinate, end: Coordinate, t: f64) -> Coordinate {
    start + (end - start) * t
}

fn dot(a: Coordinate, b: Coordinate) -> f64 {
    a.x * b.x + a.y * b.y
}

fn cross(a: Coordinate, b: Coordinate) -> f64 {
    a.x * b.y - a.y * b.x
}

fn planar_distance(a: Coordinate, b: Coordinate) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
