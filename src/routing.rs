//! Two-phase routing cycles.
//!
//! A cycle first routes to the parcel centroid (the hint route), resolves the
//! boundary access point from that polyline, then routes again to the access
//! point (the refined route). Starting a new cycle supersedes the old one:
//! late completions carry their cycle id and are dropped unless it is live.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{NavError, RouteError};
use crate::geometry::{AccessPoint, GeometryEngine};
use crate::parcel::{Parcel, ParcelId};
use crate::polyline::Polyline;
use crate::traits::RoutePath;
use crate::Coordinate;

/// Monotonically increasing routing cycle identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CycleId(u64);

impl CycleId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Leg {
    /// Origin to parcel centroid.
    Hint,
    /// Origin to access point.
    Refined,
}

/// Identifies a route by the cycle and leg that requested it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RouteId {
    pub cycle: CycleId,
    pub leg: Leg,
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let leg = match self.leg {
            Leg::Hint => "hint",
            Leg::Refined => "refined",
        };
        write!(f, "{}/{}", self.cycle, leg)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub id: RouteId,
    pub polyline: Polyline,
    pub total_distance_meters: f64,
    pub total_duration_seconds: f64,
}

impl Route {
    /// Rejects paths with fewer than two points.
    pub fn from_path(id: RouteId, path: RoutePath) -> Result<Self, RouteError> {
        if path.polyline.len() < 2 {
            return Err(RouteError::EmptyGeometry);
        }
        Ok(Self {
            id,
            polyline: path.polyline,
            total_distance_meters: path.distance_meters,
            total_duration_seconds: path.duration_seconds,
        })
    }
}

/// A routing request issued to the external routing service.
///
/// The ticket must be handed back with the response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub ticket: RouteId,
    pub origin: Coordinate,
    pub destination: Coordinate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Refined route to the access point.
    Accessible { route: Route, access_point: AccessPoint },
    /// The hint route never met the boundary band. Not a failure.
    NoBoundaryAccess { route: Route },
    /// A routing request failed. The caller may start a new cycle.
    RouteUnavailable { leg: Leg, error: RouteError },
    /// The cycle could not issue its hint request.
    Unroutable { error: NavError },
}

impl Outcome {
    pub fn route(&self) -> Option<&Route> {
        match self {
            Outcome::Accessible { route, .. } | Outcome::NoBoundaryAccess { route } => Some(route),
            Outcome::RouteUnavailable { .. } | Outcome::Unroutable { .. } => None,
        }
    }

    pub fn access_point(&self) -> Option<&AccessPoint> {
        match self {
            Outcome::Accessible { access_point, .. } => Some(access_point),
            _ => None,
        }
    }

    pub fn is_accessible(&self) -> bool {
        matches!(self, Outcome::Accessible { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::RouteUnavailable { .. } | Outcome::Unroutable { .. })
    }
}

/// Final result of one routing cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleResult {
    pub cycle: CycleId,
    pub parcel: ParcelId,
    pub origin: Coordinate,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    HintRequested,
    HintFound,
    RefinedRequested,
    Resolved,
    NoAccessResolved,
    Failed,
}

#[derive(Debug)]
enum CycleState {
    Idle,
    HintRequested {
        parcel: Arc<Parcel>,
        origin: Coordinate,
    },
    HintFound {
        parcel: Arc<Parcel>,
        origin: Coordinate,
        hint: Route,
    },
    RefinedRequested {
        parcel: Arc<Parcel>,
        origin: Coordinate,
        access_point: AccessPoint,
    },
    Finished(CyclePhase),
}

/// What the coordinator needs done after handling a completion.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Request(RouteRequest),
    Finished(CycleResult),
}

#[derive(Debug)]
pub struct RoutingCoordinator {
    engine: GeometryEngine,
    live: CycleId,
    state: CycleState,
}

impl RoutingCoordinator {
    pub fn new(engine: GeometryEngine) -> Self {
        Self {
            engine,
            live: CycleId(0),
            state: CycleState::Idle,
        }
    }

    pub fn engine(&self) -> &GeometryEngine {
        &self.engine
    }

    pub fn live_cycle(&self) -> CycleId {
        self.live
    }

    pub fn phase(&self) -> CyclePhase {
        match &self.state {
            CycleState::Idle => CyclePhase::Idle,
            CycleState::HintRequested { .. } => CyclePhase::HintRequested,
            CycleState::HintFound { .. } => CyclePhase::HintFound,
            CycleState::RefinedRequested { .. } => CyclePhase::RefinedRequested,
            CycleState::Finished(phase) => *phase,
        }
    }

    /// Invalidates the live cycle without starting another.
    pub fn supersede(&mut self) -> CycleId {
        self.live = CycleId(self.live.0 + 1);
        self.state = CycleState::Idle;
        self.live
    }

    /// Starts a new cycle with a hint request towards the parcel centroid.
    ///
    /// On error the new cycle is already live and ends `Failed`.
    pub fn request_route(&mut self, origin: Coordinate, parcel: Arc<Parcel>) -> Result<RouteRequest, NavError> {
        let cycle = self.supersede();
        let centroid = match self.engine.centroid(&parcel) {
            Ok(centroid) => centroid,
            Err(err) => {
                self.state = CycleState::Finished(CyclePhase::Failed);
                return Err(err);
            }
        };
        debug!(cycle = %cycle, parcel = %parcel.id(), "requesting hint route");
        self.state = CycleState::HintRequested { parcel, origin };
        Ok(RouteRequest {
            ticket: RouteId {
                cycle,
                leg: Leg::Hint,
            },
            origin,
            destination: centroid,
        })
    }

    /// Single dispatch point for routing completions.
    ///
    /// Returns `None` when the completion is stale or unexpected.
    pub fn on_route_result(&mut self, ticket: RouteId, result: Result<RoutePath, RouteError>) -> Option<Step> {
        if ticket.cycle != self.live {
            debug!(route = %ticket, live = %self.live, "dropping stale route result");
            return None;
        }

        let state = std::mem::replace(&mut self.state, CycleState::Idle);
        match (state, ticket.leg) {
            (CycleState::HintRequested { parcel, origin }, Leg::Hint) => {
                match result.and_then(|path| Route::from_path(ticket, path)) {
                    Ok(hint) => {
                        self.state = CycleState::HintFound { parcel, origin, hint };
                        self.resolve_hint()
                    }
                    Err(error) => Some(self.fail(&parcel, origin, Leg::Hint, error)),
                }
            }
            (CycleState::RefinedRequested { parcel, origin, access_point }, Leg::Refined) => {
                match result.and_then(|path| Route::from_path(ticket, path)) {
                    Ok(route) => {
                        info!(cycle = %ticket.cycle, parcel = %parcel.id(), "route resolved to access point");
                        self.state = CycleState::Finished(CyclePhase::Resolved);
                        Some(Step::Finished(CycleResult {
                            cycle: ticket.cycle,
                            parcel: parcel.id().clone(),
                            origin,
                            outcome: Outcome::Accessible { route, access_point },
                        }))
                    }
                    Err(error) => Some(self.fail(&parcel, origin, Leg::Refined, error)),
                }
            }
            (state, leg) => {
                debug!(route = %ticket, ?leg, "unexpected route result for current phase");
                self.state = state;
                None
            }
        }
    }

    fn resolve_hint(&mut self) -> Option<Step> {
        let state = std::mem::replace(&mut self.state, CycleState::Idle);
        let CycleState::HintFound { parcel, origin, hint } = state else {
            self.state = state;
            return None;
        };
        let cycle = hint.id.cycle;

        match self.engine.resolve_access_point(&hint, &parcel) {
            Some(access_point) => {
                debug!(
                    cycle = %cycle,
                    parcel = %parcel.id(),
                    distance_to_centroid = access_point.distance_to_centroid_meters,
                    "access point found, requesting refined route"
                );
                let request = RouteRequest {
                    ticket: RouteId {
                        cycle,
                        leg: Leg::Refined,
                    },
                    origin,
                    destination: access_point.location,
                };
                self.state = CycleState::RefinedRequested {
                    parcel,
                    origin,
                    access_point,
                };
                Some(Step::Request(request))
            }
            None => {
                info!(cycle = %cycle, parcel = %parcel.id(), "no boundary access, keeping hint route");
                self.state = CycleState::Finished(CyclePhase::NoAccessResolved);
                Some(Step::Finished(CycleResult {
                    cycle,
                    parcel: parcel.id().clone(),
                    origin,
                    outcome: Outcome::NoBoundaryAccess { route: hint },
                }))
            }
        }
    }

    fn fail(&mut self, parcel: &Parcel, origin: Coordinate, leg: Leg, error: RouteError) -> Step {
        warn!(cycle = %self.live, parcel = %parcel.id(), ?leg, error = %error, "routing failed");
        self.state = CycleState::Finished(CyclePhase::Failed);
        Step::Finished(CycleResult {
            cycle: self.live,
            parcel: parcel.id().clone(),
            origin,
            outcome: Outcome::RouteUnavailable { leg, error },
        })
    }
}
