//! Recording test doubles for the navigator's collaborators.

use std::cell::{Cell, RefCell};

use parcel_access::Coordinate;
use parcel_access::error::RouteError;
use parcel_access::haversine::HaversineRouter;
use parcel_access::parcel::{Parcel, ParcelId};
use parcel_access::routing::CycleResult;
use parcel_access::traits::{PositionSource, Presenter, RoutePath, RoutingService};

#[derive(Debug, Clone, PartialEq)]
pub enum Shown {
    Selected(ParcelId),
    Deselected(ParcelId),
    Location(Coordinate),
    Finished(CycleResult),
}

#[derive(Debug)]
pub struct RecordingPresenter {
    pub shown: Vec<Shown>,
    pub confirm: bool,
}

impl Default for RecordingPresenter {
    fn default() -> Self {
        Self {
            shown: Vec::new(),
            confirm: true,
        }
    }
}

impl RecordingPresenter {
    pub fn declining() -> Self {
        Self {
            shown: Vec::new(),
            confirm: false,
        }
    }

    pub fn results(&self) -> Vec<&CycleResult> {
        self.shown
            .iter()
            .filter_map(|shown| match shown {
                Shown::Finished(result) => Some(result),
                _ => None,
            })
            .collect()
    }
}

impl Presenter for RecordingPresenter {
    fn parcel_selected(&mut self, parcel: &Parcel) {
        self.shown.push(Shown::Selected(parcel.id().clone()));
    }

    fn parcel_deselected(&mut self, parcel: &Parcel) {
        self.shown.push(Shown::Deselected(parcel.id().clone()));
    }

    fn confirm_navigation(&mut self, _parcel: &Parcel) -> bool {
        self.confirm
    }

    fn location_changed(&mut self, location: Coordinate) {
        self.shown.push(Shown::Location(location));
    }

    fn cycle_finished(&mut self, result: &CycleResult) {
        self.shown.push(Shown::Finished(result.clone()));
    }
}

#[derive(Debug, Default)]
pub struct RecordingPositions {
    pub starts: usize,
    pub stops: usize,
}

impl PositionSource for RecordingPositions {
    fn start(&mut self) {
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}

/// Straight-line router with scripted failures and road snapping.
#[derive(Debug, Default)]
pub struct ScriptedRouter {
    inner: HaversineRouter,
    /// Routes end here instead of at the destination, like an engine that
    /// snaps an unreachable target to the nearest road.
    pub snap_to: Option<Coordinate>,
    /// Number of upcoming calls that fail.
    pub failures: Cell<usize>,
    pub calls: RefCell<Vec<(Coordinate, Coordinate)>>,
}

impl ScriptedRouter {
    pub fn snapping_to(point: Coordinate) -> Self {
        Self {
            snap_to: Some(point),
            ..Self::default()
        }
    }

    pub fn failing(times: usize) -> Self {
        Self {
            failures: Cell::new(times),
            ..Self::default()
        }
    }
}

impl RoutingService for ScriptedRouter {
    fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<RoutePath, RouteError> {
        self.calls.borrow_mut().push((origin, destination));
        if self.failures.get() > 0 {
            self.failures.set(self.failures.get() - 1);
            return Err(RouteError::Transport("connection refused".to_string()));
        }
        match self.snap_to {
            Some(end) => self.inner.route(origin, end),
            None => self.inner.route(origin, destination),
        }
    }
}
