//! Selection state machine.
//!
//! `SelectionController` is the single mutation authority over
//! [`SelectionState`]. It performs no I/O: every entry point returns the
//! [`Effect`]s the host has to carry out.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::NavigatorConfig;
use crate::error::{NavError, RouteError};
use crate::geometry::{AccessPoint, GeometryEngine};
use crate::parcel::{Parcel, ParcelId};
use crate::routing::{CycleId, CycleResult, Outcome, Route, RouteId, RouteRequest, RoutingCoordinator, Step};
use crate::store::ParcelStore;
use crate::tracker::LocationTracker;
use crate::traits::{PositionFix, RoutePath};
use crate::Coordinate;

/// Something for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Selected(Arc<Parcel>),
    Deselected(Arc<Parcel>),
    LocationChanged(Coordinate),
    CycleFinished(CycleResult),
}

/// Work the host performs on behalf of the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartTracking,
    StopTracking,
    RequestRoute(RouteRequest),
    Notify(Notification),
}

/// Shared session state. Route and access point live together in the last
/// cycle result, so a stale pairing cannot be represented.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    selected_parcel: Option<Arc<Parcel>>,
    current: Option<CycleResult>,
}

impl SelectionState {
    pub fn selected_parcel(&self) -> Option<&Arc<Parcel>> {
        self.selected_parcel.as_ref()
    }

    pub fn current_result(&self) -> Option<&CycleResult> {
        self.current.as_ref()
    }

    pub fn current_route(&self) -> Option<&Route> {
        self.current.as_ref().and_then(|result| result.outcome.route())
    }

    pub fn current_access_point(&self) -> Option<&AccessPoint> {
        self.current.as_ref().and_then(|result| result.outcome.access_point())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionPhase {
    Unselected,
    Selected {
        parcel: Arc<Parcel>,
        cycle: CycleId,
        confirmed: bool,
    },
}

#[derive(Debug)]
pub struct SelectionController {
    phase: SelectionPhase,
    state: SelectionState,
    tracker: LocationTracker,
    routing: RoutingCoordinator,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(&NavigatorConfig::default())
    }
}

impl SelectionController {
    pub fn new(config: &NavigatorConfig) -> Self {
        Self::with_engine(config, GeometryEngine::from_config(config))
    }

    pub fn with_engine(config: &NavigatorConfig, engine: GeometryEngine) -> Self {
        Self {
            phase: SelectionPhase::Unselected,
            state: SelectionState::default(),
            tracker: LocationTracker::new(config.min_movement_meters),
            routing: RoutingCoordinator::new(engine),
        }
    }

    pub fn phase(&self) -> &SelectionPhase {
        &self.phase
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn tracker(&self) -> &LocationTracker {
        &self.tracker
    }

    pub fn routing(&self) -> &RoutingCoordinator {
        &self.routing
    }

    /// Selects `parcel`, tearing down any previous selection first.
    ///
    /// Re-selecting the current parcel is a full teardown plus a fresh
    /// cycle, not a no-op. Navigation begins once [`Self::confirm`] is called.
    pub fn select(&mut self, parcel: Arc<Parcel>) -> Result<Vec<Effect>, NavError> {
        parcel.validate()?;

        let mut effects = Vec::new();
        self.teardown(&mut effects);

        let cycle = self.routing.supersede();
        info!(parcel = %parcel.id(), cycle = %cycle, "parcel selected");
        self.state.selected_parcel = Some(Arc::clone(&parcel));
        self.phase = SelectionPhase::Selected {
            parcel: Arc::clone(&parcel),
            cycle,
            confirmed: false,
        };
        effects.push(Effect::Notify(Notification::Selected(parcel)));
        Ok(effects)
    }

    /// Looks `id` up exactly and selects it. `Ok(None)` when not found.
    pub fn find_and_select(&mut self, store: &ParcelStore, id: &ParcelId) -> Result<Option<Vec<Effect>>, NavError> {
        match store.find_by_id(id) {
            Some(parcel) => self.select(parcel).map(Some),
            None => {
                debug!(parcel = %id, "no parcel matches id");
                Ok(None)
            }
        }
    }

    /// The presentation layer agreed to navigate to the selected parcel.
    pub fn confirm(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        let SelectionPhase::Selected { parcel, confirmed, .. } = &mut self.phase else {
            debug!("confirm without selection");
            return effects;
        };
        *confirmed = true;
        let parcel = Arc::clone(parcel);

        if self.tracker.start() {
            effects.push(Effect::StartTracking);
        }
        if let Some(location) = self.tracker.last_accepted() {
            self.begin_cycle(location, parcel, &mut effects);
        }
        effects
    }

    /// Raw fix from the geolocation stream.
    pub fn on_position(&mut self, fix: PositionFix) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(location) = self.tracker.on_fix(fix) else {
            return effects;
        };
        effects.push(Effect::Notify(Notification::LocationChanged(location)));

        if let SelectionPhase::Selected {
            parcel,
            confirmed: true,
            ..
        } = &self.phase
        {
            let parcel = Arc::clone(parcel);
            self.begin_cycle(location, parcel, &mut effects);
        }
        effects
    }

    /// Completion of a routing request issued through [`Effect::RequestRoute`].
    pub fn on_route_result(&mut self, ticket: RouteId, result: Result<RoutePath, RouteError>) -> Vec<Effect> {
        let mut effects = Vec::new();
        let live = match &self.phase {
            SelectionPhase::Selected { cycle, .. } => *cycle,
            SelectionPhase::Unselected => {
                debug!(route = %ticket, "route result without selection");
                return effects;
            }
        };
        if ticket.cycle != live {
            debug!(route = %ticket, live = %live, "dropping route result from superseded cycle");
            return effects;
        }

        match self.routing.on_route_result(ticket, result) {
            Some(Step::Request(request)) => effects.push(Effect::RequestRoute(request)),
            Some(Step::Finished(result)) => {
                self.state.current = Some(result.clone());
                effects.push(Effect::Notify(Notification::CycleFinished(result)));
            }
            None => {}
        }
        effects
    }

    /// Drops the selection and stops tracking.
    pub fn clear(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.teardown(&mut effects);
        self.routing.supersede();
        if self.tracker.stop() {
            effects.push(Effect::StopTracking);
        }
        effects
    }

    fn begin_cycle(&mut self, location: Coordinate, parcel: Arc<Parcel>, effects: &mut Vec<Effect>) {
        self.state.current = None;
        match self.routing.request_route(location, Arc::clone(&parcel)) {
            Ok(request) => {
                if let SelectionPhase::Selected { cycle, .. } = &mut self.phase {
                    *cycle = request.ticket.cycle;
                }
                effects.push(Effect::RequestRoute(request));
            }
            Err(error) => {
                warn!(parcel = %parcel.id(), error = %error, "cannot start routing cycle");
                let cycle = self.routing.live_cycle();
                if let SelectionPhase::Selected { cycle: live, .. } = &mut self.phase {
                    *live = cycle;
                }
                let result = CycleResult {
                    cycle,
                    parcel: parcel.id().clone(),
                    origin: location,
                    outcome: Outcome::Unroutable { error },
                };
                self.state.current = Some(result.clone());
                effects.push(Effect::Notify(Notification::CycleFinished(result)));
            }
        }
    }

    fn teardown(&mut self, effects: &mut Vec<Effect>) {
        self.state.current = None;
        if let Some(previous) = self.state.selected_parcel.take() {
            debug!(parcel = %previous.id(), "tearing down selection");
            effects.push(Effect::Notify(Notification::Deselected(previous)));
        }
        self.phase = SelectionPhase::Unselected;
    }
}
