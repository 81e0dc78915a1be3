//! Single-threaded event loop around [`SelectionController`].
//!
//! Events (user selections, position fixes, routing completions) are handled
//! one at a time. Route requests are queued and executed in issue order by
//! [`Navigator::poll_route`]; each completion is fed back through the
//! controller, which drops it if its cycle has been superseded meanwhile.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use crate::config::NavigatorConfig;
use crate::error::{NavError, RouteError};
use crate::parcel::{Parcel, ParcelId};
use crate::routing::{RouteId, RouteRequest};
use crate::selection::{Effect, Notification, SelectionController};
use crate::store::ParcelStore;
use crate::traits::{ParcelSource, PositionFix, PositionSource, Presenter, RoutePath, RoutingService};

#[derive(Debug)]
pub struct Navigator<R, P, U>
where
    R: RoutingService,
    P: PositionSource,
    U: Presenter,
{
    store: ParcelStore,
    controller: SelectionController,
    router: R,
    positions: P,
    presenter: U,
    in_flight: VecDeque<RouteRequest>,
}

impl<R, P, U> Navigator<R, P, U>
where
    R: RoutingService,
    P: PositionSource,
    U: Presenter,
{
    pub fn new(config: &NavigatorConfig, router: R, positions: P, presenter: U) -> Self {
        Self::with_controller(SelectionController::new(config), router, positions, presenter)
    }

    pub fn with_controller(controller: SelectionController, router: R, positions: P, presenter: U) -> Self {
        Self {
            store: ParcelStore::new(),
            controller,
            router,
            positions,
            presenter,
            in_flight: VecDeque::new(),
        }
    }

    pub fn load(&mut self, source: &dyn ParcelSource) -> Result<usize, NavError> {
        self.store.load(source)
    }

    pub fn store(&self) -> &ParcelStore {
        &self.store
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    pub fn presenter(&self) -> &U {
        &self.presenter
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn positions(&self) -> &P {
        &self.positions
    }

    pub fn pending_requests(&self) -> usize {
        self.in_flight.len()
    }

    /// Selects `parcel` and, once the presenter confirms, starts navigating.
    pub fn select(&mut self, parcel: Arc<Parcel>) -> Result<(), NavError> {
        let effects = self.controller.select(parcel)?;
        self.after_select(effects);
        Ok(())
    }

    /// Returns whether a parcel with exactly this id exists.
    pub fn find_and_select(&mut self, id: &ParcelId) -> Result<bool, NavError> {
        match self.controller.find_and_select(&self.store, id)? {
            Some(effects) => {
                self.after_select(effects);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn on_position(&mut self, fix: PositionFix) {
        let effects = self.controller.on_position(fix);
        self.apply(effects);
    }

    /// Entry point for hosts that run route requests on their own transport.
    pub fn deliver(&mut self, ticket: RouteId, result: Result<RoutePath, RouteError>) {
        let effects = self.controller.on_route_result(ticket, result);
        self.apply(effects);
    }

    /// Executes the oldest queued request of the live cycle. Queued requests
    /// of superseded cycles are discarded unsent. Returns `false` if none.
    pub fn poll_route(&mut self) -> bool {
        while let Some(request) = self.in_flight.pop_front() {
            let live = self.controller.routing().live_cycle();
            if request.ticket.cycle != live {
                debug!(route = %request.ticket, live = %live, "discarding queued request of superseded cycle");
                continue;
            }
            let result = self.router.route(request.origin, request.destination);
            self.deliver(request.ticket, result);
            return true;
        }
        false
    }

    /// Drains the request queue, including follow-up refined requests.
    pub fn run_until_idle(&mut self) -> usize {
        let mut executed = 0;
        while self.poll_route() {
            executed += 1;
        }
        executed
    }

    pub fn clear(&mut self) {
        let effects = self.controller.clear();
        self.apply(effects);
    }

    fn after_select(&mut self, effects: Vec<Effect>) {
        self.apply(effects);
        let Some(parcel) = self.controller.state().selected_parcel().cloned() else {
            return;
        };
        if self.presenter.confirm_navigation(&parcel) {
            let effects = self.controller.confirm();
            self.apply(effects);
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartTracking => self.positions.start(),
                Effect::StopTracking => self.positions.stop(),
                Effect::RequestRoute(request) => {
                    debug!(route = %request.ticket, "queueing route request");
                    self.in_flight.push_back(request);
                }
                Effect::Notify(notification) => self.notify(notification),
            }
        }
    }

    fn notify(&mut self, notification: Notification) {
        match notification {
            Notification::Selected(parcel) => self.presenter.parcel_selected(&parcel),
            Notification::Deselected(parcel) => self.presenter.parcel_deselected(&parcel),
            Notification::LocationChanged(location) => self.presenter.location_changed(location),
            Notification::CycleFinished(result) => self.presenter.cycle_finished(&result),
        }
    }
}
