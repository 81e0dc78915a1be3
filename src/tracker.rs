//! Position tracking with jitter suppression.

use tracing::debug;

use crate::config::DEFAULT_MIN_MOVEMENT_METERS;
use crate::haversine::haversine_meters;
use crate::traits::PositionFix;
use crate::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerState {
    NotTracking,
    Tracking { last_accepted: Option<Coordinate> },
}

/// Accepts a fix only when it moved more than `min_movement_meters` from the
/// last accepted one, so GPS jitter on a stationary user does not trigger
/// route recomputation.
#[derive(Debug, Clone)]
pub struct LocationTracker {
    state: TrackerState,
    min_movement_meters: f64,
}

impl Default for LocationTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_MOVEMENT_METERS)
    }
}

impl LocationTracker {
    pub fn new(min_movement_meters: f64) -> Self {
        Self {
            state: TrackerState::NotTracking,
            min_movement_meters,
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, TrackerState::Tracking { .. })
    }

    pub fn last_accepted(&self) -> Option<Coordinate> {
        match self.state {
            TrackerState::Tracking { last_accepted } => last_accepted,
            TrackerState::NotTracking => None,
        }
    }

    /// Returns `true` if a subscription has to be opened.
    pub fn start(&mut self) -> bool {
        if self.is_tracking() {
            return false;
        }
        self.state = TrackerState::Tracking { last_accepted: None };
        true
    }

    /// Returns `true` if a subscription has to be closed.
    pub fn stop(&mut self) -> bool {
        if !self.is_tracking() {
            return false;
        }
        self.state = TrackerState::NotTracking;
        true
    }

    /// Returns the fix's coordinate when accepted.
    pub fn on_fix(&mut self, fix: PositionFix) -> Option<Coordinate> {
        let TrackerState::Tracking { last_accepted } = self.state else {
            debug!(timestamp = fix.timestamp, "fix ignored while not tracking");
            return None;
        };

        if let Some(last) = last_accepted {
            let moved = haversine_meters(last, fix.coordinate);
            if moved <= self.min_movement_meters {
                debug!(moved, timestamp = fix.timestamp, "fix within movement threshold");
                return None;
            }
        }

        self.state = TrackerState::Tracking {
            last_accepted: Some(fix.coordinate),
        };
        Some(fix.coordinate)
    }
}
