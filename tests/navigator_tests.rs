//! End-to-end behaviour of the navigator loop with scripted collaborators.

mod fixtures;

use parcel_access::config::NavigatorConfig;
use parcel_access::navigator::Navigator;
use parcel_access::parcel::ParcelId;
use parcel_access::routing::{CyclePhase, Leg, Outcome};
use parcel_access::store::JsonParcelSource;

use fixtures::{RecordingPositions, RecordingPresenter, ScriptedRouter, Shown, at, block, fix};

type TestNavigator = Navigator<ScriptedRouter, RecordingPositions, RecordingPresenter>;

fn navigator(router: ScriptedRouter) -> TestNavigator {
    Navigator::new(
        &NavigatorConfig::default(),
        router,
        RecordingPositions::default(),
        RecordingPresenter::default(),
    )
}

#[test]
fn accessible_parcel_resolves_to_boundary() {
    let mut nav = navigator(ScriptedRouter::default());
    nav.select(block("P1", (0.0, 0.0), 300.0)).unwrap();
    nav.on_position(fix(-0.01, 0.0013));

    assert_eq!(nav.run_until_idle(), 2, "hint and refined legs");

    let results = nav.presenter().results();
    assert_eq!(results.len(), 1);
    let Outcome::Accessible { route, access_point } = &results[0].outcome else {
        panic!("expected accessible outcome, got {:?}", results[0].outcome);
    };
    assert_eq!(route.id.leg, Leg::Refined);
    assert_eq!(route.polyline.last(), Some(access_point.location));
    // West edge is at x = 0, 20 m band.
    assert!(access_point.location.x.abs() < 25.0 / 111_195.0);

    let state = nav.controller().state();
    assert_eq!(state.current_access_point(), Some(access_point));
    assert_eq!(state.current_route(), Some(route));
}

#[test]
fn enclosed_parcel_keeps_hint_route_and_flags_no_access() {
    // The engine cannot reach the parcel and snaps to a road 2 km away.
    let mut nav = navigator(ScriptedRouter::snapping_to(at(-0.02, 0.0)));
    nav.select(block("ENCLOSED", (0.0, 0.0), 200.0)).unwrap();
    nav.on_position(fix(-0.05, 0.0));
    assert_eq!(nav.run_until_idle(), 1, "no refined leg");

    let results = nav.presenter().results();
    assert_eq!(results.len(), 1);
    match &results[0].outcome {
        Outcome::NoBoundaryAccess { route } => {
            assert_eq!(route.id.leg, Leg::Hint);
            assert_eq!(route.polyline.last(), Some(at(-0.02, 0.0)));
        }
        other => panic!("expected NoBoundaryAccess, got {:?}", other),
    }
    assert!(!results[0].outcome.is_failure());
    assert!(nav.controller().state().current_route().is_some());
    assert!(nav.controller().state().current_access_point().is_none());
}

#[test]
fn routing_failure_is_distinct_from_no_access() {
    let mut nav = navigator(ScriptedRouter::failing(1));
    nav.select(block("P1", (0.0, 0.0), 300.0)).unwrap();
    nav.on_position(fix(-0.01, 0.0013));
    nav.run_until_idle();

    let results = nav.presenter().results();
    assert_eq!(results.len(), 1);
    assert!(results[0].outcome.is_failure());
    assert!(matches!(
        results[0].outcome,
        Outcome::RouteUnavailable { leg: Leg::Hint, .. }
    ));
    assert!(nav.controller().state().current_route().is_none());
}

#[test]
fn refined_leg_failure_ends_cycle_without_route() {
    let mut nav = navigator(ScriptedRouter::default());
    nav.select(block("P1", (0.0, 0.0), 300.0)).unwrap();
    nav.on_position(fix(-0.01, 0.0013));

    assert!(nav.poll_route(), "hint leg");
    nav.router().failures.set(1);
    assert_eq!(nav.run_until_idle(), 1, "refined leg");

    let results = nav.presenter().results();
    assert_eq!(results.len(), 1);
    assert!(matches!(
        results[0].outcome,
        Outcome::RouteUnavailable { leg: Leg::Refined, .. }
    ));
    assert_eq!(nav.controller().routing().phase(), CyclePhase::Failed);
    assert!(nav.controller().state().current_route().is_none());
    assert!(nav.controller().state().current_access_point().is_none());
}

#[test]
fn cleared_selection_sends_no_queued_requests() {
    let mut nav = navigator(ScriptedRouter::default());
    nav.select(block("A", (0.0, 0.0), 300.0)).unwrap();
    nav.on_position(fix(-0.01, 0.0013));
    assert_eq!(nav.pending_requests(), 1);

    nav.clear();
    assert_eq!(nav.run_until_idle(), 0);
    assert!(nav.router().calls.borrow().is_empty());
    assert!(nav.presenter().results().is_empty());
}

#[test]
fn selecting_again_before_resolution_emits_one_result() {
    let mut nav = navigator(ScriptedRouter::default());
    nav.select(block("A", (0.0, 0.0), 300.0)).unwrap();
    nav.on_position(fix(-0.01, 0.0013));
    assert_eq!(nav.pending_requests(), 1);

    nav.select(block("B", (0.02, 0.0), 300.0)).unwrap();
    assert_eq!(nav.pending_requests(), 2, "A's hint is still in flight");

    // A's stale hint is discarded unsent; B goes through both legs.
    assert_eq!(nav.run_until_idle(), 2);
    assert_eq!(nav.router().calls.borrow().len(), 2);
    let results = nav.presenter().results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].parcel, ParcelId::new("B"));
    assert!(results[0].outcome.is_accessible());
}

#[test]
fn reselecting_same_parcel_restarts_cycle() {
    let mut nav = navigator(ScriptedRouter::default());
    let parcel = block("A", (0.0, 0.0), 300.0);
    nav.select(parcel.clone()).unwrap();
    nav.on_position(fix(-0.01, 0.0013));
    nav.run_until_idle();
    let first_cycle = nav.presenter().results()[0].cycle;

    nav.select(parcel.clone()).unwrap();
    assert!(nav.controller().state().current_route().is_none());
    assert!(nav.controller().state().current_access_point().is_none());
    assert_eq!(nav.pending_requests(), 1, "fresh cycle from the known location");

    nav.run_until_idle();
    let results = nav.presenter().results();
    assert_eq!(results.len(), 2);
    assert!(results[1].cycle > first_cycle);

    let shown = &nav.presenter().shown;
    let deselected = shown
        .iter()
        .position(|s| *s == Shown::Deselected(ParcelId::new("A")))
        .expect("teardown notified");
    assert_eq!(shown[deselected + 1], Shown::Selected(ParcelId::new("A")));
}

#[test]
fn late_delivery_for_superseded_cycle_is_ignored() {
    let mut nav = navigator(ScriptedRouter::default());
    nav.select(block("A", (0.0, 0.0), 300.0)).unwrap();
    nav.on_position(fix(-0.01, 0.0013));
    nav.run_until_idle();
    let old = nav.presenter().results()[0].clone();
    let old_route = old.outcome.route().unwrap().clone();

    nav.on_position(fix(-0.02, 0.0013));
    nav.deliver(
        old_route.id,
        Ok(parcel_access::traits::RoutePath {
            polyline: old_route.polyline.clone(),
            distance_meters: 1.0,
            duration_seconds: 1.0,
        }),
    );
    assert_eq!(nav.presenter().results().len(), 1, "stale delivery dropped");

    nav.run_until_idle();
    let results = nav.presenter().results();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1].origin, at(-0.02, 0.0013));
}

#[test]
fn jittery_positions_route_once() {
    let mut nav = navigator(ScriptedRouter::default());
    nav.select(block("A", (0.0, 0.0), 300.0)).unwrap();
    let step = 30.0 / 111_195.0;
    for i in 0..5 {
        nav.on_position(fix(-0.01, 0.0013 + step * (i % 2) as f64));
    }
    nav.run_until_idle();

    assert_eq!(nav.router().calls.borrow().len(), 2);
    let locations = nav
        .presenter()
        .shown
        .iter()
        .filter(|s| matches!(s, Shown::Location(_)))
        .count();
    assert_eq!(locations, 1);
}

#[test]
fn tracking_subscribes_once_and_stops_on_clear() {
    let mut nav = navigator(ScriptedRouter::default());
    nav.select(block("A", (0.0, 0.0), 300.0)).unwrap();
    nav.select(block("B", (0.02, 0.0), 300.0)).unwrap();
    assert_eq!(nav.positions().starts, 1);

    nav.clear();
    assert_eq!(nav.positions().stops, 1);
    assert!(nav.controller().state().selected_parcel().is_none());
}

#[test]
fn declined_confirmation_does_not_navigate() {
    let mut nav = Navigator::new(
        &NavigatorConfig::default(),
        ScriptedRouter::default(),
        RecordingPositions::default(),
        RecordingPresenter::declining(),
    );
    nav.select(block("A", (0.0, 0.0), 300.0)).unwrap();
    nav.on_position(fix(-0.01, 0.0013));

    assert_eq!(nav.positions().starts, 0);
    assert_eq!(nav.pending_requests(), 0);
    assert_eq!(
        nav.presenter().shown,
        vec![Shown::Selected(ParcelId::new("A"))]
    );
}

#[test]
fn find_and_select_by_composed_id() {
    let mut nav = navigator(ScriptedRouter::default());
    let loaded = nav
        .load(&JsonParcelSource::inline(
            r#"[
                {"id": "07-0012", "boundary": [[0,0],[0,0.002],[0.002,0.002],[0.002,0]], "attributes": {"acres": 12}},
                {"id": "07-0013", "boundary": [[0.003,0],[0.003,0.002],[0.005,0.002],[0.005,0]]}
            ]"#,
        ))
        .unwrap();
    assert_eq!(loaded, 2);

    assert!(!nav.find_and_select(&ParcelId::new("07-001")).unwrap());
    assert!(nav.presenter().shown.is_empty());

    assert!(nav.find_and_select(&ParcelId::compose("07-", "0013")).unwrap());
    assert_eq!(
        nav.presenter().shown,
        vec![Shown::Selected(ParcelId::new("07-0013"))]
    );
}

#[test]
fn degenerate_parcel_from_store_is_rejected() {
    let mut nav = navigator(ScriptedRouter::default());
    nav.load(&JsonParcelSource::inline(
        r#"[{"id": "SLIVER", "boundary": [[0,0],[1,0],[0,0]]}]"#,
    ))
    .unwrap();
    let err = nav.find_and_select(&ParcelId::new("SLIVER")).unwrap_err();
    assert!(matches!(
        err,
        parcel_access::error::NavError::GeometryDegenerate { distinct_vertices: 2, .. }
    ));
    assert!(nav.presenter().shown.is_empty());
}
