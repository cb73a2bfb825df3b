/*
 *  tests/display_integration.rs
 *
 *  Integration tests for the display session
 *
 *  gsdisplay - ground station status display
 *  (c) 2020-26 Stuart Hunter
 */

use embedded_graphics::prelude::*;

use gsdisplay::clock::{FixedClock, TimePoint};
use gsdisplay::config::{self, ConfigProvider};
use gsdisplay::display::{DisplaySession, MockDriver};
use gsdisplay::message::{MessagePayload, MessagePlanner};
use gsdisplay::overlay::{OverlayState, OverlayUpdater, Polarity};

const YAML: &str = r#"
log_level: debug
tick_ms: 250
display:
  width: 128
  height: 64
  brightness: 35
  day_night: true
  flip: true
  driver: mock
device:
  thing_name: gs-alpha
  wifi_ssid: field-net
messages:
  user_id: "ID123:"
"#;

fn session_from_yaml() -> (DisplaySession<MockDriver>, config::Config) {
    let cfg = config::parse_yaml(YAML).unwrap();
    config::validate(&cfg).unwrap();
    let driver = MockDriver::new(&cfg.display.clone().unwrap_or_default()).unwrap();
    let mut session = DisplaySession::new(driver);
    session.init(&cfg.snapshot()).unwrap();
    (session, cfg)
}

#[test]
fn test_config_drives_session_init() {
    let (session, cfg) = session_from_yaml();
    let snapshot = cfg.snapshot();
    assert_eq!(snapshot.brightness_level, 35);
    assert_eq!(snapshot.thing_name, "gs-alpha");
    assert_eq!(cfg.user_id(), "ID123:");

    let shared = session.driver().state();
    let mock = shared.lock().unwrap();
    assert_eq!(mock.flipped, Some(true));
    assert_eq!(mock.init_count, 1);
    assert_eq!(session.driver().count_on_pixels(), 0);
}

#[test]
fn test_message_then_foreign_message() {
    let (mut session, cfg) = session_from_yaml();
    let planner = MessagePlanner::new(session.grid().clone());
    let ts = TimePoint::new(10, 11, 12).unwrap();

    let ours = MessagePayload::new("ID123:battery ok, link up", ts);
    session.execute(&planner.plan_payload(&ours, cfg.user_id())).unwrap();

    let grid = session.grid().clone();
    let row1 = session.driver().count_on_pixels_in(&grid.band(1));
    let row2 = session.driver().count_on_pixels_in(&grid.band(2));
    assert!(row1 > 0);
    assert!(row2 > 0);
    let lit = session.driver().count_on_pixels();
    let flushes = session.driver().state().lock().unwrap().flush_count;

    // a message for another station leaves the panel untouched
    let theirs = MessagePayload::new("ID999:not for you", ts);
    let plan = planner.plan_payload(&theirs, cfg.user_id());
    assert!(plan.is_empty());
    session.execute(&plan).unwrap();
    assert_eq!(session.driver().count_on_pixels(), lit);
    assert_eq!(session.driver().state().lock().unwrap().flush_count, flushes);
}

#[test]
fn test_placeholder_row() {
    let (mut session, _cfg) = session_from_yaml();
    let planner = MessagePlanner::new(session.grid().clone());

    session.execute(&planner.plan_no_messages()).unwrap();

    let grid = session.grid().clone();
    assert!(session.driver().count_on_pixels_in(&grid.band(1)) > 0);
    // no timestamp drawn
    let stamp = grid.clear_at(Point::new(grid.timestamp_x(), 0));
    assert_eq!(session.driver().count_on_pixels_in(&stamp), 0);
}

#[test]
fn test_overlay_day_to_night() {
    let (mut session, cfg) = session_from_yaml();
    let snapshot = cfg.snapshot();
    let mut state = OverlayState::default();

    let mut polarities = Vec::new();
    for hour in [5, 6, 12, 18, 19] {
        let clock = FixedClock(Some(TimePoint::new(hour, 0, 0).unwrap()));
        let effects = OverlayUpdater::tick(&clock, &snapshot, &state).unwrap();
        polarities.push(effects.polarity);
        session.apply_overlay(&effects, &mut state).unwrap();
    }

    assert_eq!(
        polarities,
        vec![
            Polarity::Normal,
            Polarity::Inverted,
            Polarity::Inverted,
            Polarity::Inverted,
            Polarity::Normal,
        ]
    );

    let shared = session.driver().state();
    let mock = shared.lock().unwrap();
    // brightness written once, doubled for the controller
    assert_eq!(mock.brightness_writes, vec![70]);
    assert_eq!(mock.invert_writes, vec![false, true, true, true, false]);
    assert_eq!(state.last_applied_brightness(), 35);
}

#[test]
fn test_clock_failure_skips_tick() {
    let (mut session, cfg) = session_from_yaml();
    let state = OverlayState::default();
    let before = session.driver().state().lock().unwrap().flush_count;

    if let Some(effects) = OverlayUpdater::tick(&FixedClock(None), &cfg.snapshot(), &state) {
        let mut state = state.clone();
        session.apply_overlay(&effects, &mut state).unwrap();
    }

    assert_eq!(state, OverlayState::default());
    assert_eq!(session.driver().state().lock().unwrap().flush_count, before);
    assert_eq!(session.driver().count_on_pixels(), 0);
}

#[test]
fn test_overlay_and_message_share_row_zero() {
    let (mut session, cfg) = session_from_yaml();
    let planner = MessagePlanner::new(session.grid().clone());
    let mut state = OverlayState::default();
    let now = TimePoint::new(21, 45, 3).unwrap();

    session
        .execute(&planner.plan("ID123:hi", &now, cfg.user_id()))
        .unwrap();
    let grid = session.grid().clone();
    let stamp = grid.clear_at(Point::new(grid.timestamp_x(), 0));
    let stamp_pixels = session.driver().count_on_pixels_in(&stamp);
    assert!(stamp_pixels > 0);

    let effects = OverlayUpdater::tick(&FixedClock(Some(now)), &cfg.snapshot(), &state).unwrap();
    session.apply_overlay(&effects, &mut state).unwrap();

    // the clock never overwrites the timestamp
    assert!(session.driver().count_on_pixels_in(&grid.clock_area()) > 0);
    assert_eq!(session.driver().count_on_pixels_in(&stamp), stamp_pixels);
}

#[test]
fn test_brightness_change_after_first_tick() {
    let (mut session, cfg) = session_from_yaml();
    let mut state = OverlayState::default();
    let clock = FixedClock(Some(TimePoint::new(22, 0, 0).unwrap()));

    let mut snapshot = cfg.snapshot();
    for level in [35, 35, 45, 45, 0, 20] {
        snapshot.brightness_level = level;
        let effects = OverlayUpdater::tick(&clock, &snapshot, &state).unwrap();
        session.apply_overlay(&effects, &mut state).unwrap();
    }

    let shared = session.driver().state();
    let mock = shared.lock().unwrap();
    assert_eq!(mock.brightness_writes, vec![70, 90, 40]);
    assert_eq!(mock.power_writes, vec![false, true]);
    assert_eq!(state.last_applied_brightness(), 20);
}
