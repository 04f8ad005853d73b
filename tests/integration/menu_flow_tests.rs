//! Settings menu flows driven through real button presses.

use crate::mock_hw::{Harness, MockEeprom};

use humictl::app::events::AppEvent;
use humictl::app::ports::ButtonId;
use humictl::config::{OverridePolicy, SystemConfig};
use humictl::control::fan::FanStatus;
use humictl::menu::MenuState;
use humictl::settings::{FlushReport, ParameterId, ParameterValue};

fn initialised() -> Harness {
    Harness::boot(SystemConfig::default(), MockEeprom::with(&[]))
}

/// Press settings until the cursor sits on `id`, opening the menu first
/// if needed.
fn select(h: &mut Harness, id: ParameterId) {
    while h.app.menu().current() != Some(id) {
        h.press(ButtonId::Settings);
    }
}

fn close(h: &mut Harness) {
    while h.app.menu().is_active() {
        h.press(ButtonId::Settings);
    }
}

#[test]
fn full_traversal_flushes_once() {
    let mut h = initialised();

    h.press(ButtonId::Settings);
    assert_eq!(h.app.menu().state(), MenuState::Editing(ParameterId::Brightness));
    assert_eq!(h.board.row(0), "Brightness");
    assert_eq!(h.board.row(1), "5");

    h.press(ButtonId::Settings);
    h.press(ButtonId::Settings);
    assert_eq!(h.board.row(0), "Humidity");
    h.press(ButtonId::Up);
    assert_eq!(h.board.row(1), "51%");
    assert!(h.eeprom.writes.is_empty(), "adjusting never writes");

    // Five more parameters, then leave.
    for _ in 0..5 {
        h.press(ButtonId::Settings);
        assert!(h.app.menu().is_active());
    }
    assert_eq!(h.app.menu().current(), Some(ParameterId::LightLockMinutes));
    h.press(ButtonId::Settings);

    assert_eq!(h.app.menu().state(), MenuState::Inactive);
    assert_eq!(h.eeprom.writes, vec![(2, 51)]);
    assert_eq!(
        h.sink.count(|e| matches!(e, AppEvent::SettingsSaved(_))),
        1
    );
    assert!(h.sink.events.contains(&AppEvent::SettingsSaved(FlushReport {
        written: 1,
        failed: 0
    })));
    assert_eq!(h.board.row(0), "Saving");
    assert_eq!(h.board.row(1), "settings...");
}

#[test]
fn traversal_without_changes_writes_nothing() {
    let mut h = initialised();
    for _ in 0..ParameterId::COUNT + 1 {
        h.press(ButtonId::Settings);
    }
    assert!(!h.app.menu().is_active());
    assert!(h.eeprom.writes.is_empty());
    assert!(h.sink.events.contains(&AppEvent::SettingsSaved(FlushReport::default())));
}

#[test]
fn every_parameter_is_announced_in_order() {
    let mut h = initialised();
    for _ in 0..ParameterId::COUNT {
        h.press(ButtonId::Settings);
    }
    let selected: Vec<_> = h
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ParameterSelected(id, _) => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(selected, ParameterId::ALL.to_vec());
    assert_eq!(h.sink.count(|e| *e == AppEvent::MenuOpened), 1);
}

#[test]
fn brightness_and_contrast_preview_live() {
    let mut h = initialised();

    h.press(ButtonId::Settings);
    h.press(ButtonId::Up);
    assert_eq!(h.board.brightness(), Some(6), "preview even with light off");

    h.press(ButtonId::Settings);
    h.press(ButtonId::Down);
    assert_eq!(h.board.contrast(), Some(100));
    assert!(h.eeprom.writes.is_empty());

    close(&mut h);
    assert_eq!(h.eeprom.writes, vec![(0, 6), (1, 100)]);
    assert_eq!(h.board.brightness(), Some(0), "preview undone on close");
    assert_eq!(h.board.contrast(), Some(100));
}

#[test]
fn holding_up_repeats() {
    let mut h = initialised();
    select(&mut h, ParameterId::HumidityThreshold);

    // Pressed, then Held at +500, +1000, +1500, +2000.
    h.hold(ButtonId::Up, 2_100);
    assert_eq!(
        h.app.settings().get(ParameterId::HumidityThreshold),
        ParameterValue::Integer(55)
    );
    let adjusted = h.sink.count(|e| matches!(e, AppEvent::ParameterAdjusted(..)));
    assert_eq!(adjusted, 5);
}

#[test]
fn bounds_hold_under_repeated_adjustment() {
    let mut h = initialised();
    select(&mut h, ParameterId::FanMaxRunMinutes);
    for _ in 0..40 {
        h.press(ButtonId::Down);
    }
    assert_eq!(
        h.app.settings().get(ParameterId::FanMaxRunMinutes),
        ParameterValue::Integer(1)
    );
    assert_eq!(h.board.row(1), "1 min");
}

#[test]
fn boolean_toggles_with_either_button() {
    let mut h = initialised();
    select(&mut h, ParameterId::DefaultLight);
    h.press(ButtonId::Down);
    assert_eq!(h.board.row(1), "ON");
    h.press(ButtonId::Up);
    assert_eq!(h.board.row(1), "OFF");
}

#[test]
fn sensor_is_not_read_while_editing() {
    let mut h = initialised();
    h.press(ButtonId::Settings);
    h.run_ms(20_000);
    assert_eq!(h.board.sensor_reads, 0);
    assert_eq!(h.board.row(0), "Brightness");

    close(&mut h);
    h.run_ms(1);
    assert_eq!(h.board.sensor_reads, 1, "overdue reading taken on exit");
}

#[test]
fn run_budget_holds_while_editing() {
    let mut h = Harness::boot(
        SystemConfig::default(),
        MockEeprom::with(&[(ParameterId::FanMaxRunMinutes, 1)]),
    );
    h.board.set_humidity(60.0);
    h.run_until(5_000);
    assert_eq!(h.board.relay(), Some(true));

    h.press(ButtonId::Settings);
    h.run_until(59_999);
    assert_eq!(h.board.relay(), Some(true));
    h.run_until(60_000);
    assert_eq!(h.board.relay(), Some(false));
    assert_eq!(h.app.fan().status(), FanStatus::Resting);
    assert_eq!(h.board.sensor_reads, 1);
    assert_eq!(h.board.row(0), "Brightness", "menu page not overwritten");
}

#[test]
fn up_down_ignored_outside_menu() {
    let mut h = initialised();
    h.press(ButtonId::Up);
    h.press(ButtonId::Down);
    assert_eq!(h.sink.count(|e| matches!(e, AppEvent::ParameterAdjusted(..))), 0);
    assert_eq!(
        h.app.settings().get(ParameterId::Brightness),
        ParameterValue::Integer(5)
    );
}

#[test]
fn override_works_inside_menu() {
    let config = SystemConfig {
        override_policy: OverridePolicy::ForceOnFirst,
        ..SystemConfig::default()
    };
    let mut h = Harness::boot(config, MockEeprom::with(&[]));

    h.press(ButtonId::Settings);
    h.press(ButtonId::Fan);
    assert_eq!(h.board.relay(), Some(true));
    assert_eq!(h.board.row(0), "Brightness", "menu page not overwritten");

    h.press(ButtonId::Light);
    assert!(h.app.light().is_on());
}

#[test]
fn edited_threshold_drives_next_reading() {
    let mut h = initialised();
    h.board.set_humidity(45.0);

    select(&mut h, ParameterId::HumidityThreshold);
    for _ in 0..10 {
        h.press(ButtonId::Down);
    }
    close(&mut h);
    assert_eq!(h.eeprom.writes, vec![(2, 40)]);

    h.run_until(h.elapsed + 5_000);
    assert_eq!(h.board.relay(), Some(true));
}
