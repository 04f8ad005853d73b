//! Integration tests for the AppService → controllers → actuators pipeline.
//!
//! Every scenario boots the service against mock adapters and drives it
//! with 1 ms ticks of simulated time, exactly as the main cycle would.

use crate::mock_hw::{ActuatorCall, Harness, MockEeprom};

use humictl::app::events::AppEvent;
use humictl::app::ports::{ButtonId, Level};
use humictl::config::{OverridePolicy, SystemConfig};
use humictl::control::fan::{FanStatus, OverrideMode};
use humictl::control::light::LightCause;
use humictl::error::SensorError;
use humictl::settings::{ParameterId, ParameterValue};

fn initialised() -> Harness {
    Harness::boot(SystemConfig::default(), MockEeprom::with(&[]))
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn first_boot_writes_defaults_and_releases_outputs() {
    let h = Harness::boot(SystemConfig::default(), MockEeprom::erased());

    assert_eq!(h.eeprom.writes.len(), ParameterId::COUNT);
    assert_eq!(h.board.contrast(), Some(110));
    assert_eq!(h.board.brightness(), Some(0), "DefaultLight is off");
    assert_eq!(h.board.relay(), Some(false));
    assert_eq!(h.sink.events, vec![AppEvent::Started { light_on: false }]);
    assert_eq!(h.board.row(1), "Fan is OFF");
}

#[test]
fn second_boot_writes_nothing() {
    let h = initialised();
    assert!(h.eeprom.writes.is_empty());
    assert_eq!(
        h.app.settings().get(ParameterId::HumidityThreshold),
        ParameterValue::Integer(50)
    );
}

#[test]
fn default_light_turns_light_on_at_boot() {
    let h = Harness::boot(
        SystemConfig::default(),
        MockEeprom::with(&[(ParameterId::DefaultLight, 1)]),
    );
    assert!(h.app.light().is_on());
    assert_eq!(h.board.brightness(), Some(5));
    assert_eq!(h.sink.events, vec![AppEvent::Started { light_on: true }]);
}

// ── Humidity control ──────────────────────────────────────────

#[test]
fn readings_follow_sensor_interval() {
    let mut h = initialised();
    h.run_until(4_999);
    assert_eq!(h.board.sensor_reads, 0);
    h.run_until(5_000);
    assert_eq!(h.board.sensor_reads, 1);
    h.run_until(15_000);
    assert_eq!(h.board.sensor_reads, 3);
    assert_eq!(h.app.tick_count(), 15_000);
    assert!(h.board.row(0).starts_with("21.0°C  H: 40%"));
}

#[test]
fn lock_holds_relay_through_humidity_dip() {
    let mut h = initialised();

    h.board.set_humidity(40.0);
    h.run_until(5_000);
    assert_eq!(h.board.relay(), Some(false));

    h.board.set_humidity(60.0);
    h.run_until(10_000);
    assert!(h.app.fan().state().humidity_lock);
    assert_eq!(h.board.relay(), Some(true));
    assert_eq!(h.board.row(1), "Fan is ON");

    h.board.set_humidity(40.0);
    h.run_until(15_000);
    assert_eq!(h.board.relay(), Some(true), "dwell not yet over");

    // Lock started at 10 s with a 1 min dwell: first dry reading at or
    // after 70 s releases it.
    h.run_until(69_999);
    assert_eq!(h.board.relay(), Some(true));
    h.run_until(70_000);
    assert_eq!(h.board.relay(), Some(false));

    let changes = h.sink.count(|e| matches!(e, AppEvent::FanStatusChanged { .. }));
    assert_eq!(changes, 2);
    assert_eq!(h.board.relay_writes(), 3, "boot release + on + off");
}

#[test]
fn budget_exhaustion_rests_the_fan() {
    let mut h = Harness::boot(
        SystemConfig::default(),
        MockEeprom::with(&[
            (ParameterId::FanMaxRunMinutes, 1),
            (ParameterId::FanRestMinutes, 1),
        ]),
    );
    h.board.set_humidity(60.0);

    h.run_until(5_000);
    assert_eq!(h.board.relay(), Some(true));
    h.run_until(59_999);
    assert_eq!(h.board.relay(), Some(true));

    h.run_until(60_000);
    assert_eq!(h.board.relay(), Some(false));
    assert_eq!(h.app.fan().status(), FanStatus::Resting);
    assert_eq!(h.board.row(1), "Fan resting");

    h.run_until(119_999);
    assert_eq!(h.board.relay(), Some(false));
    h.run_until(120_000);
    assert_eq!(h.board.relay(), Some(true));
    assert!(h.sink.events.contains(&AppEvent::FanStatusChanged {
        from: FanStatus::Resting,
        to: FanStatus::On,
    }));
}

#[test]
fn rest_is_deferred_while_light_is_on() {
    let mut h = Harness::boot(
        SystemConfig::default(),
        MockEeprom::with(&[
            (ParameterId::FanMaxRunMinutes, 1),
            (ParameterId::FanRestMinutes, 1),
            (ParameterId::LightLockMinutes, 0),
        ]),
    );
    h.board.set_humidity(60.0);
    h.press(ButtonId::Light);
    assert!(h.app.light().is_on());

    h.run_until(60_000);
    assert_eq!(h.app.fan().status(), FanStatus::Resting);

    // Rest period is over but the room is occupied.
    h.run_until(130_000);
    assert_eq!(h.board.relay(), Some(false));

    h.press(ButtonId::Light);
    h.run_until(135_000);
    assert_eq!(h.board.relay(), Some(true));
}

#[test]
fn sensor_fault_leaves_outputs_untouched() {
    let mut h = initialised();
    h.board.set_humidity(60.0);
    h.run_until(5_000);
    assert_eq!(h.board.relay(), Some(true));

    h.board.climate = Err(SensorError::Timeout);
    h.run_until(10_000);
    assert_eq!(h.board.relay(), Some(true));
    assert!(h.app.fan().state().humidity_lock);
    assert_eq!(h.board.row(0), "Sensor fault!");
    assert_eq!(
        h.sink.count(|e| *e == AppEvent::SensorFault(SensorError::Timeout)),
        1
    );
}

// ── Fan override ──────────────────────────────────────────────

#[test]
fn first_press_forces_off_when_idle() {
    let mut h = initialised();
    h.press(ButtonId::Fan);
    assert_eq!(h.app.fan().state().override_mode, OverrideMode::ForcedOff);
    assert!(h.sink.events.contains(&AppEvent::OverrideChanged(OverrideMode::ForcedOff)));

    // Humidity cannot turn a forced-off fan on.
    h.board.set_humidity(80.0);
    h.run_until(5_000);
    assert_eq!(h.board.relay(), Some(false));
    assert_eq!(h.board.row(1), "Fan forced OFF");

    h.press(ButtonId::Fan);
    assert_eq!(h.app.fan().state().override_mode, OverrideMode::Normal);
    h.run_until(10_000);
    assert_eq!(h.board.relay(), Some(true));
}

#[test]
fn forced_on_reverts_after_max_run() {
    let config = SystemConfig {
        override_policy: OverridePolicy::ForceOnFirst,
        ..SystemConfig::default()
    };
    let mut h = Harness::boot(
        config,
        MockEeprom::with(&[(ParameterId::FanMaxRunMinutes, 1)]),
    );

    h.press(ButtonId::Fan);
    assert_eq!(h.app.fan().status(), FanStatus::ForcedOn);
    assert_eq!(h.board.relay(), Some(true));

    h.run_until(59_000);
    assert_eq!(h.board.relay(), Some(true));

    h.run_until(61_000);
    assert_eq!(h.board.relay(), Some(false));
    assert_eq!(h.app.fan().state().override_mode, OverrideMode::Normal);
    assert_eq!(h.sink.count(|e| *e == AppEvent::OverrideExpired), 1);
}

#[test]
fn forced_on_while_humid_rests_after_max_run() {
    let config = SystemConfig {
        override_policy: OverridePolicy::ForceOnFirst,
        ..SystemConfig::default()
    };
    let mut h = Harness::boot(
        config,
        MockEeprom::with(&[
            (ParameterId::FanMaxRunMinutes, 1),
            (ParameterId::FanRestMinutes, 1),
        ]),
    );
    h.board.set_humidity(60.0);

    h.press(ButtonId::Fan);
    h.run_until(59_999);
    assert_eq!(h.app.fan().status(), FanStatus::ForcedOn);
    assert!(h.app.fan().state().humidity_lock);

    // The forced run spent the budget: rest, not another automatic run.
    h.run_until(60_000);
    assert_eq!(h.app.fan().status(), FanStatus::Resting);
    assert_eq!(h.board.relay(), Some(false));
    assert_eq!(h.board.row(1), "Fan resting");
    assert_eq!(h.app.fan().state().override_mode, OverrideMode::Normal);
    assert_eq!(h.sink.count(|e| *e == AppEvent::OverrideExpired), 1);

    h.run_until(119_999);
    assert_eq!(h.board.relay(), Some(false));
    h.run_until(120_000);
    assert_eq!(h.board.relay(), Some(true));
}

#[test]
fn override_cycles_through_all_modes() {
    let config = SystemConfig {
        override_policy: OverridePolicy::ForceOnFirst,
        ..SystemConfig::default()
    };
    let mut h = Harness::boot(config, MockEeprom::with(&[]));

    let mut modes = Vec::new();
    for _ in 0..3 {
        h.press(ButtonId::Fan);
        modes.push(h.app.fan().state().override_mode);
    }
    assert_eq!(
        modes,
        vec![
            OverrideMode::ForcedOn,
            OverrideMode::ForcedOff,
            OverrideMode::Normal
        ]
    );
    let relay: Vec<_> = h
        .board
        .calls
        .iter()
        .filter(|c| matches!(c, ActuatorCall::Relay(_)))
        .copied()
        .collect();
    assert_eq!(
        relay,
        vec![
            ActuatorCall::Relay(false),
            ActuatorCall::Relay(true),
            ActuatorCall::Relay(false)
        ]
    );
}

// ── Light ─────────────────────────────────────────────────────

#[test]
fn light_button_toggles_output() {
    let mut h = initialised();

    h.press(ButtonId::Light);
    assert!(h.app.light().is_on());
    assert_eq!(h.board.brightness(), Some(5));
    assert!(h.sink.events.contains(&AppEvent::LightChanged {
        on: true,
        cause: LightCause::Button,
    }));

    h.press(ButtonId::Light);
    assert!(!h.app.light().is_on());
    assert_eq!(h.board.brightness(), Some(0));
}

#[test]
fn held_light_button_toggles_once() {
    let mut h = initialised();
    h.hold(ButtonId::Light, 3_000);
    h.run_ms(100);
    let toggles = h.sink.count(|e| matches!(e, AppEvent::LightChanged { .. }));
    assert_eq!(toggles, 1);
}

#[test]
fn motion_turns_light_on_and_timeout_turns_it_off() {
    let mut h = Harness::boot(
        SystemConfig::default(),
        MockEeprom::with(&[(ParameterId::LightLockMinutes, 1)]),
    );

    h.board.motion = Level::High;
    h.run_until(1_000);
    assert!(h.app.light().is_on());
    assert_eq!(h.board.brightness(), Some(5));
    assert!(h.sink.events.contains(&AppEvent::LightChanged {
        on: true,
        cause: LightCause::Motion,
    }));

    // Last motion seen at the 1 s poll; quiet from the 2 s poll onwards.
    h.run_until(1_500);
    h.board.motion = Level::Low;
    h.run_until(61_999);
    assert!(h.app.light().is_on());

    h.run_until(62_000);
    assert!(!h.app.light().is_on());
    assert_eq!(h.board.brightness(), Some(0));
    assert!(h.sink.events.contains(&AppEvent::LightChanged {
        on: false,
        cause: LightCause::Timeout,
    }));
}

#[test]
fn no_auto_off_during_calibration() {
    let mut h = Harness::boot(
        SystemConfig {
            motion_calibration_ms: 120_000,
            ..SystemConfig::default()
        },
        MockEeprom::with(&[
            (ParameterId::LightLockMinutes, 1),
            (ParameterId::DefaultLight, 1),
        ]),
    );

    h.run_until(119_000);
    assert!(h.app.light().is_on());
    h.run_until(120_000);
    assert!(!h.app.light().is_on());
}

#[test]
fn zero_light_timeout_never_auto_offs() {
    let mut h = Harness::boot(
        SystemConfig::default(),
        MockEeprom::with(&[
            (ParameterId::LightLockMinutes, 0),
            (ParameterId::DefaultLight, 1),
        ]),
    );
    h.run_until(200_000);
    assert!(h.app.light().is_on());
}

#[test]
fn motion_ignored_without_pir() {
    let mut h = Harness::boot(
        SystemConfig {
            motion_enabled: false,
            ..SystemConfig::default()
        },
        MockEeprom::with(&[]),
    );
    h.board.motion = Level::High;
    h.run_until(5_000);
    assert!(!h.app.light().is_on());
}
