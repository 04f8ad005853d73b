//! Application service, the hexagonal core.
//!
//! [`AppService`] owns every piece of controller state (settings mirror,
//! menu cursor, fan and light controllers, button edge trackers) and
//! advances all of it in a single [`tick`](AppService::tick). All I/O
//! flows through port traits injected at call sites, so the whole service
//! runs against mock adapters and simulated time.
//!
//! ```text
//!   InputPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!  SensorPort ──▶ │        AppService        │ ──▶ DisplayPort
//!   ClockPort ──▶ │ Buttons · Menu · Fan ·   │ ──▶ ActuatorPort
//!   ByteStore ◀──▶│ Light · Settings         │
//!                 └──────────────────────────┘
//! ```
//!
//! ## Per-tick order
//!
//! 1. Poll every button.
//! 2. Fan override and light toggle, in any mode.
//! 3. Forced-on ceiling and run budget, in any mode.
//! 4. Settings press (at most one menu transition), else up/down while
//!    editing, else the sensor interval while not editing.
//! 5. PIR poll on its own cadence, in any mode.
//! 6. Resolve the fan status and write the relay if it changed. This is
//!    the only place the relay is written.
//!
//! A forced-on run that ends in steps 3 or 4, by its ceiling or by an
//! empty budget, is reported once as [`AppEvent::OverrideExpired`].

use log::{info, warn};

use crate::config::SystemConfig;
use crate::control::fan::{FanController, FanParams, FanStatus, OverrideMode};
use crate::control::light::{LightCause, LightController};
use crate::drivers::button::{ButtonEvent, DebouncedButton};
use crate::menu::{MenuStep, SettingsMenu};
use crate::settings::{Adjust, ParameterId, ParameterValue, SettingsStore};
use crate::timing::{elapsed_ms, has_elapsed};

use super::display;
use super::events::{AppEvent, TelemetryData};
use super::ports::{
    ActuatorPort, ButtonId, ByteStore, ClockPort, DisplayPort, EventSink, InputPort, SensorPort,
};

// ───────────────────────────────────────────────────────────────
// Button bank
// ───────────────────────────────────────────────────────────────

/// One debounced tracker per panel button, indexed by [`ButtonId::index`].
struct ButtonBank {
    buttons: [DebouncedButton; ButtonId::COUNT],
}

impl ButtonBank {
    fn new(config: &SystemConfig) -> Self {
        let plain = |id| DebouncedButton::new(id, config.debounce_ms);
        let repeating =
            |id| DebouncedButton::with_repeat(id, config.debounce_ms, config.repeat_interval_ms);
        Self {
            buttons: ButtonId::ALL.map(|id| match id {
                ButtonId::Up | ButtonId::Down => repeating(id),
                ButtonId::Settings | ButtonId::Light | ButtonId::Fan => plain(id),
            }),
        }
    }

    /// Sample every button once.
    fn poll(&mut self, input: &mut impl InputPort, now_ms: u32) -> ButtonEvents {
        let mut events = ButtonEvents::default();
        for button in &mut self.buttons {
            let id = button.id();
            events.0[id.index()] = button.poll(input.read_button(id), now_ms);
        }
        events
    }
}

#[derive(Default)]
struct ButtonEvents([Option<ButtonEvent>; ButtonId::COUNT]);

impl ButtonEvents {
    fn get(&self, id: ButtonId) -> Option<ButtonEvent> {
        self.0[id.index()]
    }

    fn pressed(&self, id: ButtonId) -> bool {
        self.get(id) == Some(ButtonEvent::Pressed)
    }

    /// Up/down fire on the initial press and on every hold repeat.
    fn adjust(&self) -> Option<Adjust> {
        if self.get(ButtonId::Up).is_some() {
            Some(Adjust::Up)
        } else if self.get(ButtonId::Down).is_some() {
            Some(Adjust::Down)
        } else {
            None
        }
    }
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    settings: SettingsStore,
    menu: SettingsMenu,
    fan: FanController,
    light: LightController,
    buttons: ButtonBank,
    last_sensor_read_ms: u32,
    last_motion_poll_ms: u32,
    /// Last value written to the relay; `None` forces the next write.
    relay_applied: Option<bool>,
    last_fan_status: FanStatus,
    tick_count: u64,
}

impl AppService {
    // ── Lifecycle ─────────────────────────────────────────────

    /// Load settings and bring every output to its boot state: contrast
    /// applied, light on at the configured brightness iff `DefaultLight`,
    /// relay released.
    pub fn boot(
        config: SystemConfig,
        storage: &mut impl ByteStore,
        hw: &mut (impl ActuatorPort + DisplayPort),
        sink: &mut impl EventSink,
        clock: &impl ClockPort,
    ) -> Self {
        let now = clock.now_ms();
        let settings = SettingsStore::load(storage);

        hw.set_contrast(settings.raw(ParameterId::Contrast));

        let light = LightController::new(
            settings.flag(ParameterId::DefaultLight),
            now,
            config.motion_calibration_ms,
        );
        hw.set_brightness(light.output_level(settings.raw(ParameterId::Brightness)));

        let fan = FanController::new(
            config.override_policy,
            config.defers_rest(),
            settings.duration_ms(ParameterId::FanMaxRunMinutes),
        );
        hw.set_fan_relay(false);

        display::show_fan_status(hw, fan.status());

        let app = Self {
            buttons: ButtonBank::new(&config),
            last_fan_status: fan.status(),
            config,
            settings,
            menu: SettingsMenu::new(),
            fan,
            light,
            last_sensor_read_ms: now,
            last_motion_poll_ms: now,
            relay_applied: Some(false),
            tick_count: 0,
        };

        sink.emit(&AppEvent::Started {
            light_on: app.light.is_on(),
        });
        info!(
            "AppService started (light {}, policy {:?})",
            if app.light.is_on() { "ON" } else { "OFF" },
            app.config.override_policy
        );
        app
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one pass of the main cycle.
    ///
    /// The `hw` parameter satisfies every device-facing port at once; this
    /// avoids multiple mutable borrows of one board while keeping the port
    /// boundary explicit.
    pub fn tick(
        &mut self,
        hw: &mut (impl InputPort + SensorPort + ActuatorPort + DisplayPort),
        storage: &mut impl ByteStore,
        sink: &mut impl EventSink,
        clock: &impl ClockPort,
    ) {
        self.tick_count += 1;
        let now = clock.now_ms();

        // 1. Buttons
        let events = self.buttons.poll(hw, now);

        // 2. Manual triggers, valid in every mode
        if events.pressed(ButtonId::Fan) {
            let mode = self.fan.press_override(now);
            sink.emit(&AppEvent::OverrideChanged(mode));
        }
        if events.pressed(ButtonId::Light) {
            let on = self.light.toggle(now);
            self.apply_light(hw);
            sink.emit(&AppEvent::LightChanged {
                on,
                cause: LightCause::Button,
            });
        }

        // 3. Run ceilings
        let was_forced = self.fan.state().override_mode == OverrideMode::ForcedOn;
        let max_run_ms = self.settings.duration_ms(ParameterId::FanMaxRunMinutes);
        self.fan.enforce_forced_ceiling(max_run_ms, now);
        self.fan.enforce_run_budget(now);

        // 4. Menu or normal mode
        if events.pressed(ButtonId::Settings) {
            self.on_settings_pressed(hw, storage, sink);
        } else if self.menu.is_active() {
            if let Some(dir) = events.adjust() {
                self.on_adjust(hw, sink, dir);
            }
        } else if has_elapsed(now, self.last_sensor_read_ms, self.config.sensor_interval_ms) {
            self.sensor_interval(hw, sink, now);
        }
        if was_forced && self.fan.state().override_mode != OverrideMode::ForcedOn {
            sink.emit(&AppEvent::OverrideExpired);
        }

        // 5. Motion
        if self.config.motion_enabled
            && has_elapsed(now, self.last_motion_poll_ms, self.config.motion_poll_interval_ms)
        {
            self.last_motion_poll_ms = now;
            self.poll_motion(hw, sink, now);
        }

        // 6. Single relay writer
        self.apply_fan(hw, sink);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn menu(&self) -> &SettingsMenu {
        &self.menu
    }

    pub fn fan(&self) -> &FanController {
        &self.fan
    }

    pub fn light(&self) -> &LightController {
        &self.light
    }

    /// Relay state last written to the actuator.
    pub fn relay_on(&self) -> bool {
        self.relay_applied.unwrap_or(false)
    }

    /// Total main-cycle passes since boot.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn on_settings_pressed(
        &mut self,
        hw: &mut (impl ActuatorPort + DisplayPort),
        storage: &mut impl ByteStore,
        sink: &mut impl EventSink,
    ) {
        match self.menu.settings_pressed(&mut self.settings, storage) {
            MenuStep::Opened(id, value) => {
                sink.emit(&AppEvent::MenuOpened);
                sink.emit(&AppEvent::ParameterSelected(id, value));
                display::show_parameter(hw, id, value);
            }
            MenuStep::Advanced(id, value) => {
                sink.emit(&AppEvent::ParameterSelected(id, value));
                display::show_parameter(hw, id, value);
            }
            MenuStep::Closed(report) => {
                if report.failed > 0 {
                    warn!("{} setting(s) not persisted, retrying on next save", report.failed);
                }
                display::show_saving(hw);
                // Undo any brightness preview.
                self.apply_light(hw);
                sink.emit(&AppEvent::SettingsSaved(report));
            }
        }
    }

    fn on_adjust(
        &mut self,
        hw: &mut (impl ActuatorPort + DisplayPort),
        sink: &mut impl EventSink,
        dir: Adjust,
    ) {
        let Some((id, value)) = self.menu.adjust(&mut self.settings, dir) else {
            return;
        };

        // Live preview, independent of the eventual flush.
        match (id, value) {
            (ParameterId::Brightness, ParameterValue::Integer(level)) => hw.set_brightness(level),
            (ParameterId::Contrast, ParameterValue::Integer(level)) => hw.set_contrast(level),
            _ => {}
        }

        display::show_value(hw, id, value);
        sink.emit(&AppEvent::ParameterAdjusted(id, value));
    }

    fn sensor_interval(
        &mut self,
        hw: &mut (impl SensorPort + DisplayPort),
        sink: &mut impl EventSink,
        now: u32,
    ) {
        let elapsed = elapsed_ms(now, self.last_sensor_read_ms);
        self.last_sensor_read_ms = now;

        let reading = match hw.read_climate() {
            Ok(r) => r,
            Err(e) => {
                // Fail-safe: leave fan and light exactly as they are.
                warn!("sensor read failed: {}", e);
                display::show_sensor_fault(hw);
                sink.emit(&AppEvent::SensorFault(e));
                return;
            }
        };

        let params = FanParams::from_settings(&self.settings);
        let status = self.fan.on_reading(
            reading.humidity,
            &params,
            self.light.is_on(),
            elapsed,
            now,
        );

        hw.clear();
        display::show_climate(hw, reading.humidity, reading.temperature);
        display::show_fan_status(hw, status);

        let state = self.fan.state();
        sink.emit(&AppEvent::Telemetry(TelemetryData {
            humidity: reading.humidity,
            temperature: reading.temperature,
            fan: status,
            override_mode: state.override_mode,
            humidity_lock: state.humidity_lock,
            run_budget_ms: state.remaining_run_budget_ms,
            light_on: self.light.is_on(),
        }));
    }

    fn poll_motion(
        &mut self,
        hw: &mut (impl InputPort + ActuatorPort),
        sink: &mut impl EventSink,
        now: u32,
    ) {
        let level = hw.read_motion();
        let timeout_ms = self.settings.duration_ms(ParameterId::LightLockMinutes);
        if let Some(cause) = self.light.on_motion(level, timeout_ms, now) {
            self.apply_light(hw);
            sink.emit(&AppEvent::LightChanged {
                on: self.light.is_on(),
                cause,
            });
        }
    }

    fn apply_light(&self, hw: &mut impl ActuatorPort) {
        let brightness = self.settings.raw(ParameterId::Brightness);
        hw.set_brightness(self.light.output_level(brightness));
    }

    fn apply_fan(&mut self, hw: &mut (impl ActuatorPort + DisplayPort), sink: &mut impl EventSink) {
        let status = self.fan.status();
        if status != self.last_fan_status {
            sink.emit(&AppEvent::FanStatusChanged {
                from: self.last_fan_status,
                to: status,
            });
            self.last_fan_status = status;
            if !self.menu.is_active() {
                display::show_fan_status(hw, status);
            }
        }

        let on = status.relay_on();
        if self.relay_applied != Some(on) {
            hw.set_fan_relay(on);
            self.relay_applied = Some(on);
        }
    }
}
