//! Light controller: manual toggle plus PIR-driven auto-off.
//!
//! The toggle button and the motion sensor both write the same output;
//! whichever acted last wins. Motion is sampled on its own slow cadence
//! (the caller decides when), not every tick.
//!
//! Auto-off fires only when all of these hold:
//! - the light is on,
//! - the PIR has read LOW continuously for at least the light timeout,
//! - the PIR calibration grace period since boot has passed.

use log::info;

use crate::app::ports::Level;
use crate::timing::has_elapsed;

/// Who last changed the light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCause {
    Button,
    Motion,
    Timeout,
}

pub struct LightController {
    on: bool,
    /// Start of the current continuous no-motion stretch.
    no_motion_since: Option<u32>,
    boot_ms: u32,
    calibration_ms: u32,
    /// Latched once the grace period has passed, so it never comes back
    /// when the millisecond counter wraps.
    calibrated: bool,
}

impl LightController {
    pub fn new(initially_on: bool, boot_ms: u32, calibration_ms: u32) -> Self {
        Self {
            on: initially_on,
            no_motion_since: None,
            boot_ms,
            calibration_ms,
            calibrated: calibration_ms == 0,
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn no_motion_since(&self) -> Option<u32> {
        self.no_motion_since
    }

    /// PWM level for the light given the configured brightness.
    pub fn output_level(&self, brightness: u8) -> u8 {
        if self.on { brightness } else { 0 }
    }

    /// Manual toggle. Turning on restarts the no-motion timer so a light
    /// switched on in an empty room gets a full timeout.
    pub fn toggle(&mut self, now_ms: u32) -> bool {
        self.on = !self.on;
        if self.on && self.no_motion_since.is_some() {
            self.no_motion_since = Some(now_ms);
        }
        info!("light: button -> {}", if self.on { "ON" } else { "OFF" });
        self.on
    }

    /// Apply one PIR sample. `timeout_ms == 0` disables auto-off.
    /// Returns the cause if the light changed.
    pub fn on_motion(&mut self, level: Level, timeout_ms: u32, now_ms: u32) -> Option<LightCause> {
        match level {
            Level::High => {
                self.no_motion_since = None;
                if self.on {
                    return None;
                }
                self.on = true;
                info!("light: motion -> ON");
                Some(LightCause::Motion)
            }
            Level::Low => {
                let since = *self.no_motion_since.get_or_insert(now_ms);
                if !self.calibrated && has_elapsed(now_ms, self.boot_ms, self.calibration_ms) {
                    self.calibrated = true;
                }
                if self.on
                    && timeout_ms != 0
                    && self.calibrated
                    && has_elapsed(now_ms, since, timeout_ms)
                {
                    self.on = false;
                    info!("light: no motion for {} ms -> OFF", timeout_ms);
                    return Some(LightCause::Timeout);
                }
                None
            }
        }
    }
}
