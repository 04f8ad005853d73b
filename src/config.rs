//! System configuration parameters
//!
//! Boot-time timing and policy knobs for the controller. These are not the
//! user-adjustable parameters (see [`crate::settings`]); they describe how
//! this particular appliance build behaves and are loaded once at boot.

use serde::{Deserialize, Serialize};

/// What the first press of the fan override button does from `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverridePolicy {
    /// Force OFF first when the fan is idle (unlocked and not resting),
    /// otherwise force ON.
    ForceOffWhenIdle,
    /// Always force ON first.
    ForceOnFirst,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Main cycle period (milliseconds)
    pub tick_interval_ms: u32,
    /// Sensor read interval in normal mode (milliseconds)
    pub sensor_interval_ms: u32,
    /// Button debounce window (milliseconds)
    pub debounce_ms: u32,
    /// Hold-to-repeat interval for the adjust buttons (milliseconds)
    pub repeat_interval_ms: u32,

    // --- Motion ---
    /// Whether this build has a PIR motion sensor fitted
    pub motion_enabled: bool,
    /// PIR polling cadence (milliseconds)
    pub motion_poll_interval_ms: u32,
    /// PIR calibration grace period after boot (milliseconds)
    pub motion_calibration_ms: u32,

    // --- Fan ---
    /// First override press behaviour
    pub override_policy: OverridePolicy,
    /// Defer the end of a fan rest period while the light is on
    pub rest_deferral: bool,
    /// Relay module energises on a LOW input
    pub relay_active_low: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            tick_interval_ms: 1,
            sensor_interval_ms: 5_000,
            debounce_ms: 50,
            repeat_interval_ms: 500,

            // Motion
            motion_enabled: true,
            motion_poll_interval_ms: 1_000,
            motion_calibration_ms: 30_000,

            // Fan
            override_policy: OverridePolicy::ForceOffWhenIdle,
            rest_deferral: true,
            relay_active_low: true,
        }
    }
}

impl SystemConfig {
    /// Whether the fan rest period waits for the light to go off.
    ///
    /// Only meaningful on builds with a motion sensor; without one the light
    /// is purely manual and says nothing about occupancy.
    pub fn defers_rest(&self) -> bool {
        self.rest_deferral && self.motion_enabled
    }
}
