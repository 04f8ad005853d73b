//! Fan controller: humidity hysteresis, manual override, duty-cycle rest.
//!
//! ## Decision order
//!
//! The relay state is resolved once per tick from three layers, highest
//! priority first:
//!
//! | Override   | Lock | Protection | Relay | Status       |
//! |------------|------|------------|-------|--------------|
//! | ForcedOn   | -    | -          | on    | `ForcedOn`   |
//! | ForcedOff  | -    | -          | off   | `ForcedOff`  |
//! | Normal     | yes  | no         | on    | `On`         |
//! | Normal     | yes  | yes        | off   | `Resting`    |
//! | Normal     | no   | -          | off   | `Off`        |
//!
//! ## Run budget
//!
//! Any running, automatic or forced on, draws down `remaining_run_budget_ms`;
//! idle time refills it up to the configured maximum. An empty budget starts
//! a rest period that lasts at least `fan_rest_minutes` and, when rest
//! deferral is on, until the light goes off. A forced-on run that empties
//! the budget reverts to automatic, so it lands in `Resting` when the
//! humidity lock is held.
//!
//! Forcing the fan on during a rest is allowed. It is bounded by the
//! forced-on ceiling alone, and the rest period restarts when it ends.

use log::{info, warn};

use crate::config::OverridePolicy;
use crate::settings::{ParameterId, SettingsStore};
use crate::timing::{elapsed_ms, has_elapsed};

/// Manual override layered on top of humidity control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideMode {
    Normal,
    ForcedOn,
    ForcedOff,
}

/// What the fan is doing and why. Drives the relay and the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanStatus {
    On,
    Off,
    Resting,
    ForcedOn,
    ForcedOff,
}

impl FanStatus {
    pub const fn relay_on(self) -> bool {
        matches!(self, Self::On | Self::ForcedOn)
    }
}

/// Fan-related parameters, read from the settings mirror each interval so
/// menu edits take effect on the next reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FanParams {
    /// Lock engages strictly above this relative humidity (%).
    pub threshold: f32,
    /// Minimum lock dwell; `0` disables the lock entirely.
    pub lock_ms: u32,
    pub max_run_ms: u32,
    pub rest_ms: u32,
}

impl FanParams {
    pub fn from_settings(settings: &SettingsStore) -> Self {
        Self {
            threshold: f32::from(settings.raw(ParameterId::HumidityThreshold)),
            lock_ms: settings.duration_ms(ParameterId::FanLockMinutes),
            max_run_ms: settings.duration_ms(ParameterId::FanMaxRunMinutes),
            rest_ms: settings.duration_ms(ParameterId::FanRestMinutes),
        }
    }
}

/// Complete fan state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FanState {
    pub humidity_lock: bool,
    pub lock_started_at: Option<u32>,
    pub override_mode: OverrideMode,
    pub forced_on_since: Option<u32>,
    pub protection_active: bool,
    /// Never above the configured maximum; may go negative by at most one
    /// interval before protection engages.
    pub remaining_run_budget_ms: i64,
    pub protection_started_at: Option<u32>,
    /// When the budget was last charged or refilled.
    pub budget_charged_at: Option<u32>,
}

pub struct FanController {
    state: FanState,
    policy: OverridePolicy,
    defer_rest: bool,
}

impl FanController {
    pub fn new(policy: OverridePolicy, defer_rest: bool, max_run_ms: u32) -> Self {
        Self {
            state: FanState {
                humidity_lock: false,
                lock_started_at: None,
                override_mode: OverrideMode::Normal,
                forced_on_since: None,
                protection_active: false,
                remaining_run_budget_ms: i64::from(max_run_ms),
                protection_started_at: None,
                budget_charged_at: None,
            },
            policy,
            defer_rest,
        }
    }

    pub fn state(&self) -> &FanState {
        &self.state
    }

    /// Resolved output, in the priority order of the module table.
    pub fn status(&self) -> FanStatus {
        let s = &self.state;
        match s.override_mode {
            OverrideMode::ForcedOn => FanStatus::ForcedOn,
            OverrideMode::ForcedOff => FanStatus::ForcedOff,
            OverrideMode::Normal if !s.humidity_lock => FanStatus::Off,
            OverrideMode::Normal if s.protection_active => FanStatus::Resting,
            OverrideMode::Normal => FanStatus::On,
        }
    }

    pub fn relay_on(&self) -> bool {
        self.status().relay_on()
    }

    /// Feed one humidity reading.
    ///
    /// `elapsed_ms` is the time since the previous reading; it is what the
    /// run budget is charged or refilled with. `light_on` only matters when
    /// rest deferral is enabled.
    pub fn on_reading(
        &mut self,
        humidity: f32,
        params: &FanParams,
        light_on: bool,
        elapsed_ms: u32,
        now_ms: u32,
    ) -> FanStatus {
        self.update_lock(humidity, params, now_ms);
        self.update_rest(params, light_on, now_ms);
        self.charge_budget(params, elapsed_ms, now_ms);
        self.status()
    }

    /// The override button was pressed. Returns the new mode.
    pub fn press_override(&mut self, now_ms: u32) -> OverrideMode {
        let s = &self.state;
        let next = match s.override_mode {
            OverrideMode::Normal => match self.policy {
                OverridePolicy::ForceOffWhenIdle if !s.humidity_lock && !s.protection_active => {
                    OverrideMode::ForcedOff
                }
                _ => OverrideMode::ForcedOn,
            },
            OverrideMode::ForcedOn => OverrideMode::ForcedOff,
            OverrideMode::ForcedOff => OverrideMode::Normal,
        };
        self.set_override(next, now_ms);
        info!("fan: override -> {:?}", next);
        next
    }

    /// Revert a forced-on override that has run for `max_run_ms`.
    /// Checked every tick, independent of the sensor cadence.
    pub fn enforce_forced_ceiling(&mut self, max_run_ms: u32, now_ms: u32) -> bool {
        match self.state.forced_on_since {
            Some(since) if has_elapsed(now_ms, since, max_run_ms) => {
                warn!(
                    "fan: forced ON for {} ms, reverting to automatic",
                    elapsed_ms(now_ms, since)
                );
                self.set_override(OverrideMode::Normal, now_ms);
                true
            }
            _ => false,
        }
    }

    /// Stop a run whose budget ran out since the last charge. Checked every
    /// tick so a run stays bounded while readings are suspended.
    pub fn enforce_run_budget(&mut self, now_ms: u32) -> bool {
        let s = &self.state;
        if s.protection_active || !self.relay_on() {
            return false;
        }
        let Some(charged_at) = s.budget_charged_at else {
            return false;
        };
        let spent = i64::from(elapsed_ms(now_ms, charged_at));
        if spent < s.remaining_run_budget_ms {
            return false;
        }
        self.state.remaining_run_budget_ms -= spent;
        self.state.budget_charged_at = Some(now_ms);
        self.enter_protection(now_ms);
        true
    }

    // ── Internal ──────────────────────────────────────────────

    fn set_override(&mut self, mode: OverrideMode, now_ms: u32) {
        let s = &mut self.state;
        // A forced run during rest is not rest.
        if s.protection_active
            && s.override_mode == OverrideMode::ForcedOn
            && mode != OverrideMode::ForcedOn
        {
            s.protection_started_at = Some(now_ms);
        }
        s.override_mode = mode;
        s.forced_on_since = (mode == OverrideMode::ForcedOn).then_some(now_ms);
    }

    fn enter_protection(&mut self, now_ms: u32) {
        let s = &mut self.state;
        s.protection_active = true;
        s.protection_started_at = Some(now_ms);
        if s.override_mode == OverrideMode::ForcedOn {
            s.override_mode = OverrideMode::Normal;
            s.forced_on_since = None;
            warn!("fan: run budget exhausted while forced ON, reverting to automatic");
        } else {
            warn!("fan: run budget exhausted, resting");
        }
    }

    fn update_lock(&mut self, humidity: f32, params: &FanParams, now_ms: u32) {
        let s = &mut self.state;
        if !s.humidity_lock {
            if humidity > params.threshold && params.lock_ms != 0 {
                s.humidity_lock = true;
                s.lock_started_at = Some(now_ms);
                info!("fan: humidity {:.1}% > {:.0}%, locked on", humidity, params.threshold);
            }
            return;
        }

        let dwell_done = s
            .lock_started_at
            .is_none_or(|t| has_elapsed(now_ms, t, params.lock_ms));
        if humidity <= params.threshold && dwell_done {
            s.humidity_lock = false;
            s.lock_started_at = None;
            info!("fan: humidity {:.1}% back under threshold, unlocked", humidity);
        }
    }

    fn update_rest(&mut self, params: &FanParams, light_on: bool, now_ms: u32) {
        let s = &mut self.state;
        if !s.protection_active || s.override_mode == OverrideMode::ForcedOn {
            return;
        }
        let rested = s
            .protection_started_at
            .is_none_or(|t| has_elapsed(now_ms, t, params.rest_ms));
        let occupied = self.defer_rest && light_on;
        if rested && !occupied {
            s.protection_active = false;
            s.protection_started_at = None;
            s.remaining_run_budget_ms = i64::from(params.max_run_ms);
            info!("fan: rest complete, budget restored");
        }
    }

    fn charge_budget(&mut self, params: &FanParams, elapsed_ms: u32, now_ms: u32) {
        let max = i64::from(params.max_run_ms);
        let status = self.status();
        let s = &mut self.state;
        s.budget_charged_at = Some(now_ms);
        match status {
            // Forced on during a rest: the budget is already spent.
            FanStatus::ForcedOn if s.protection_active => {}
            FanStatus::On | FanStatus::ForcedOn => {
                s.remaining_run_budget_ms =
                    s.remaining_run_budget_ms.min(max) - i64::from(elapsed_ms);
                if s.remaining_run_budget_ms <= 0 {
                    self.enter_protection(now_ms);
                }
            }
            FanStatus::Off | FanStatus::Resting | FanStatus::ForcedOff => {
                s.remaining_run_budget_ms =
                    (s.remaining_run_budget_ms + i64::from(elapsed_ms)).min(max);
            }
        }
    }
}
