//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log, test recorder).

use crate::control::fan::{FanStatus, OverrideMode};
use crate::control::light::LightCause;
use crate::error::SensorError;
use crate::settings::{FlushReport, ParameterId, ParameterValue};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Boot finished; carries the initial light state.
    Started { light_on: bool },

    /// The settings menu opened on its first parameter.
    MenuOpened,

    /// The cursor moved to a parameter.
    ParameterSelected(ParameterId, ParameterValue),

    /// A parameter was stepped up/down.
    ParameterAdjusted(ParameterId, ParameterValue),

    /// The menu closed and settings were written back.
    SettingsSaved(FlushReport),

    /// The resolved fan output changed.
    FanStatusChanged { from: FanStatus, to: FanStatus },

    /// The override button cycled the override mode.
    OverrideChanged(OverrideMode),

    /// A forced-on override hit the run-time ceiling or emptied the run
    /// budget, and reverted.
    OverrideExpired,

    /// The light switched.
    LightChanged { on: bool, cause: LightCause },

    /// A sensor read failed; the interval was skipped.
    SensorFault(SensorError),

    /// Snapshot after each good sensor reading.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    pub humidity: f32,
    pub temperature: f32,
    pub fan: FanStatus,
    pub override_mode: OverrideMode,
    pub humidity_lock: bool,
    pub run_budget_ms: i64,
    pub light_on: bool,
}
