//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::display;
use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | H={:.1}% T={:.1}\u{00b0}C | fan={:?} override={:?} lock={} \
                     budget={}ms | light={}",
                    t.humidity,
                    t.temperature,
                    t.fan,
                    t.override_mode,
                    t.humidity_lock,
                    t.run_budget_ms,
                    if t.light_on { "ON" } else { "OFF" },
                );
            }
            AppEvent::Started { light_on } => {
                info!("START | light={}", if *light_on { "ON" } else { "OFF" });
            }
            AppEvent::MenuOpened => {
                info!("MENU  | opened");
            }
            AppEvent::ParameterSelected(id, value) => {
                info!(
                    "MENU  | {} = {}",
                    display::label(*id),
                    display::format_value(*id, *value)
                );
            }
            AppEvent::ParameterAdjusted(id, value) => {
                info!(
                    "MENU  | {} -> {}",
                    display::label(*id),
                    display::format_value(*id, *value)
                );
            }
            AppEvent::SettingsSaved(report) => {
                info!(
                    "MENU  | closed, {} slot(s) written, {} failed",
                    report.written, report.failed
                );
            }
            AppEvent::FanStatusChanged { from, to } => {
                info!("FAN   | {:?} -> {:?}", from, to);
            }
            AppEvent::OverrideChanged(mode) => {
                info!("FAN   | override {:?}", mode);
            }
            AppEvent::OverrideExpired => {
                warn!("FAN   | forced ON hit max run time, back to automatic");
            }
            AppEvent::LightChanged { on, cause } => {
                info!(
                    "LIGHT | {} ({:?})",
                    if *on { "ON" } else { "OFF" },
                    cause
                );
            }
            AppEvent::SensorFault(e) => {
                warn!("FAULT | sensor: {}", e);
            }
        }
    }
}
