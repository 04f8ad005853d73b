//! Text layout for the 2x16 character display.
//!
//! Parameter labels live here rather than in [`crate::settings`]: the
//! control core only knows parameters by [`ParameterId`].

use core::fmt::Write;

use heapless::String;

use super::ports::{DISPLAY_COLS, DisplayPort};
use crate::control::fan::FanStatus;
use crate::settings::{ParameterId, ParameterValue, Unit};

/// One display row. Sized in bytes, so it has headroom for multi-byte
/// glyphs like `°`.
pub type Line = String<32>;

pub fn label(id: ParameterId) -> &'static str {
    match id {
        ParameterId::Brightness => "Brightness",
        ParameterId::Contrast => "Contrast",
        ParameterId::HumidityThreshold => "Humidity",
        ParameterId::DefaultLight => "Default light",
        ParameterId::FanLockMinutes => "Fan lock",
        ParameterId::FanMaxRunMinutes => "Fan max run",
        ParameterId::FanRestMinutes => "Fan rest",
        ParameterId::LightLockMinutes => "Light timeout",
    }
}

/// Render a parameter value with its unit.
pub fn format_value(id: ParameterId, value: ParameterValue) -> Line {
    let mut line = Line::new();
    let _ = match (value, id.spec().unit) {
        (ParameterValue::Boolean(on), _) => line.write_str(if on { "ON" } else { "OFF" }),
        (ParameterValue::Integer(v), Unit::Minutes) => write!(line, "{} min", v),
        (ParameterValue::Integer(v), Unit::Percent) => write!(line, "{}%", v),
        (ParameterValue::Integer(v), Unit::None) => write!(line, "{}", v),
    };
    line
}

/// Pad `text` with spaces to the full row width so stale characters from
/// the previous frame are overwritten.
pub fn padded(text: &str) -> Line {
    let mut line = Line::new();
    let _ = line.push_str(text);
    while line.chars().count() < DISPLAY_COLS {
        if line.push(' ').is_err() {
            break;
        }
    }
    line
}

pub fn fan_status_text(status: FanStatus) -> &'static str {
    match status {
        FanStatus::On => "Fan is ON",
        FanStatus::Off => "Fan is OFF",
        FanStatus::Resting => "Fan resting",
        FanStatus::ForcedOn => "Fan forced ON",
        FanStatus::ForcedOff => "Fan forced OFF",
    }
}

pub fn climate_line(humidity: f32, temperature: f32) -> Line {
    let mut line = Line::new();
    let _ = write!(line, "{:.1}\u{b0}C  H: {:.0}%", temperature, humidity);
    padded(&line)
}

/// Menu page: label on row 0, value on row 1.
pub fn show_parameter(display: &mut impl DisplayPort, id: ParameterId, value: ParameterValue) {
    display.clear();
    display.write_at(0, 0, label(id));
    display.write_at(0, 1, &format_value(id, value));
}

/// Refresh only the value row while editing.
pub fn show_value(display: &mut impl DisplayPort, id: ParameterId, value: ParameterValue) {
    display.write_at(0, 1, &padded(&format_value(id, value)));
}

pub fn show_saving(display: &mut impl DisplayPort) {
    display.clear();
    display.write_at(0, 0, "Saving");
    display.write_at(0, 1, "settings...");
}

pub fn show_climate(display: &mut impl DisplayPort, humidity: f32, temperature: f32) {
    display.write_at(0, 0, &climate_line(humidity, temperature));
}

pub fn show_fan_status(display: &mut impl DisplayPort, status: FanStatus) {
    display.write_at(0, 1, &padded(fan_status_text(status)));
}

pub fn show_sensor_fault(display: &mut impl DisplayPort) {
    display.write_at(0, 0, &padded("Sensor fault!"));
}
