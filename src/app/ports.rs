//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (buttons, sensors, relay/PWM, display, byte storage,
//! clock, event sinks) implement these traits. The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware directly and tests can inject
//! simulated time.

use crate::config::SystemConfig;
use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Digital inputs (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Logic level of a digital input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    High,
    Low,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

/// The physical buttons on the front panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ButtonId {
    /// Enters, advances through, and leaves the settings menu.
    Settings,
    /// Increments (or toggles) the selected parameter.
    Up,
    /// Decrements (or toggles) the selected parameter.
    Down,
    /// Toggles the light.
    Light,
    /// Cycles the fan override mode.
    Fan,
}

impl ButtonId {
    pub const COUNT: usize = 5;

    pub const ALL: [Self; Self::COUNT] =
        [Self::Settings, Self::Up, Self::Down, Self::Light, Self::Fan];

    /// Position in [`Self::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Raw, undebounced levels of the panel buttons and the PIR sensor.
/// Sampled every tick.
pub trait InputPort {
    fn read_button(&mut self, button: ButtonId) -> Level;

    /// PIR output: HIGH while motion is detected.
    fn read_motion(&mut self) -> Level;
}

// ───────────────────────────────────────────────────────────────
// Climate sensor port
// ───────────────────────────────────────────────────────────────

/// One humidity/temperature sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClimateReading {
    /// Relative humidity (%).
    pub humidity: f32,
    /// Air temperature (°C).
    pub temperature: f32,
}

/// Read-side port for the humidity/temperature sensor.
pub trait SensorPort {
    /// Take one reading. Implementations MUST reject NaN values with
    /// [`SensorError::NotANumber`] rather than passing them through.
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Energise (`true`) or release the fan relay. Polarity is the
    /// adapter's concern.
    fn set_fan_relay(&mut self, on: bool);

    /// Light / backlight PWM level (0–255).
    fn set_brightness(&mut self, level: u8);

    /// Display contrast PWM level (0–255).
    fn set_contrast(&mut self, level: u8);
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → character display)
// ───────────────────────────────────────────────────────────────

/// Columns per display row.
pub const DISPLAY_COLS: usize = 16;
/// Rows on the display.
pub const DISPLAY_ROWS: usize = 2;

/// Two-row character display sink.
pub trait DisplayPort {
    fn clear(&mut self);

    /// Write `text` starting at (`col`, `row`). Text past the last column
    /// is dropped by the adapter.
    fn write_at(&mut self, col: u8, row: u8, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock. Wraps at `u32::MAX`; callers use
/// [`crate::timing::elapsed_ms`] for all arithmetic.
pub trait ClockPort {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Parameter storage port (driven adapter: domain ↔ EEPROM / NVS)
// ───────────────────────────────────────────────────────────────

/// Byte-per-slot persistent storage for the tunable parameters.
///
/// The underlying medium has limited write endurance, so writes are
/// conditional: an adapter MUST NOT touch the medium when the stored byte
/// already equals `value`.
pub trait ByteStore {
    /// Value erased/uninitialised slots read back as.
    const ERASED: u8 = 0xFF;

    /// Read one slot. Missing slots read as [`Self::ERASED`].
    fn read(&self, slot: u8) -> u8;

    /// Write one slot if it differs. Returns `Ok(true)` when the medium
    /// was actually written.
    fn write_if_changed(&mut self, slot: u8, value: u8) -> Result<bool, StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the boot-time [`SystemConfig`].
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&mut self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`ByteStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Slot index outside the storage area.
    OutOfRange,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "slot out of range"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
