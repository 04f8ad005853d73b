//! GPIO / peripheral pin assignments for the controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Front-panel buttons (to VCC, external pull-down: HIGH = pressed)
// ---------------------------------------------------------------------------

/// Enters / advances / leaves the settings menu.
pub const BUTTON_SETTINGS_GPIO: i32 = 4;
/// Increments the selected parameter (hold to repeat).
pub const BUTTON_UP_GPIO: i32 = 5;
/// Decrements the selected parameter (hold to repeat).
pub const BUTTON_DOWN_GPIO: i32 = 6;
/// Toggles the light.
pub const BUTTON_LIGHT_GPIO: i32 = 7;
/// Cycles the fan override.
pub const BUTTON_FAN_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT22 single-wire data line (open drain, pulled up).
pub const DHT_GPIO: i32 = 16;
/// HC-SR501 PIR output: HIGH while motion is detected.
pub const PIR_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Fan relay module input. Polarity is set by `relay_active_low`.
pub const FAN_RELAY_GPIO: i32 = 18;
/// LEDC PWM output for the light / display backlight.
pub const BRIGHTNESS_PWM_GPIO: i32 = 8;
/// LEDC PWM output for the display contrast (V0 via RC filter).
pub const CONTRAST_PWM_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC base frequency for brightness and contrast. The timer runs at
/// 8-bit resolution so duty levels map 1:1 onto parameter bytes.
pub const PWM_FREQ_HZ: u32 = 5_000;
