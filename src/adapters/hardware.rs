//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Generic over the `embedded-hal` 1.0 pin and PWM traits, so the same
//! adapter drives ESP-IDF `PinDriver`/`LedcDriver` on the device and any
//! other HAL (or a test double) elsewhere. This is the only module in the
//! system that touches actual hardware.
//!
//! Pin and PWM faults never reach the control core: a failed input read
//! reads as "released / no motion", a failed output write is logged.

use embedded_hal::digital::{InputPin, OutputPin, PinState};
use embedded_hal::pwm::SetDutyCycle;
use log::error;

use crate::app::ports::{
    ActuatorPort, ButtonId, ClimateReading, DisplayPort, InputPort, Level, SensorPort,
};
use crate::error::{ActuatorError, Error, Result, SensorError};

/// Plausible DHT22 output range; anything outside is a corrupted frame.
const HUMIDITY_RANGE: core::ops::RangeInclusive<f32> = 0.0..=100.0;
const TEMPERATURE_RANGE: core::ops::RangeInclusive<f32> = -40.0..=80.0;

/// Validate a raw sensor sample before it reaches the fan controller.
pub fn checked_reading(
    humidity: f32,
    temperature: f32,
) -> core::result::Result<ClimateReading, SensorError> {
    if humidity.is_nan() || temperature.is_nan() {
        return Err(SensorError::NotANumber);
    }
    if !HUMIDITY_RANGE.contains(&humidity) || !TEMPERATURE_RANGE.contains(&temperature) {
        return Err(SensorError::NotANumber);
    }
    Ok(ClimateReading {
        humidity,
        temperature,
    })
}

/// Concrete adapter that combines all board I/O behind port traits.
pub struct HardwareAdapter<B, M, R, L, C, S, D> {
    /// Indexed by [`ButtonId::index`].
    buttons: [B; ButtonId::COUNT],
    motion: M,
    relay: R,
    light_pwm: L,
    contrast_pwm: C,
    sensor: S,
    display: D,
    relay_active_low: bool,
}

impl<B, M, R, L, C, S, D> HardwareAdapter<B, M, R, L, C, S, D>
where
    B: InputPin,
    M: InputPin,
    R: OutputPin,
    L: SetDutyCycle,
    C: SetDutyCycle,
    S: SensorPort,
    D: DisplayPort,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        buttons: [B; ButtonId::COUNT],
        motion: M,
        relay: R,
        light_pwm: L,
        contrast_pwm: C,
        sensor: S,
        display: D,
        relay_active_low: bool,
    ) -> Self {
        Self {
            buttons,
            motion,
            relay,
            light_pwm,
            contrast_pwm,
            sensor,
            display,
            relay_active_low,
        }
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Drive the relay line, honouring the module's polarity.
    pub fn write_relay(&mut self, on: bool) -> Result<()> {
        let high = on != self.relay_active_low;
        self.relay
            .set_state(PinState::from(high))
            .map_err(|_| Error::from(ActuatorError::GpioWriteFailed))
    }

    fn write_pwm(pwm: &mut impl SetDutyCycle, level: u8) -> Result<()> {
        pwm.set_duty_cycle_fraction(u16::from(level), u16::from(u8::MAX))
            .map_err(|_| Error::from(ActuatorError::PwmWriteFailed))
    }
}

fn sample(pin: &mut impl InputPin) -> Level {
    pin.is_high().map_or(Level::Low, Level::from)
}

// ── InputPort implementation ──────────────────────────────────

impl<B, M, R, L, C, S, D> InputPort for HardwareAdapter<B, M, R, L, C, S, D>
where
    B: InputPin,
    M: InputPin,
{
    fn read_button(&mut self, button: ButtonId) -> Level {
        sample(&mut self.buttons[button.index()])
    }

    fn read_motion(&mut self) -> Level {
        sample(&mut self.motion)
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<B, M, R, L, C, S, D> SensorPort for HardwareAdapter<B, M, R, L, C, S, D>
where
    S: SensorPort,
{
    fn read_climate(&mut self) -> core::result::Result<ClimateReading, SensorError> {
        self.sensor.read_climate()
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl<B, M, R, L, C, S, D> DisplayPort for HardwareAdapter<B, M, R, L, C, S, D>
where
    D: DisplayPort,
{
    fn clear(&mut self) {
        self.display.clear();
    }

    fn write_at(&mut self, col: u8, row: u8, text: &str) {
        self.display.write_at(col, row, text);
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<B, M, R, L, C, S, D> ActuatorPort for HardwareAdapter<B, M, R, L, C, S, D>
where
    B: InputPin,
    M: InputPin,
    R: OutputPin,
    L: SetDutyCycle,
    C: SetDutyCycle,
    S: SensorPort,
    D: DisplayPort,
{
    fn set_fan_relay(&mut self, on: bool) {
        if let Err(e) = self.write_relay(on) {
            error!("fan relay: {}", e);
        }
    }

    fn set_brightness(&mut self, level: u8) {
        if let Err(e) = Self::write_pwm(&mut self.light_pwm, level) {
            error!("brightness: {}", e);
        }
    }

    fn set_contrast(&mut self, level: u8) {
        if let Err(e) = Self::write_pwm(&mut self.contrast_pwm, level) {
            error!("contrast: {}", e);
        }
    }
}

// ── DHT22 ─────────────────────────────────────────────────────

/// DHT22 on a single open-drain line, read with a blocking bit-bang.
#[cfg(feature = "espidf")]
pub struct Dht22Sensor<P, D> {
    pin: P,
    delay: D,
}

#[cfg(feature = "espidf")]
impl<P, D> Dht22Sensor<P, D>
where
    P: InputPin + OutputPin,
    D: embedded_hal::delay::DelayNs,
{
    /// Takes an open-drain pin with pull-up; releases the line so the
    /// sensor can settle before the first read.
    pub fn new(mut pin: P, delay: D) -> Result<Self> {
        pin.set_high().map_err(|_| Error::Init("DHT22 data line"))?;
        Ok(Self { pin, delay })
    }
}

#[cfg(feature = "espidf")]
impl<P, D> SensorPort for Dht22Sensor<P, D>
where
    P: InputPin + OutputPin,
    D: embedded_hal::delay::DelayNs,
{
    fn read_climate(&mut self) -> core::result::Result<ClimateReading, SensorError> {
        use dht_sensor::{DhtError, dht22};

        self.pin.set_high().map_err(|_| SensorError::Bus)?;
        let reading = dht22::blocking::read(&mut self.delay, &mut self.pin).map_err(|e| match e {
            DhtError::Timeout => SensorError::Timeout,
            DhtError::ChecksumMismatch => SensorError::ChecksumMismatch,
            _ => SensorError::Bus,
        })?;
        checked_reading(reading.relative_humidity, reading.temperature)
    }
}
