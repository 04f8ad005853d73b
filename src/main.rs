//! Humidity controller firmware entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter          LogEventSink   NvsAdapter  Esp32Time │
//! │  (Input+Sensor+Actuator   (EventSink)    (ByteStore  (Clock)   │
//! │   +Display)                               +Config)             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Buttons · Menu · Settings · Fan · Light               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One cooperative loop: `tick` → display flush → watchdog feed → sleep
//! one tick interval. Nothing else runs on this task.
#![deny(unused_must_use)]

use anyhow::{Result, anyhow};
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, Input, PinDriver, Pull};
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use humictl::adapters::console_display::ConsoleDisplay;
use humictl::adapters::hardware::{Dht22Sensor, HardwareAdapter};
use humictl::adapters::log_sink::LogEventSink;
use humictl::adapters::nvs::NvsAdapter;
use humictl::adapters::time::Esp32TimeAdapter;
use humictl::app::ports::ConfigPort;
use humictl::app::service::AppService;
use humictl::config::SystemConfig;
use humictl::drivers::watchdog::Watchdog;
use humictl::error::Error;
use humictl::pins;

/// Panel button input with the board's external pull-down mirrored
/// internally.
fn button_input(gpio: i32) -> Result<PinDriver<'static, AnyInputPin, Input>> {
    // SAFETY: each GPIO number in `pins` is claimed exactly once.
    let mut pin = PinDriver::input(unsafe { AnyInputPin::new(gpio) })?;
    pin.set_pull(Pull::Down)?;
    Ok(pin)
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  humictl v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let watchdog = Watchdog::default();

    // ── 2. Storage + config ───────────────────────────────────
    let mut nvs = NvsAdapter::new().map_err(|e| anyhow!("NVS init failed: {}", e))?;
    let config = nvs.load().unwrap_or_else(|e| {
        warn!("{}, using defaults", Error::from(e));
        SystemConfig::default()
    });
    let tick_ms = config.tick_interval_ms;

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;

    // Order must match `ButtonId::ALL`.
    let buttons = [
        button_input(pins::BUTTON_SETTINGS_GPIO)?,
        button_input(pins::BUTTON_UP_GPIO)?,
        button_input(pins::BUTTON_DOWN_GPIO)?,
        button_input(pins::BUTTON_LIGHT_GPIO)?,
        button_input(pins::BUTTON_FAN_GPIO)?,
    ];

    let motion = PinDriver::input(unsafe { AnyInputPin::new(pins::PIR_GPIO) })?;

    // Release the relay before anything else can run.
    let mut relay = PinDriver::output(unsafe { AnyOutputPin::new(pins::FAN_RELAY_GPIO) })?;
    if config.relay_active_low {
        relay.set_high()?;
    } else {
        relay.set_low()?;
    }

    let timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default()
            .frequency(Hertz(pins::PWM_FREQ_HZ))
            .resolution(Resolution::Bits8),
    )?;
    let light_pwm = LedcDriver::new(peripherals.ledc.channel0, &timer, unsafe {
        AnyOutputPin::new(pins::BRIGHTNESS_PWM_GPIO)
    })?;
    let contrast_pwm = LedcDriver::new(peripherals.ledc.channel1, &timer, unsafe {
        AnyOutputPin::new(pins::CONTRAST_PWM_GPIO)
    })?;

    let mut dht_pin = PinDriver::input_output_od(unsafe { AnyIOPin::new(pins::DHT_GPIO) })?;
    dht_pin.set_pull(Pull::Up)?;
    let sensor = Dht22Sensor::new(dht_pin, Ets).map_err(|e| anyhow!("{}", e))?;

    let mut hw = HardwareAdapter::new(
        buttons,
        motion,
        relay,
        light_pwm,
        contrast_pwm,
        sensor,
        ConsoleDisplay::new(),
        config.relay_active_low,
    );

    // ── 4. Application core ───────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut log_sink = LogEventSink::new();
    let mut app = AppService::boot(config, &mut nvs, &mut hw, &mut log_sink, &clock);

    info!("System ready. Entering main cycle ({} ms tick).", tick_ms);

    // ── 5. Main cycle ─────────────────────────────────────────
    loop {
        app.tick(&mut hw, &mut nvs, &mut log_sink, &clock);
        hw.display_mut().flush();
        watchdog.feed();
        FreeRtos::delay_ms(tick_ms);
    }
}
