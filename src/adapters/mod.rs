//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter           | Implements         | Connects to                  |
//! |-------------------|--------------------|------------------------------|
//! | `hardware`        | InputPort          | embedded-hal GPIO inputs     |
//! |                   | SensorPort         | DHT22 (single-wire)          |
//! |                   | ActuatorPort       | relay GPIO, LEDC PWM         |
//! | `console_display` | DisplayPort        | 2x16 frame buffer → log      |
//! | `log_sink`        | EventSink          | Serial log output            |
//! | `nvs`             | ByteStore          | NVS / in-memory store        |
//! |                   | ConfigPort         |                              |
//! | `time`            | ClockPort          | ESP32 system timer           |

pub mod console_display;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
