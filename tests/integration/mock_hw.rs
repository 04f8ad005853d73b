//! Mock adapters for integration tests.
//!
//! Records every actuator, display, and storage call so tests can assert
//! on the full command history without touching real GPIO/PWM registers.
//! [`Harness`] wires them to an [`AppService`] and advances simulated time
//! one millisecond tick at a time.

use std::cell::Cell;

use humictl::app::events::AppEvent;
use humictl::app::ports::{
    ActuatorPort, ButtonId, ByteStore, ClimateReading, ClockPort, DISPLAY_COLS, DisplayPort,
    EventSink, InputPort, Level, SensorPort, StorageError,
};
use humictl::app::service::AppService;
use humictl::config::SystemConfig;
use humictl::error::SensorError;
use humictl::settings::ParameterId;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    Relay(bool),
    Brightness(u8),
    Contrast(u8),
}

// ── MockBoard ─────────────────────────────────────────────────

/// Buttons, PIR, sensor, actuators, and a 2x16 display in one board.
pub struct MockBoard {
    pub buttons: [Level; ButtonId::COUNT],
    pub motion: Level,
    pub climate: Result<ClimateReading, SensorError>,
    pub sensor_reads: usize,
    pub calls: Vec<ActuatorCall>,
    pub rows: [[char; DISPLAY_COLS]; 2],
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self {
            buttons: [Level::Low; ButtonId::COUNT],
            motion: Level::Low,
            climate: Ok(ClimateReading {
                humidity: 40.0,
                temperature: 21.0,
            }),
            sensor_reads: 0,
            calls: Vec::new(),
            rows: [[' '; DISPLAY_COLS]; 2],
        }
    }

    pub fn set_humidity(&mut self, humidity: f32) {
        self.climate = Ok(ClimateReading {
            humidity,
            temperature: 21.0,
        });
    }

    /// Last relay state written, `None` if never written.
    pub fn relay(&self) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::Relay(on) => Some(*on),
            _ => None,
        })
    }

    pub fn brightness(&self) -> Option<u8> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::Brightness(v) => Some(*v),
            _ => None,
        })
    }

    pub fn contrast(&self) -> Option<u8> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::Contrast(v) => Some(*v),
            _ => None,
        })
    }

    pub fn relay_writes(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ActuatorCall::Relay(_)))
            .count()
    }

    pub fn row(&self, row: usize) -> String {
        self.rows[row].iter().collect::<String>().trim_end().to_string()
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl InputPort for MockBoard {
    fn read_button(&mut self, button: ButtonId) -> Level {
        self.buttons[button.index()]
    }

    fn read_motion(&mut self) -> Level {
        self.motion
    }
}

impl SensorPort for MockBoard {
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.sensor_reads += 1;
        self.climate
    }
}

impl ActuatorPort for MockBoard {
    fn set_fan_relay(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Relay(on));
    }

    fn set_brightness(&mut self, level: u8) {
        self.calls.push(ActuatorCall::Brightness(level));
    }

    fn set_contrast(&mut self, level: u8) {
        self.calls.push(ActuatorCall::Contrast(level));
    }
}

impl DisplayPort for MockBoard {
    fn clear(&mut self) {
        self.rows = [[' '; DISPLAY_COLS]; 2];
    }

    fn write_at(&mut self, col: u8, row: u8, text: &str) {
        let Some(cells) = self.rows.get_mut(row as usize) else {
            return;
        };
        for (cell, c) in cells.iter_mut().skip(col as usize).zip(text.chars()) {
            *cell = c;
        }
    }
}

// ── MockEeprom ────────────────────────────────────────────────

/// Byte store that logs every physical write.
pub struct MockEeprom {
    pub cells: [u8; 16],
    pub writes: Vec<(u8, u8)>,
}

#[allow(dead_code)]
impl MockEeprom {
    pub fn erased() -> Self {
        Self {
            cells: [0xFF; 16],
            writes: Vec::new(),
        }
    }

    /// Factory defaults already on the medium, with overrides.
    pub fn with(overrides: &[(ParameterId, u8)]) -> Self {
        let mut cells = [0xFF; 16];
        for id in ParameterId::ALL {
            cells[id.index()] = id.spec().default.to_byte();
        }
        for (id, value) in overrides {
            cells[id.index()] = *value;
        }
        Self {
            cells,
            writes: Vec::new(),
        }
    }
}

impl ByteStore for MockEeprom {
    fn read(&self, slot: u8) -> u8 {
        self.cells.get(slot as usize).copied().unwrap_or(Self::ERASED)
    }

    fn write_if_changed(&mut self, slot: u8, value: u8) -> Result<bool, StorageError> {
        let cell = self
            .cells
            .get_mut(slot as usize)
            .ok_or(StorageError::OutOfRange)?;
        if *cell == value {
            return Ok(false);
        }
        *cell = value;
        self.writes.push((slot, value));
        Ok(true)
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── SimClock ──────────────────────────────────────────────────

#[derive(Default)]
pub struct SimClock {
    now: Cell<u32>,
}

#[allow(dead_code)]
impl SimClock {
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl ClockPort for SimClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

// ── Harness ───────────────────────────────────────────────────

/// How long a simulated finger holds a button, and rests after.
pub const PRESS_MS: u32 = 80;

pub struct Harness {
    pub app: AppService,
    pub board: MockBoard,
    pub eeprom: MockEeprom,
    pub sink: RecordingSink,
    pub clock: SimClock,
    /// Milliseconds since boot.
    pub elapsed: u32,
}

#[allow(dead_code)]
impl Harness {
    pub fn boot(config: SystemConfig, mut eeprom: MockEeprom) -> Self {
        let mut board = MockBoard::new();
        let mut sink = RecordingSink::default();
        let clock = SimClock::default();
        let app = AppService::boot(config, &mut eeprom, &mut board, &mut sink, &clock);
        Self {
            app,
            board,
            eeprom,
            sink,
            clock,
            elapsed: 0,
        }
    }

    pub fn tick(&mut self) {
        self.clock.advance(1);
        self.elapsed += 1;
        self.app
            .tick(&mut self.board, &mut self.eeprom, &mut self.sink, &self.clock);
    }

    pub fn run_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.tick();
        }
    }

    /// Run until `elapsed` since boot reaches `t`.
    pub fn run_until(&mut self, t: u32) {
        while self.elapsed < t {
            self.tick();
        }
    }

    pub fn hold(&mut self, button: ButtonId, ms: u32) {
        self.board.buttons[button.index()] = Level::High;
        self.run_ms(ms);
        self.board.buttons[button.index()] = Level::Low;
    }

    /// One clean press and release.
    pub fn press(&mut self, button: ButtonId) {
        self.hold(button, PRESS_MS);
        self.run_ms(PRESS_MS);
    }
}
