//! Polled, debounced button driver with press-and-hold auto-repeat.
//!
//! ## Hardware
//!
//! Momentary switch to VCC with an external pull-down: the line reads HIGH
//! while pressed. Every button is sampled once per main-cycle tick; there
//! are no interrupts and nothing blocks.
//!
//! ## Edge detection
//!
//! | Raw level | Tracker    | Window elapsed | Result                         |
//! |-----------|------------|----------------|--------------------------------|
//! | HIGH      | Released   | yes            | → Held, emit `Pressed`         |
//! | LOW       | Held       | yes            | → Released, no event           |
//! | HIGH      | Held       | -              | emit `Held` every repeat period|
//! | any       | any        | no             | ignored (bounce)               |
//!
//! The window is measured from the last *accepted* transition, so accepted
//! edges are always at least `debounce_ms` apart.

use crate::app::ports::{ButtonId, Level};
use crate::timing::{elapsed_ms, has_elapsed};

/// Events emitted after debouncing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// A debounced rising edge. Fires once per physical press.
    Pressed,
    /// The button is still down; fires once per repeat interval.
    Held,
}

/// Internal edge tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeState {
    Released,
    Down { last_event_ms: u32 },
}

pub struct DebouncedButton {
    id: ButtonId,
    debounce_ms: u32,
    /// `None` disables `Held` events.
    repeat_ms: Option<u32>,
    state: EdgeState,
    last_transition_ms: Option<u32>,
}

impl DebouncedButton {
    /// A button that only reports `Pressed`.
    pub fn new(id: ButtonId, debounce_ms: u32) -> Self {
        Self {
            id,
            debounce_ms,
            repeat_ms: None,
            state: EdgeState::Released,
            last_transition_ms: None,
        }
    }

    /// A button that also reports `Held` every `repeat_ms` while down.
    pub fn with_repeat(id: ButtonId, debounce_ms: u32, repeat_ms: u32) -> Self {
        Self {
            repeat_ms: Some(repeat_ms.max(1)),
            ..Self::new(id, debounce_ms)
        }
    }

    /// Which physical button this instance tracks.
    pub fn id(&self) -> ButtonId {
        self.id
    }

    /// Debounced pressed state.
    pub fn is_down(&self) -> bool {
        matches!(self.state, EdgeState::Down { .. })
    }

    /// Sample the raw level. Call exactly once per tick.
    pub fn poll(&mut self, raw: Level, now_ms: u32) -> Option<ButtonEvent> {
        let window_open = self
            .last_transition_ms
            .is_none_or(|t| has_elapsed(now_ms, t, self.debounce_ms));

        match (self.state, raw) {
            (EdgeState::Released, Level::High) if window_open => {
                self.last_transition_ms = Some(now_ms);
                self.state = EdgeState::Down {
                    last_event_ms: now_ms,
                };
                Some(ButtonEvent::Pressed)
            }

            (EdgeState::Down { .. }, Level::Low) if window_open => {
                self.last_transition_ms = Some(now_ms);
                self.state = EdgeState::Released;
                None
            }

            (EdgeState::Down { last_event_ms }, Level::High) => {
                let repeat_ms = self.repeat_ms?;
                if elapsed_ms(now_ms, last_event_ms) >= repeat_ms {
                    self.state = EdgeState::Down {
                        last_event_ms: now_ms,
                    };
                    Some(ButtonEvent::Held)
                } else {
                    None
                }
            }

            _ => None,
        }
    }
}
