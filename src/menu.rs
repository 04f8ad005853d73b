//! Settings menu state machine.
//!
//! ```text
//!            settings                 settings (i < last)
//!  Inactive ──────────▶ Editing(0) ─────────────────────▶ Editing(i+1)
//!     ▲                    │  ▲ up/down                        │
//!     │                    └──┘                                │
//!     └──────────── settings (i == last) / flush ◀─────────────┘
//! ```
//!
//! The cursor never exists outside `Editing`, so "active without a
//! selected parameter" cannot be represented.

use log::info;

use crate::app::ports::ByteStore;
use crate::settings::{Adjust, FlushReport, ParameterId, ParameterValue, SettingsStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Inactive,
    Editing(ParameterId),
}

/// What a settings-button press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuStep {
    /// Menu opened on the first parameter.
    Opened(ParameterId, ParameterValue),
    /// Moved to the next parameter.
    Advanced(ParameterId, ParameterValue),
    /// Left the last parameter; settings were flushed.
    Closed(FlushReport),
}

#[derive(Debug)]
pub struct SettingsMenu {
    state: MenuState,
}

impl Default for SettingsMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsMenu {
    pub const fn new() -> Self {
        Self {
            state: MenuState::Inactive,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, MenuState::Editing(_))
    }

    /// The parameter under the cursor, if editing.
    pub fn current(&self) -> Option<ParameterId> {
        match self.state {
            MenuState::Editing(id) => Some(id),
            MenuState::Inactive => None,
        }
    }

    /// Handle one debounced press of the settings button.
    ///
    /// Leaving the last parameter is the only point at which settings are
    /// written back.
    pub fn settings_pressed(
        &mut self,
        settings: &mut SettingsStore,
        storage: &mut impl ByteStore,
    ) -> MenuStep {
        match self.state {
            MenuState::Inactive => {
                let first = ParameterId::Brightness;
                self.state = MenuState::Editing(first);
                info!("menu: opened");
                MenuStep::Opened(first, settings.get(first))
            }
            MenuState::Editing(id) => match id.next() {
                Some(next) => {
                    self.state = MenuState::Editing(next);
                    MenuStep::Advanced(next, settings.get(next))
                }
                None => {
                    self.state = MenuState::Inactive;
                    info!("menu: closed");
                    MenuStep::Closed(settings.flush(storage))
                }
            },
        }
    }

    /// Handle an up/down press or repeat. Ignored while inactive.
    pub fn adjust(
        &mut self,
        settings: &mut SettingsStore,
        dir: Adjust,
    ) -> Option<(ParameterId, ParameterValue)> {
        let id = self.current()?;
        Some((id, settings.adjust(id, dir)))
    }
}
