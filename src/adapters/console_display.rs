//! Character display mirrored to the log.
//!
//! Keeps a 2x16 frame buffer with the same clipping rules as an HD44780
//! and logs the frame whenever it changes. Stands in for the physical
//! LCD on boards without one and during bring-up.

use heapless::String;
use log::info;

use crate::app::ports::{DISPLAY_COLS, DISPLAY_ROWS, DisplayPort};

pub struct ConsoleDisplay {
    rows: [[char; DISPLAY_COLS]; DISPLAY_ROWS],
    dirty: bool,
}

impl Default for ConsoleDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self {
            rows: [[' '; DISPLAY_COLS]; DISPLAY_ROWS],
            dirty: false,
        }
    }

    /// Current contents of `row`, trailing spaces included.
    pub fn row(&self, row: usize) -> String<{ DISPLAY_COLS * 4 }> {
        let mut out = String::new();
        if let Some(cells) = self.rows.get(row) {
            for &c in cells {
                let _ = out.push(c);
            }
        }
        out
    }

    /// Log the frame if anything changed since the last call.
    pub fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        info!("LCD   | [{}] [{}]", self.row(0), self.row(1));
    }
}

impl DisplayPort for ConsoleDisplay {
    fn clear(&mut self) {
        self.rows = [[' '; DISPLAY_COLS]; DISPLAY_ROWS];
        self.dirty = true;
    }

    fn write_at(&mut self, col: u8, row: u8, text: &str) {
        let Some(cells) = self.rows.get_mut(usize::from(row)) else {
            return;
        };
        for (cell, c) in cells.iter_mut().skip(usize::from(col)).zip(text.chars()) {
            *cell = c;
        }
        self.dirty = true;
    }
}
