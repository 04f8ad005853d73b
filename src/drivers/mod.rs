//! Low-level drivers: panel buttons and the task watchdog.

pub mod button;
pub mod watchdog;
