//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the controller's business rules: the settings
//! menu, fan and light control, and the per-tick routing between them.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod display;
pub mod events;
pub mod ports;
pub mod service;
