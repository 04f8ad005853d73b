//! Humidity-driven fan and motion light controller firmware.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod menu;
pub mod pins;
pub mod settings;
pub mod timing;

pub mod adapters;
pub mod drivers;
