//! Control algorithms for the two actuators.
//!
//! Both controllers are plain state machines with no I/O: the
//! [`AppService`](crate::app::service::AppService) feeds them readings and
//! timestamps and applies their outputs.

pub mod fan;
pub mod light;
