//! Board-agnostic core logic for the clock hand controller
//!
//! This crate contains all motion logic that does not depend on
//! specific hardware implementations:
//!
//! - Capability traits (motor driver, magnet sensor, offset storage)
//! - Per-hand device state and the fixed-rate tick engine
//! - Move planning (degree/step arithmetic, direction policies)
//! - The hand arena shared between timer and task context
//! - Sensor-based homing and zero-offset calibration
//! - Command verbs for the shell
//! - Configuration and persisted offset table types

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod homing;
pub mod motion;
pub mod traits;

#[cfg(test)]
pub(crate) mod sim;

pub use error::Error;
