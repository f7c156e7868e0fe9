//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in horologe-core:
//!
//! - Stepper drivers (step/dir quad driver ICs, four-phase unipolar coils)
//! - Magnet sensors (hall-effect switches)

#![no_std]
#![deny(unsafe_code)]

pub mod sensor;
pub mod stepper;
