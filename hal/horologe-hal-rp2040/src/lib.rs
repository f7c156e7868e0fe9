//! RP2040-specific HAL for the clock firmware
//!
//! Implements the shared `horologe-hal` traits for the RP2040:
//!
//! - Flash storage driver (implements `horologe_hal::FlashStorage`)

#![no_std]

pub mod flash;

pub use horologe_hal::{FlashStorage as FlashStorageTrait, StorageKey};
