//! Horologe Hardware Abstraction Layer
//!
//! Chip-agnostic traits implemented by chip-specific HALs, so the
//! firmware's persistence code does not depend on one flash controller.
//!
//! # Traits
//!
//! - [`flash::FlashStorage`] - Persistent key-value storage

#![no_std]
#![deny(unsafe_code)]

pub mod flash;

pub use flash::{FlashError, FlashStorage, StorageKey};
