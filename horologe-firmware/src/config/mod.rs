//! Board configuration
//!
//! Motion and homing parameters are validated from clock.toml by the build
//! script and compiled in as constants. Zero offsets live in flash.

pub mod offsets;

pub use offsets::FlashOffsetStore;

use horologe_core::config::{HomingConfig, MotionConfig};

include!(concat!(env!("OUT_DIR"), "/clock_config.rs"));
