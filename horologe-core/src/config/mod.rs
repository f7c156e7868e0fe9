//! Configuration types
//!
//! Motion and homing parameters, plus the persisted zero-offset table.

pub mod motion;
pub mod offsets;

pub use motion::{ConfigError, HomingConfig, MotionConfig, MAX_STEPS_PER_REVOLUTION};
pub use offsets::{ZeroOffsetTable, MAX_ENCODED_SIZE, OFFSETS_MAGIC, OFFSETS_VERSION};

/// Maximum number of clocks on one board
pub const MAX_CLOCKS: usize = 4;

/// Motors per clock (inner and outer hand shaft)
pub const HANDS_PER_CLOCK: usize = 2;

/// Maximum number of hands on one board
pub const MAX_HANDS: usize = MAX_CLOCKS * HANDS_PER_CLOCK;
