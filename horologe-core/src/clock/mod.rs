//! Hand arena
//!
//! Clocks and their hands live in a fixed-capacity arena addressed by
//! stable `(clock, motor)` indices. The arena is shared between the step
//! timer and task context through `HandBank`.

mod bank;
mod hand;

pub use bank::HandBank;
pub use hand::{Clock, Clockwork, Hand};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable address of a hand in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HandId {
    /// Clock index
    pub clock: u8,
    /// Motor index within the clock (0 = inner, 1 = outer)
    pub motor: u8,
}

impl HandId {
    pub const fn new(clock: u8, motor: u8) -> Self {
        Self { clock, motor }
    }
}
