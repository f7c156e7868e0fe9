//! Stepper motor driver trait
//!
//! This trait abstracts over the motor-driver families a clock board can
//! carry (quad driver ICs, ULN2003 darlington arrays, LED ring emulation).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Motor rotation direction for a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Clockwise rotation (position +1)
    Clockwise,
    /// Counter-clockwise rotation (position -1)
    CounterClockwise,
}

impl Direction {
    /// Direction of a signed step count (zero counts as clockwise)
    pub fn of(steps: i32) -> Self {
        if steps < 0 {
            Direction::CounterClockwise
        } else {
            Direction::Clockwise
        }
    }

    /// Signed unit step for this direction
    pub fn delta(self) -> i32 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// Trait for stepper motor drivers
///
/// `step` is called from timer context by the tick engine and must not
/// block. Every other method is only used from task context.
///
/// The driver keeps its own position counter, independent from the
/// tick engine's. Homing redefines zero by resetting this counter.
pub trait StepperDriver {
    /// Perform a single physical step
    fn step(&mut self, dir: Direction);

    /// Driver-level position counter
    fn position(&self) -> i32;

    /// Overwrite the driver-level position counter
    fn set_position(&mut self, position: i32);

    /// Reset the driver hardware
    ///
    /// Drivers without a reset line ignore this.
    fn reset(&mut self) {}
}
