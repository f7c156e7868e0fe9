//! Explicit motion state
//!
//! The device record carries no state field; the state is a function of
//! the remaining steps and the ramp flags, evaluated after every step.

use super::ramp::ACCEL_HIGHEST_POS;

/// Current motion state of a hand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    /// No steps pending
    Idle,
    /// Stepping at the base delay
    Moving,
    /// Ramp counter rising (speedup move, far from the target)
    Accelerating,
    /// Ramp counter falling (slowdown move, close to the target)
    Decelerating,
}

impl MotionState {
    /// Derive the state from the remaining steps and ramp flags
    pub fn classify(do_steps: i32, speedup: bool, slowdown: bool) -> Self {
        let remaining = do_steps.unsigned_abs();
        if remaining == 0 {
            MotionState::Idle
        } else if speedup && remaining > ACCEL_HIGHEST_POS as u32 {
            MotionState::Accelerating
        } else if slowdown && remaining < ACCEL_HIGHEST_POS as u32 {
            MotionState::Decelerating
        } else {
            MotionState::Moving
        }
    }
}
