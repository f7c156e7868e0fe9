//! Motion engine
//!
//! Per-hand device state, the fixed-rate tick engine with its
//! acceleration ramp, and the move planner.

pub mod device;
pub mod planner;
pub mod ramp;
pub mod state;
mod tick;

pub use device::{HandStatus, StepperDevice, QUEUE_CAPACITY};
pub use planner::{MoveCommand, MoveMode};
pub use ramp::{accel_delay, ACCEL_HIGHEST_POS};
pub use state::MotionState;
