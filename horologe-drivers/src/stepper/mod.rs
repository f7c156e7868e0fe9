//! Stepper driver implementations

pub mod phase;
pub mod step_dir;

pub use phase::PhaseDriver;
pub use step_dir::{NoReset, StepDirDriver};
