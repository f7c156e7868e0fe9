//! Hardware abstraction traits
//!
//! These traits define the interface between the motion engine
//! and hardware-specific implementations.

pub mod sensor;
pub mod stepper;
pub mod storage;

pub use sensor::MagnetSensor;
pub use stepper::{Direction, StepperDriver};
pub use storage::{OffsetStore, StorageError};
