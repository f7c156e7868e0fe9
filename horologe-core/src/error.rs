//! Error types shared by the planner, homing controller and command surface

use crate::homing::HomingPhase;
use crate::traits::StorageError;

/// Errors reported by core operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Invalid arguments or malformed command
    Failed,
    /// Clock or motor index outside the configured arena
    InvalidHand,
    /// A polling loop exceeded its deadline
    Timeout,
    /// A homing phase did not converge; remaining phases were skipped
    Homing(HomingPhase),
    /// Offset storage failed
    Storage(StorageError),
    /// Offset storage holds no valid table yet
    Erased,
    /// Measured offset does not fit the persisted representation
    OffsetOutOfRange,
    /// Device command FIFO is full, token was not accepted
    QueueFull,
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}

/// Errors from device construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// Steps per revolution is zero or overflows degree arithmetic
    InvalidStepsPerRevolution,
}

impl From<DeviceError> for Error {
    fn from(_: DeviceError) -> Self {
        Error::Failed
    }
}
