//! Magnet sensor trait
//!
//! Each hand carries a magnet that passes a hall-effect sensor once per
//! revolution. The sensor is the only absolute reference the board has.

/// Binary proximity sensor used for homing
pub trait MagnetSensor {
    /// Check whether the hand's magnet is currently over the sensor
    fn is_triggered(&mut self) -> bool;
}
