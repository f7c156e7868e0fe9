//! Hall-effect magnet sensor
//!
//! Digital hall switches (A3144 and similar) pull their open-drain output
//! low while a magnet is present, so the default polarity is active-low.

use embedded_hal::digital::InputPin;
use horologe_core::traits::MagnetSensor;

/// Hall switch on a GPIO input
pub struct HallSensor<P> {
    pin: P,
    /// If true, the magnet reads as a high level
    active_high: bool,
}

impl<P: InputPin> HallSensor<P> {
    /// Create an active-low sensor
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            active_high: false,
        }
    }

    /// Create an active-high sensor
    pub fn new_active_high(pin: P) -> Self {
        Self {
            pin,
            active_high: true,
        }
    }
}

impl<P: InputPin> MagnetSensor for HallSensor<P> {
    fn is_triggered(&mut self) -> bool {
        // A failed read counts as "no magnet"
        match self.pin.is_high() {
            Ok(high) => high == self.active_high,
            Err(_) => false,
        }
    }
}
