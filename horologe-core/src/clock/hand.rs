//! Hands, clocks and the fixed-capacity arena

use heapless::Vec;

use super::HandId;
use crate::config::{HANDS_PER_CLOCK, MAX_CLOCKS, MAX_HANDS};
use crate::error::Error;
use crate::motion::StepperDevice;
use crate::traits::{MagnetSensor, StepperDriver};

/// A motor together with the sensor that sees its magnet
pub struct Hand<D, S> {
    pub device: StepperDevice<D>,
    pub sensor: S,
}

impl<D, S: MagnetSensor> Hand<D, S> {
    pub fn new(device: StepperDevice<D>, sensor: S) -> Self {
        Self { device, sensor }
    }

    /// Check whether the magnet is over the sensor
    pub fn on_sensor(&mut self) -> bool {
        self.sensor.is_triggered()
    }
}

/// Two coaxial hands sharing one clock face
pub struct Clock<D, S> {
    pub hands: [Hand<D, S>; HANDS_PER_CLOCK],
}

impl<D, S> Clock<D, S> {
    pub fn new(inner: Hand<D, S>, outer: Hand<D, S>) -> Self {
        Self {
            hands: [inner, outer],
        }
    }
}

/// Arena of all clocks on a board
pub struct Clockwork<D, S> {
    clocks: Vec<Clock<D, S>, MAX_CLOCKS>,
}

impl<D, S> Default for Clockwork<D, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, S> Clockwork<D, S> {
    pub const fn new() -> Self {
        Self { clocks: Vec::new() }
    }

    /// Add a clock, returning its index
    pub fn add_clock(&mut self, clock: Clock<D, S>) -> Result<u8, Error> {
        let index = self.clocks.len() as u8;
        self.clocks.push(clock).map_err(|_| Error::Failed)?;
        Ok(index)
    }

    /// Number of installed clocks
    pub fn clock_count(&self) -> usize {
        self.clocks.len()
    }

    pub fn hand(&self, id: HandId) -> Result<&Hand<D, S>, Error> {
        self.clocks
            .get(id.clock as usize)
            .and_then(|c| c.hands.get(id.motor as usize))
            .ok_or(Error::InvalidHand)
    }

    pub fn hand_mut(&mut self, id: HandId) -> Result<&mut Hand<D, S>, Error> {
        self.clocks
            .get_mut(id.clock as usize)
            .and_then(|c| c.hands.get_mut(id.motor as usize))
            .ok_or(Error::InvalidHand)
    }

    /// Ids of every installed hand, clock-major
    pub fn hand_ids(&self) -> Vec<HandId, MAX_HANDS> {
        let mut ids = Vec::new();
        for clock in 0..self.clocks.len() {
            for motor in 0..HANDS_PER_CLOCK {
                // Capacity matches MAX_CLOCKS * HANDS_PER_CLOCK
                let _ = ids.push(HandId::new(clock as u8, motor as u8));
            }
        }
        ids
    }

    pub fn hands_mut(&mut self) -> impl Iterator<Item = &mut Hand<D, S>> {
        self.clocks.iter_mut().flat_map(|c| c.hands.iter_mut())
    }

    pub fn hands(&self) -> impl Iterator<Item = &Hand<D, S>> {
        self.clocks.iter().flat_map(|c| c.hands.iter())
    }

    /// Check if every hand is idle
    pub fn is_idle(&self) -> bool {
        self.hands().all(|h| h.device.is_idle())
    }
}

impl<D: StepperDriver, S> Clockwork<D, S> {
    /// Advance every device by one tick
    ///
    /// Returns true while any device still has work.
    pub fn tick_all(&mut self) -> bool {
        let mut busy = false;
        for hand in self.hands_mut() {
            busy |= hand.device.tick();
        }
        busy
    }
}
