//! Four-phase unipolar driver
//!
//! Drives a unipolar stepper through a darlington array (ULN2003 style)
//! with four coil lines, using the eight-entry half-step sequence.

use embedded_hal::digital::OutputPin;
use horologe_core::traits::{Direction, StepperDriver};

/// Coil pattern per half-step, bit n = coil n
const HALF_STEP: [u8; 8] = [
    0b0001, 0b0011, 0b0010, 0b0110, 0b0100, 0b1100, 0b1000, 0b1001,
];

/// Four-coil half-step driver
pub struct PhaseDriver<P> {
    coils: [P; 4],
    /// Index into the half-step sequence
    phase: u8,
    position: i32,
}

impl<P: OutputPin> PhaseDriver<P> {
    pub fn new(coils: [P; 4]) -> Self {
        let mut drv = Self {
            coils,
            phase: 0,
            position: 0,
        };
        drv.release_coils();
        drv
    }

    /// De-energize all coils
    pub fn release_coils(&mut self) {
        for coil in self.coils.iter_mut() {
            let _ = coil.set_low();
        }
    }

    fn energize(&mut self) {
        let pattern = HALF_STEP[self.phase as usize];
        for (n, coil) in self.coils.iter_mut().enumerate() {
            if pattern & (1 << n) != 0 {
                let _ = coil.set_high();
            } else {
                let _ = coil.set_low();
            }
        }
    }
}

impl<P: OutputPin> StepperDriver for PhaseDriver<P> {
    fn step(&mut self, dir: Direction) {
        let len = HALF_STEP.len() as i32;
        self.phase = (self.phase as i32 + dir.delta()).rem_euclid(len) as u8;
        self.energize();
        self.position += dir.delta();
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    fn reset(&mut self) {
        self.phase = 0;
        self.release_coils();
    }
}
