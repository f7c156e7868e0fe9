//! Step/direction driver
//!
//! Quad clock-motor driver ICs (X12.017, VID6606 and compatibles) take one
//! STEP and one DIR line per motor and a shared active-low RESET line. A
//! rising edge on STEP advances the motor by one microstep in the
//! direction selected by DIR.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use horologe_core::traits::{Direction, StepperDriver};

/// Placeholder for drivers wired without a reset line
pub struct NoReset;

impl ErrorType for NoReset {
    type Error = Infallible;
}

impl OutputPin for NoReset {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Step/direction motor driver
///
/// Pin errors are ignored: `step` runs in timer context and has no way
/// to report them.
pub struct StepDirDriver<STEP, DIR, RST = NoReset> {
    step: STEP,
    dir: DIR,
    reset: RST,
    /// If true, clockwise = DIR low
    inverted: bool,
    position: i32,
}

impl<STEP: OutputPin, DIR: OutputPin> StepDirDriver<STEP, DIR, NoReset> {
    /// Create a driver without a reset line
    pub fn new(step: STEP, dir: DIR, inverted: bool) -> Self {
        Self::with_reset(step, dir, NoReset, inverted)
    }
}

impl<STEP: OutputPin, DIR: OutputPin, RST: OutputPin> StepDirDriver<STEP, DIR, RST> {
    /// Create a driver with an active-low reset line
    pub fn with_reset(mut step: STEP, dir: DIR, mut reset: RST, inverted: bool) -> Self {
        let _ = step.set_low();
        let _ = reset.set_high();
        Self {
            step,
            dir,
            reset,
            inverted,
            position: 0,
        }
    }

    /// Release the pins
    pub fn release(self) -> (STEP, DIR, RST) {
        (self.step, self.dir, self.reset)
    }
}

impl<STEP: OutputPin, DIR: OutputPin, RST: OutputPin> StepperDriver for StepDirDriver<STEP, DIR, RST> {
    fn step(&mut self, dir: Direction) {
        let clockwise = matches!(dir, Direction::Clockwise);
        if clockwise != self.inverted {
            let _ = self.dir.set_high();
        } else {
            let _ = self.dir.set_low();
        }
        let _ = self.step.set_high();
        let _ = self.step.set_low();
        self.position += dir.delta();
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    fn reset(&mut self) {
        let _ = self.reset.set_low();
        let _ = self.reset.set_high();
    }
}
