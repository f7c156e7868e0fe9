//! Move planner
//!
//! Turns absolute or relative targets (degrees or steps) into a signed step
//! count and arms a device for the tick engine. Arming overwrites any move
//! in progress; there is no planner-level queue.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::device::StepperDevice;

/// Rotation direction policy for absolute moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MoveMode {
    /// Always rotate clockwise (non-negative step count)
    Clockwise,
    /// Always rotate counter-clockwise (non-positive step count)
    CounterClockwise,
    /// Whichever direction needs fewer steps
    Shortest,
}

/// Command token held in a device FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MoveCommand {
    Absolute {
        degree: i32,
        mode: MoveMode,
        delay: u16,
        speedup: bool,
        slowdown: bool,
    },
    RelativeDegrees {
        degree: i32,
        delay: u16,
        speedup: bool,
        slowdown: bool,
    },
    RelativeSteps {
        steps: i32,
        delay: u16,
    },
}

/// Fold a degree value into `0..360`
pub fn normalize_degree(degree: i32) -> i32 {
    degree.rem_euclid(360)
}

/// Convert degrees to steps, truncating toward zero
///
/// Results beyond the `i32` range saturate.
pub fn degrees_to_steps(steps_per_revolution: i32, degree: i32) -> i32 {
    let steps = steps_per_revolution as i64 * degree as i64 / 360;
    i32::try_from(steps).unwrap_or(if steps < 0 { i32::MIN } else { i32::MAX })
}

/// Signed step delta from `position` to an absolute degree target
pub fn absolute_delta(steps_per_revolution: i32, position: i32, degree: i32, mode: MoveMode) -> i32 {
    let target = degrees_to_steps(steps_per_revolution, normalize_degree(degree));
    let current = position.rem_euclid(steps_per_revolution);
    let delta = target - current;

    match mode {
        MoveMode::Clockwise if delta < 0 => delta + steps_per_revolution,
        MoveMode::CounterClockwise if delta > 0 => delta - steps_per_revolution,
        MoveMode::Shortest if delta > steps_per_revolution / 2 => delta - steps_per_revolution,
        MoveMode::Shortest if delta < -(steps_per_revolution / 2) => delta + steps_per_revolution,
        _ => delta,
    }
}

impl<D> StepperDevice<D> {
    /// Arm a move to an absolute clock-face angle
    pub fn move_absolute_degrees(
        &mut self,
        degree: i32,
        mode: MoveMode,
        delay: u16,
        speedup: bool,
        slowdown: bool,
    ) {
        self.do_steps = absolute_delta(self.steps_per_revolution, self.position, degree, mode);
        self.accel_step_cntr = 0;
        self.delay = delay;
        self.speedup = speedup;
        self.slowdown = slowdown;
    }

    /// Arm a relative move in steps
    ///
    /// Ramp flags are left as they were.
    pub fn move_relative_steps(&mut self, steps: i32, delay: u16) {
        self.do_steps = steps;
        self.accel_step_cntr = 0;
        self.delay = delay;
    }

    /// Arm a relative move in degrees
    pub fn move_relative_degrees(&mut self, degree: i32, delay: u16) {
        let steps = degrees_to_steps(self.steps_per_revolution, degree);
        self.move_relative_steps(steps, delay);
    }

    /// Arm a relative move in degrees with explicit ramp flags
    pub fn move_clock_degrees_relative(&mut self, degree: i32, delay: u16, speedup: bool, slowdown: bool) {
        self.move_relative_degrees(degree, delay);
        self.speedup = speedup;
        self.slowdown = slowdown;
    }

    /// Arm the move described by a command token
    pub fn apply(&mut self, command: MoveCommand) {
        match command {
            MoveCommand::Absolute {
                degree,
                mode,
                delay,
                speedup,
                slowdown,
            } => self.move_absolute_degrees(degree, mode, delay, speedup, slowdown),
            MoveCommand::RelativeDegrees {
                degree,
                delay,
                speedup,
                slowdown,
            } => self.move_clock_degrees_relative(degree, delay, speedup, slowdown),
            MoveCommand::RelativeSteps { steps, delay } => self.move_relative_steps(steps, delay),
        }
    }
}
