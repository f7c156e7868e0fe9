//! Per-hand device state
//!
//! One `StepperDevice` exists for every physical motor. The planner arms it
//! from task context and the tick engine advances it from timer context;
//! the hand arena serializes both behind a critical section.

use heapless::Deque;

use super::planner::MoveCommand;
use super::state::MotionState;
use crate::config::MAX_STEPS_PER_REVOLUTION;
use crate::error::{DeviceError, Error};
use crate::traits::{Direction, StepperDriver};

/// Capacity of the per-device command FIFO
pub const QUEUE_CAPACITY: usize = 8;

/// Snapshot reported by the `status` verb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandStatus {
    /// Engine position counter (raw, not normalized)
    pub position: i32,
    /// Base inter-step delay in ticks
    pub delay: u16,
    /// Commands waiting in the FIFO
    pub queued: usize,
    /// Current motion state
    pub state: MotionState,
}

/// Motion state of a single stepper motor
pub struct StepperDevice<D> {
    pub(crate) driver: D,
    pub(crate) steps_per_revolution: i32,
    /// Accumulates +/-1 per executed step
    pub(crate) position: i32,
    /// Remaining steps, sign encodes direction
    pub(crate) do_steps: i32,
    pub(crate) delay: u16,
    pub(crate) delay_cntr: u16,
    /// Ramp progress, kept in `0..=ACCEL_HIGHEST_POS`
    pub(crate) accel_step_cntr: i32,
    pub(crate) speedup: bool,
    pub(crate) slowdown: bool,
    queue: Deque<MoveCommand, QUEUE_CAPACITY>,
}

impl<D: StepperDriver> StepperDevice<D> {
    /// Create an idle device at position 0
    pub fn new(driver: D, steps_per_revolution: u32) -> Result<Self, DeviceError> {
        if steps_per_revolution == 0 || steps_per_revolution > MAX_STEPS_PER_REVOLUTION {
            return Err(DeviceError::InvalidStepsPerRevolution);
        }
        Ok(Self {
            driver,
            steps_per_revolution: steps_per_revolution as i32,
            position: 0,
            do_steps: 0,
            delay: 0,
            delay_cntr: 0,
            accel_step_cntr: 0,
            speedup: false,
            slowdown: false,
            queue: Deque::new(),
        })
    }

    /// Driver-level position counter
    pub fn driver_position(&self) -> i32 {
        self.driver.position()
    }

    /// Redefine zero at the current location
    ///
    /// Both the driver counter and the engine counter are cleared so that
    /// later absolute moves are measured from here.
    pub fn set_zero_position(&mut self) {
        self.driver.set_position(0);
        self.position = 0;
    }

    /// Overwrite the driver-level position counter only
    pub fn set_driver_position(&mut self, position: i32) {
        self.driver.set_position(position);
    }

    /// Reset the driver hardware
    pub fn reset_driver(&mut self) {
        self.driver.reset();
    }

    /// Single pulse through the driver, bypassing the tick engine
    ///
    /// Only the driver counter moves; the engine position is untouched.
    pub fn driver_step(&mut self, dir: Direction) {
        self.driver.step(dir);
    }

    /// Fold the engine position into `0..steps_per_revolution`
    pub fn normalize_position(&mut self) {
        self.position = self.position.rem_euclid(self.steps_per_revolution);
    }
}

impl<D> StepperDevice<D> {
    pub fn steps_per_revolution(&self) -> i32 {
        self.steps_per_revolution
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn do_steps(&self) -> i32 {
        self.do_steps
    }

    pub fn delay(&self) -> u16 {
        self.delay
    }

    pub fn delay_counter(&self) -> u16 {
        self.delay_cntr
    }

    pub fn accel_counter(&self) -> i32 {
        self.accel_step_cntr
    }

    /// Set the base inter-step delay without arming a move
    pub fn set_delay(&mut self, delay: u16) {
        self.delay = delay;
    }

    /// Derived motion state
    pub fn state(&self) -> MotionState {
        MotionState::classify(self.do_steps, self.speedup, self.slowdown)
    }

    /// Check if no steps are pending
    pub fn is_idle(&self) -> bool {
        self.do_steps == 0
    }

    /// Push a command token onto the FIFO
    ///
    /// A full queue drops the token and reports it to the producer.
    pub fn enqueue(&mut self, command: MoveCommand) -> Result<(), Error> {
        self.queue.push_back(command).map_err(|_| Error::QueueFull)
    }

    /// Pop the oldest command token
    pub fn dequeue(&mut self) -> Option<MoveCommand> {
        self.queue.pop_front()
    }

    /// Number of queued command tokens
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn status(&self) -> HandStatus {
        HandStatus {
            position: self.position,
            delay: self.delay,
            queued: self.queue.len(),
            state: self.state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MoveMode;
    use crate::sim::SimDriver;

    #[test]
    fn test_new_device_is_idle() {
        let dev = StepperDevice::new(SimDriver::new(), 720).unwrap();
        assert!(dev.is_idle());
        assert_eq!(dev.position(), 0);
        assert_eq!(dev.state(), MotionState::Idle);
        assert_eq!(dev.queued(), 0);
    }

    #[test]
    fn test_new_rejects_bad_steps_per_revolution() {
        assert_eq!(
            StepperDevice::new(SimDriver::new(), 0).err(),
            Some(DeviceError::InvalidStepsPerRevolution)
        );
        assert_eq!(
            StepperDevice::new(SimDriver::new(), MAX_STEPS_PER_REVOLUTION + 1).err(),
            Some(DeviceError::InvalidStepsPerRevolution)
        );
        assert!(StepperDevice::new(SimDriver::new(), MAX_STEPS_PER_REVOLUTION).is_ok());
    }

    #[test]
    fn test_queue_rejects_when_full() {
        let mut dev = StepperDevice::new(SimDriver::new(), 720).unwrap();
        let cmd = MoveCommand::RelativeSteps { steps: 1, delay: 0 };
        for _ in 0..QUEUE_CAPACITY {
            dev.enqueue(cmd).unwrap();
        }
        assert_eq!(dev.enqueue(cmd), Err(Error::QueueFull));
        assert_eq!(dev.queued(), QUEUE_CAPACITY);
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut dev = StepperDevice::new(SimDriver::new(), 720).unwrap();
        let first = MoveCommand::Absolute {
            degree: 90,
            mode: MoveMode::Clockwise,
            delay: 2,
            speedup: false,
            slowdown: false,
        };
        let second = MoveCommand::RelativeSteps { steps: -3, delay: 1 };
        dev.enqueue(first).unwrap();
        dev.enqueue(second).unwrap();
        assert_eq!(dev.dequeue(), Some(first));
        assert_eq!(dev.dequeue(), Some(second));
        assert_eq!(dev.dequeue(), None);
    }

    #[test]
    fn test_normalize_position() {
        let mut dev = StepperDevice::new(SimDriver::new(), 720).unwrap();
        dev.position = 1500;
        dev.normalize_position();
        assert_eq!(dev.position(), 60);
        dev.position = -10;
        dev.normalize_position();
        assert_eq!(dev.position(), 710);
    }

    #[test]
    fn test_set_zero_position_clears_both_counters() {
        let mut dev = StepperDevice::new(SimDriver::new(), 720).unwrap();
        dev.position = 42;
        dev.set_driver_position(17);
        dev.set_zero_position();
        assert_eq!(dev.position(), 0);
        assert_eq!(dev.driver_position(), 0);
    }

    #[test]
    fn test_status_snapshot() {
        let mut dev = StepperDevice::new(SimDriver::new(), 720).unwrap();
        dev.move_relative_steps(5, 3);
        dev.enqueue(MoveCommand::RelativeSteps { steps: 1, delay: 0 }).unwrap();
        let status = dev.status();
        assert_eq!(status.position, 0);
        assert_eq!(status.delay, 3);
        assert_eq!(status.queued, 1);
        assert_eq!(status.state, MotionState::Moving);
    }
}
