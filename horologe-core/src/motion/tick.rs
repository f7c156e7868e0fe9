//! Tick engine
//!
//! Called once per timer period for every device. Executes at most one
//! physical step per call and never blocks.

use super::device::StepperDevice;
use super::ramp::{accel_delay, ACCEL_HIGHEST_POS};
use crate::traits::{Direction, StepperDriver};

impl<D: StepperDriver> StepperDevice<D> {
    /// Advance the device by one tick
    ///
    /// Returns `false` only when the delay has expired and no steps remain.
    pub fn tick(&mut self) -> bool {
        if self.delay_cntr != 0 {
            self.delay_cntr -= 1;
            return true;
        }

        if self.do_steps == 0 {
            return false;
        }

        if self.do_steps > 0 {
            self.position = self.position.wrapping_add(1);
            self.driver.step(Direction::Clockwise);
            self.do_steps -= 1;
        } else {
            self.position = self.position.wrapping_sub(1);
            self.driver.step(Direction::CounterClockwise);
            self.do_steps += 1;
        }

        self.delay_cntr = self.delay;

        if self.speedup || self.slowdown {
            let remaining = self.do_steps.unsigned_abs();
            if self.speedup && remaining > ACCEL_HIGHEST_POS as u32 {
                self.accel_step_cntr = (self.accel_step_cntr + 1).min(ACCEL_HIGHEST_POS);
                self.delay_cntr = self
                    .delay_cntr
                    .saturating_add(accel_delay(self.accel_step_cntr));
            }
            if self.slowdown && remaining < ACCEL_HIGHEST_POS as u32 {
                self.accel_step_cntr = (self.accel_step_cntr - 2).max(0);
                self.delay_cntr = self
                    .delay_cntr
                    .saturating_add(accel_delay(self.accel_step_cntr));
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::motion::{MotionState, MoveMode, StepperDevice, ACCEL_HIGHEST_POS};
    use crate::sim::SimDriver;

    fn device(steps_per_revolution: u32) -> StepperDevice<SimDriver> {
        StepperDevice::new(SimDriver::new(), steps_per_revolution).unwrap()
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let mut dev = device(720);
        assert!(!dev.tick());
        assert_eq!(dev.position(), 0);
        assert_eq!(dev.driver.steps_taken(), 0);
    }

    #[test]
    fn test_steps_forward_and_backward() {
        let mut dev = device(720);
        dev.move_relative_steps(3, 0);
        assert!(dev.tick());
        assert!(dev.tick());
        assert!(dev.tick());
        assert_eq!(dev.do_steps(), 0);
        assert_eq!(dev.position(), 3);
        assert!(!dev.tick());

        dev.move_relative_steps(-2, 0);
        assert!(dev.tick());
        assert!(dev.tick());
        assert_eq!(dev.position(), 1);
        assert_eq!(dev.driver_position(), 1);
    }

    #[test]
    fn test_delay_spaces_steps() {
        let mut dev = device(720);
        dev.move_relative_steps(2, 3);
        // First step fires immediately, then reloads the countdown
        assert!(dev.tick());
        assert_eq!(dev.position(), 1);
        assert_eq!(dev.delay_counter(), 3);
        for _ in 0..3 {
            assert!(dev.tick());
            assert_eq!(dev.position(), 1);
        }
        assert!(dev.tick());
        assert_eq!(dev.position(), 2);
        for _ in 0..3 {
            assert!(dev.tick());
        }
        assert!(!dev.tick());
    }

    #[test]
    fn test_speedup_adds_ramp_delay() {
        let mut dev = device(4320);
        dev.move_clock_degrees_relative(360, 0, true, false);
        assert!(dev.tick());
        assert_eq!(dev.accel_counter(), 1);
        assert_eq!(dev.delay_counter(), 10);
        assert_eq!(dev.state(), MotionState::Accelerating);
    }

    #[test]
    fn test_ramp_counter_clamps_at_highest_pos() {
        let mut dev = device(4320);
        dev.move_clock_degrees_relative(360, 0, true, false);
        while dev.do_steps() > ACCEL_HIGHEST_POS {
            dev.tick();
        }
        assert_eq!(dev.accel_counter(), ACCEL_HIGHEST_POS);
    }

    #[test]
    fn test_slowdown_decrements_twice_and_clamps_at_zero() {
        let mut dev = device(4320);
        dev.move_relative_steps(10, 0);
        dev.slowdown = true;
        dev.accel_step_cntr = 3;
        dev.tick();
        assert_eq!(dev.accel_counter(), 1);
        assert_eq!(dev.delay_counter(), 10);
        while dev.delay_counter() != 0 {
            dev.tick();
        }
        dev.tick();
        assert_eq!(dev.accel_counter(), 0);
    }

    #[test]
    fn test_full_ramp_move_finishes() {
        let mut dev = device(4320);
        dev.move_absolute_degrees(180, MoveMode::Clockwise, 1, true, true);
        let mut ticks = 0u32;
        while dev.tick() {
            ticks += 1;
            assert!(ticks < 100_000);
        }
        assert_eq!(dev.position(), 2160);
        assert!(dev.is_idle());
        assert_eq!(dev.accel_counter(), 0);
    }

    proptest! {
        #[test]
        fn prop_conservation(steps in -2000i32..2000) {
            let mut dev = device(720);
            dev.move_relative_steps(steps, 0);
            let n = steps.unsigned_abs();
            for i in 0..n {
                prop_assert!(dev.tick());
                prop_assert_eq!(dev.do_steps().unsigned_abs(), n - i - 1);
                prop_assert!(dev.delay_counter() <= dev.delay());
            }
            prop_assert_eq!(dev.do_steps(), 0);
            prop_assert_eq!(dev.position(), steps);
            prop_assert!(!dev.tick());
        }

        #[test]
        fn prop_delay_counter_bounded(steps in -200i32..200, delay in 0u16..20) {
            let mut dev = device(720);
            dev.move_relative_steps(steps, delay);
            let mut guard = 0u32;
            while dev.tick() {
                prop_assert!(dev.delay_counter() <= dev.delay());
                guard += 1;
                prop_assert!(guard < 10_000);
            }
            prop_assert_eq!(dev.position(), steps);
        }

        #[test]
        fn prop_ramp_monotonic_while_accelerating(degrees in 30i32..720) {
            let mut dev = device(4320);
            dev.move_clock_degrees_relative(degrees, 0, true, false);
            let mut last = dev.accel_counter();
            while dev.do_steps() > ACCEL_HIGHEST_POS {
                let before = dev.do_steps();
                dev.tick();
                if dev.do_steps() != before {
                    prop_assert!(dev.accel_counter() >= last);
                    prop_assert!(dev.accel_counter() <= ACCEL_HIGHEST_POS);
                    last = dev.accel_counter();
                }
            }
        }
    }
}
