//! Motion and homing parameters
//!
//! Defaults match a dual-shaft X12.017 movement (1/12 microstepped,
//! 4320 steps per revolution) driven from a 200 us step timer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest step count per revolution that keeps `steps * 360` inside `i32`
pub const MAX_STEPS_PER_REVOLUTION: u32 = (i32::MAX / 360) as u32;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Steps per revolution is zero or too large
    StepsPerRevolution,
    /// Tick period must be non-zero
    TickPeriod,
    /// Homing step sizes must be non-zero
    StepSize,
    /// Poll intervals must be non-zero and shorter than the timeout
    PollInterval,
}

/// Tick engine and planner configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionConfig {
    /// Steps for a full 360 degree hand revolution
    pub steps_per_revolution: u32,
    /// Period of the step timer in microseconds
    pub tick_period_us: u32,
    /// Inter-step delay (in ticks) used while homing
    pub hand_zero_delay: u16,
    /// Inter-step delay preset before measuring offsets from 12 o'clock
    pub offset_delay: u16,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: 4320,
            tick_period_us: 200,
            hand_zero_delay: 6,
            offset_delay: 8,
        }
    }
}

impl MotionConfig {
    /// Check the configuration for values the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps_per_revolution == 0 || self.steps_per_revolution > MAX_STEPS_PER_REVOLUTION {
            return Err(ConfigError::StepsPerRevolution);
        }
        if self.tick_period_us == 0 {
            return Err(ConfigError::TickPeriod);
        }
        Ok(())
    }
}

/// Homing sequence parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HomingConfig {
    /// Relative move (degrees) to leave the sensor before searching
    pub escape_degrees: i32,
    /// Step size for the coarse sensor approach
    pub coarse_step: i32,
    /// Deadline for each sensor polling phase
    pub timeout_ms: i32,
    /// Poll interval during the coarse approach
    pub coarse_poll_ms: u32,
    /// Poll interval while backing off the sensor
    pub backoff_poll_ms: u32,
    /// Poll interval during the fine re-approach
    pub approach_poll_ms: u32,
    /// Poll interval while waiting for escape/offset moves to finish
    pub settle_poll_ms: u32,
    /// Poll interval for the coarse search when measuring from 12 o'clock
    pub twelve_coarse_poll_ms: u32,
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            escape_degrees: 90,
            coarse_step: 10,
            timeout_ms: 10_000,
            coarse_poll_ms: 10,
            backoff_poll_ms: 10,
            approach_poll_ms: 2,
            settle_poll_ms: 10,
            twelve_coarse_poll_ms: 5,
        }
    }
}

impl HomingConfig {
    /// Check the configuration for values the homing loop cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.coarse_step <= 0 {
            return Err(ConfigError::StepSize);
        }
        let polls = [
            self.coarse_poll_ms,
            self.backoff_poll_ms,
            self.approach_poll_ms,
            self.settle_poll_ms,
            self.twelve_coarse_poll_ms,
        ];
        if self.timeout_ms <= 0
            || polls
                .iter()
                .any(|&p| p == 0 || p > self.timeout_ms as u32)
        {
            return Err(ConfigError::PollInterval);
        }
        Ok(())
    }
}
