//! Sensor-based homing and zero-offset calibration
//!
//! Homing is a lockstep polling protocol: every hand that has not yet
//! reached the wanted sensor state gets another relative move, then the
//! controller sleeps one poll interval. The slowest hand bounds the phase,
//! and each phase has its own deadline.
//!
//! A full zeroing run:
//!
//! 1. Escape: hands already on the sensor are moved off it.
//! 2. Coarse approach: large forward steps until every hand is on the sensor.
//! 3. Fine back-off: single steps backward until every hand has left it.
//! 4. Fine approach: single steps forward until every hand is on it again.
//!
//! The stored offsets are then applied as one relative move and the
//! resulting location becomes the new zero.

use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::clock::{HandBank, HandId};
use crate::config::{HomingConfig, MotionConfig, HANDS_PER_CLOCK, MAX_HANDS};
use crate::error::Error;
use crate::traits::{Direction, MagnetSensor, OffsetStore, StepperDriver};

/// Degrees per exercise move
const EXERCISE_DEGREES: i32 = 90;
/// Moves per direction in one exercise cycle
const EXERCISE_MOVES: usize = 4;
/// Inter-step delay for exercise moves
const EXERCISE_DELAY: u16 = 4;
/// Wait between exercise moves
const EXERCISE_POLL_MS: u32 = 1000;

/// Homing phase, reported when a phase fails to converge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HomingPhase {
    /// Moving hands off the sensor before searching
    Escape,
    /// Large steps toward the sensor
    CoarseApproach,
    /// Single steps until the sensor is left
    FineBackoff,
    /// Single steps until the sensor edge is found again
    FineApproach,
    /// Final move by the stored offsets
    Offset,
}

/// Drives homing, calibration and exercise sequences on a hand bank
pub struct HomingController<'a, D, S, T> {
    bank: &'a HandBank<D, S>,
    timer: T,
    motion: MotionConfig,
    config: HomingConfig,
}

impl<'a, D, S, T> HomingController<'a, D, S, T>
where
    D: StepperDriver,
    S: MagnetSensor,
    T: DelayNs,
{
    pub fn new(bank: &'a HandBank<D, S>, timer: T, motion: MotionConfig, config: HomingConfig) -> Self {
        Self {
            bank,
            timer,
            motion,
            config,
        }
    }

    pub fn bank(&self) -> &'a HandBank<D, S> {
        self.bank
    }

    pub fn motion_config(&self) -> &MotionConfig {
        &self.motion
    }

    /// Step hands until every sensor reads `on_sensor`
    ///
    /// The sensor state is checked before the deadline, so a phase that
    /// converges on its last poll still succeeds.
    pub async fn move_until_sensor(
        &mut self,
        hands: &[HandId],
        on_sensor: bool,
        step_size: i32,
        timeout_ms: i32,
        poll_ms: u32,
        delay: u16,
    ) -> Result<(), Error> {
        let mut remaining = timeout_ms;
        loop {
            let done = self.bank.lock(|cw| {
                let mut done = true;
                for id in hands {
                    let hand = cw.hand_mut(*id)?;
                    if hand.on_sensor() != on_sensor {
                        done = false;
                        break;
                    }
                }
                Ok::<_, Error>(done)
            })?;
            if done {
                return Ok(());
            }
            if remaining < 0 {
                #[cfg(feature = "defmt")]
                defmt::warn!("sensor search timed out (want {})", on_sensor);
                return Err(Error::Timeout);
            }

            self.bank.lock(|cw| {
                for id in hands {
                    let hand = cw.hand_mut(*id)?;
                    if hand.on_sensor() != on_sensor {
                        hand.device.move_relative_steps(step_size, delay);
                    }
                }
                Ok::<_, Error>(())
            })?;

            self.timer.delay_ms(poll_ms).await;
            remaining -= poll_ms as i32;
        }
    }

    /// Sleep in `poll_ms` slices until the listed hands are idle
    ///
    /// Bounded by the homing timeout.
    pub async fn wait_idle(&mut self, hands: &[HandId], poll_ms: u32) -> Result<(), Error> {
        let mut remaining = self.config.timeout_ms;
        loop {
            self.timer.delay_ms(poll_ms).await;
            if self.bank.hands_idle(hands) {
                return Ok(());
            }
            remaining -= poll_ms as i32;
            if remaining < 0 {
                return Err(Error::Timeout);
            }
        }
    }

    /// Raw relative move through the driver
    ///
    /// Bypasses the tick engine but keeps its pacing: each pulse is
    /// followed by `hand_zero_delay + 1` tick periods. The bank is only
    /// locked for the pulse itself, so other hands keep ticking.
    pub async fn raw_steps(&mut self, id: HandId, steps: i32) -> Result<(), Error> {
        self.bank.with_hand(id, |_| ())?;
        let dir = Direction::of(steps);
        let interval_us = self
            .motion
            .tick_period_us
            .saturating_mul(self.motion.hand_zero_delay as u32 + 1);
        for _ in 0..steps.unsigned_abs() {
            self.bank.with_hand(id, |h| h.device.driver_step(dir))?;
            self.timer.delay_us(interval_us).await;
        }
        Ok(())
    }

    /// Find the sensor edge for every listed hand and apply its offset
    ///
    /// `offsets` pairs with `hands` by index. On success each hand's zero
    /// is redefined at its final location. The first phase that fails
    /// aborts the run.
    pub async fn zero_hands(&mut self, hands: &[HandId], offsets: &[i16], delay: u16) -> Result<(), Error> {
        if hands.len() != offsets.len() {
            return Err(Error::Failed);
        }
        let cfg = self.config;

        #[cfg(feature = "defmt")]
        defmt::debug!("zeroing {} hands", hands.len());

        self.bank.lock(|cw| {
            for id in hands {
                let hand = cw.hand_mut(*id)?;
                if hand.on_sensor() {
                    hand.device.move_relative_degrees(cfg.escape_degrees, delay);
                }
            }
            Ok::<_, Error>(())
        })?;
        self.wait_idle(hands, cfg.settle_poll_ms)
            .await
            .map_err(|_| Error::Homing(HomingPhase::Escape))?;

        self.move_until_sensor(hands, true, cfg.coarse_step, cfg.timeout_ms, cfg.coarse_poll_ms, delay)
            .await
            .map_err(|_| Error::Homing(HomingPhase::CoarseApproach))?;
        self.move_until_sensor(hands, false, -1, cfg.timeout_ms, cfg.backoff_poll_ms, delay)
            .await
            .map_err(|_| Error::Homing(HomingPhase::FineBackoff))?;
        self.move_until_sensor(hands, true, 1, cfg.timeout_ms, cfg.approach_poll_ms, delay)
            .await
            .map_err(|_| Error::Homing(HomingPhase::FineApproach))?;

        self.move_by_offsets(hands, offsets, delay)
            .await
            .map_err(|_| Error::Homing(HomingPhase::Offset))?;

        self.bank.lock(|cw| {
            for id in hands {
                cw.hand_mut(*id)?.device.set_zero_position();
            }
            Ok::<_, Error>(())
        })?;

        #[cfg(feature = "defmt")]
        defmt::debug!("zeroing done");
        Ok(())
    }

    /// Zero every hand on the board using the stored offsets
    pub async fn zero_all_hands<O: OffsetStore>(&mut self, store: &O) -> Result<(), Error> {
        let hands = self.bank.hand_ids();
        let mut offsets: Vec<i16, MAX_HANDS> = Vec::new();
        for id in &hands {
            offsets.push(store.zero_offset(*id)).map_err(|_| Error::Failed)?;
        }
        let delay = self.motion.hand_zero_delay;
        self.zero_hands(&hands, &offsets, delay).await
    }

    /// Zero a single hand using its stored offset
    pub async fn zero_hand<O: OffsetStore>(&mut self, id: HandId, store: &O) -> Result<(), Error> {
        self.bank.with_hand(id, |_| ())?;
        let offset = store.zero_offset(id);
        let delay = self.motion.hand_zero_delay;
        self.zero_hands(&[id], &[offset], delay).await
    }

    /// Measure and persist offsets with every hand placed at 12 o'clock
    ///
    /// The driver counters are cleared at 12 o'clock, the sensor edge is
    /// searched in the reverse direction, and the negated driver counter
    /// at the edge becomes the hand's offset. Nothing is persisted unless
    /// every phase succeeds. Afterwards the hands are moved back by the
    /// new offsets.
    pub async fn set_offset_from_twelve_oclock<O: OffsetStore>(&mut self, store: &mut O) -> Result<(), Error> {
        let cfg = self.config;
        let offset_delay = self.motion.offset_delay;
        let delay = self.motion.hand_zero_delay;
        let hands = self.bank.hand_ids();

        self.bank.lock(|cw| {
            for hand in cw.hands_mut() {
                hand.device.set_driver_position(0);
                hand.device.set_delay(offset_delay);
            }
        });

        self.move_until_sensor(&hands, true, -cfg.coarse_step, cfg.timeout_ms, cfg.twelve_coarse_poll_ms, delay)
            .await
            .map_err(|_| Error::Homing(HomingPhase::CoarseApproach))?;
        self.move_until_sensor(&hands, false, 1, cfg.timeout_ms, cfg.approach_poll_ms, delay)
            .await
            .map_err(|_| Error::Homing(HomingPhase::FineBackoff))?;
        self.move_until_sensor(&hands, true, -1, cfg.timeout_ms, cfg.approach_poll_ms, delay)
            .await
            .map_err(|_| Error::Homing(HomingPhase::FineApproach))?;

        let mut table = store.table().unwrap_or_default();
        let mut offsets: Vec<i16, MAX_HANDS> = Vec::new();
        for id in &hands {
            let measured = self.bank.with_hand(*id, |h| h.device.driver_position())?;
            let offset = i16::try_from(-(measured as i64)).map_err(|_| Error::OffsetOutOfRange)?;
            table.set(*id, offset);
            offsets.push(offset).map_err(|_| Error::Failed)?;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("storing offsets {}", offsets.as_slice());

        store.write_offsets(&table).await?;

        self.move_by_offsets(&hands, &offsets, delay)
            .await
            .map_err(|_| Error::Homing(HomingPhase::Offset))
    }

    /// Swing hands through four quarter turns each way, one motor at a time
    ///
    /// `clock = None` exercises every clock together.
    pub async fn run_exercise(&mut self, clock: Option<u8>) -> Result<(), Error> {
        let count = self.bank.clock_count();
        if let Some(c) = clock {
            if c as usize >= count {
                return Err(Error::InvalidHand);
            }
        }
        let clocks = match clock {
            Some(c) => c..c + 1,
            None => 0..count as u8,
        };

        for motor in 0..HANDS_PER_CLOCK as u8 {
            let mut hands: Vec<HandId, MAX_HANDS> = Vec::new();
            for c in clocks.clone() {
                hands.push(HandId::new(c, motor)).map_err(|_| Error::Failed)?;
            }
            for degree in [EXERCISE_DEGREES, -EXERCISE_DEGREES] {
                for _ in 0..EXERCISE_MOVES {
                    self.bank.lock(|cw| {
                        for id in &hands {
                            cw.hand_mut(*id)?
                                .device
                                .move_clock_degrees_relative(degree, EXERCISE_DELAY, true, true);
                        }
                        Ok::<_, Error>(())
                    })?;
                    self.wait_idle(&hands, EXERCISE_POLL_MS).await?;
                }
            }
        }
        Ok(())
    }

    async fn move_by_offsets(&mut self, hands: &[HandId], offsets: &[i16], delay: u16) -> Result<(), Error> {
        self.bank.lock(|cw| {
            for (id, offset) in hands.iter().zip(offsets) {
                cw.hand_mut(*id)?.device.move_relative_steps(*offset as i32, delay);
            }
            Ok::<_, Error>(())
        })?;
        self.wait_idle(hands, self.config.settle_poll_ms).await
    }
}
