//! Hand arena shared between the step timer and task context
//!
//! Every access runs inside a critical section, so a planner write that
//! touches several device fields is atomic with respect to the tick.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Vec;

use super::{Clockwork, Hand, HandId};
use crate::config::MAX_HANDS;
use crate::error::Error;
use crate::motion::HandStatus;
use crate::traits::StepperDriver;

/// Hand arena shared between the step timer and task context
///
/// Every access runs inside a critical section, so a planner write that
/// touches several device fields is never observed half-done by a tick.
pub struct HandBank<D, S> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Clockwork<D, S>>>,
}

impl<D, S> HandBank<D, S> {
    pub const fn new(clockwork: Clockwork<D, S>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(clockwork)),
        }
    }

    /// Run `f` with exclusive access to the arena
    ///
    /// Must not be re-entered from inside `f`.
    pub fn lock<R>(&self, f: impl FnOnce(&mut Clockwork<D, S>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Run `f` with exclusive access to one hand
    pub fn with_hand<R>(&self, id: HandId, f: impl FnOnce(&mut Hand<D, S>) -> R) -> Result<R, Error> {
        self.lock(|cw| cw.hand_mut(id).map(f))
    }

    pub fn clock_count(&self) -> usize {
        self.lock(|cw| cw.clock_count())
    }

    pub fn hand_ids(&self) -> Vec<HandId, MAX_HANDS> {
        self.lock(|cw| cw.hand_ids())
    }

    /// Check if every hand is idle
    pub fn is_idle(&self) -> bool {
        self.lock(|cw| cw.is_idle())
    }

    /// Check if every listed hand is idle
    ///
    /// Unknown ids count as idle.
    pub fn hands_idle(&self, ids: &[HandId]) -> bool {
        self.lock(|cw| {
            ids.iter()
                .all(|id| cw.hand(*id).map(|h| h.device.is_idle()).unwrap_or(true))
        })
    }

    /// Status snapshot of every hand, clock-major
    pub fn status(&self) -> Vec<(HandId, HandStatus), MAX_HANDS> {
        self.lock(|cw| {
            let mut out = Vec::new();
            for id in cw.hand_ids() {
                if let Ok(hand) = cw.hand(id) {
                    let _ = out.push((id, hand.device.status()));
                }
            }
            out
        })
    }

    /// Arm idle devices with the next token from their FIFO
    ///
    /// Returns the number of devices armed.
    pub fn dispatch_queued(&self) -> usize {
        self.lock(|cw| {
            let mut armed = 0;
            for hand in cw.hands_mut() {
                if hand.device.is_idle() {
                    if let Some(cmd) = hand.device.dequeue() {
                        hand.device.apply(cmd);
                        armed += 1;
                    }
                }
            }
            armed
        })
    }
}

impl<D: StepperDriver, S> HandBank<D, S> {
    /// Timer callback body: one tick for every hand
    pub fn tick_all(&self) -> bool {
        self.lock(|cw| cw.tick_all())
    }

    /// Fold every engine position into one revolution
    pub fn normalize_positions(&self) {
        self.lock(|cw| {
            for hand in cw.hands_mut() {
                hand.device.normalize_position();
            }
        })
    }

    /// Reset every driver
    pub fn reset_drivers(&self) {
        self.lock(|cw| {
            for hand in cw.hands_mut() {
                hand.device.reset_driver();
            }
        })
    }
}
