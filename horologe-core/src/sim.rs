//! Host simulation of the clock hardware for unit tests
//!
//! Each simulated hand has a physical shaft position shared between its
//! driver and its magnet sensor, so homing sees the sensor react to the
//! steps the tick engine executes.

use core::cell::Cell;
use std::rc::Rc;

use embedded_hal_async::delay::DelayNs;

use crate::clock::{Clock, Clockwork, Hand, HandBank, HandId};
use crate::config::ZeroOffsetTable;
use crate::motion::StepperDevice;
use crate::traits::{Direction, MagnetSensor, OffsetStore, StepperDriver, StorageError};

/// Inclusive sensor window in shaft steps, `None` = sensor never triggers
pub type Window = Option<(i32, i32)>;

pub const NO_SENSOR: Window = None;

pub type SimBank = HandBank<SimDriver, SimSensor>;

/// Stepper driver that moves a simulated shaft
pub struct SimDriver {
    shaft: Rc<Cell<i32>>,
    position: i32,
    steps: u32,
    pub resets: u32,
}

impl SimDriver {
    pub fn new() -> Self {
        Self::with_shaft(Rc::new(Cell::new(0)))
    }

    pub fn with_shaft(shaft: Rc<Cell<i32>>) -> Self {
        Self {
            shaft,
            position: 0,
            steps: 0,
            resets: 0,
        }
    }

    /// Physical steps executed so far
    pub fn steps_taken(&self) -> u32 {
        self.steps
    }

    /// Physical shaft position (unbounded)
    pub fn shaft(&self) -> i32 {
        self.shaft.get()
    }

    /// Turn the shaft by hand, without the driver noticing
    pub fn turn_shaft(&self, position: i32) {
        self.shaft.set(position);
    }
}

impl StepperDriver for SimDriver {
    fn step(&mut self, dir: Direction) {
        self.shaft.set(self.shaft.get() + dir.delta());
        self.position += dir.delta();
        self.steps += 1;
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    fn reset(&mut self) {
        self.resets += 1;
    }
}

/// Magnet sensor watching a simulated shaft
pub struct SimSensor {
    shaft: Rc<Cell<i32>>,
    steps_per_revolution: i32,
    window: Window,
}

impl MagnetSensor for SimSensor {
    fn is_triggered(&mut self) -> bool {
        match self.window {
            Some((start, end)) => {
                let p = self.shaft.get().rem_euclid(self.steps_per_revolution);
                p >= start && p <= end
            }
            None => false,
        }
    }
}

pub fn hand(steps_per_revolution: u32, window: Window) -> Hand<SimDriver, SimSensor> {
    let shaft = Rc::new(Cell::new(0));
    let sensor = SimSensor {
        shaft: shaft.clone(),
        steps_per_revolution: steps_per_revolution as i32,
        window,
    };
    let device = StepperDevice::new(SimDriver::with_shaft(shaft), steps_per_revolution).unwrap();
    Hand::new(device, sensor)
}

pub fn clock(steps_per_revolution: u32, window: Window) -> Clock<SimDriver, SimSensor> {
    Clock::new(
        hand(steps_per_revolution, window),
        hand(steps_per_revolution, window),
    )
}

pub fn clockwork(
    steps_per_revolution: u32,
    clocks: usize,
    window: Window,
) -> Clockwork<SimDriver, SimSensor> {
    let mut cw = Clockwork::new();
    for _ in 0..clocks {
        cw.add_clock(clock(steps_per_revolution, window)).unwrap();
    }
    cw
}

/// Place a hand's shaft at a physical position
pub fn place(bank: &SimBank, id: HandId, shaft: i32) {
    bank.with_hand(id, |h| h.device.driver.turn_shaft(shaft)).unwrap();
}

/// Physical shaft position of a hand
pub fn shaft(bank: &SimBank, id: HandId) -> i32 {
    bank.with_hand(id, |h| h.device.driver.shaft()).unwrap()
}

/// Delay that advances the tick engine instead of sleeping
pub struct SimDelay<'a> {
    bank: &'a SimBank,
    tick_ns: u64,
    pending_ns: u64,
    pub elapsed_ns: u64,
}

impl<'a> SimDelay<'a> {
    pub fn new(bank: &'a SimBank, tick_period_us: u32) -> Self {
        Self {
            bank,
            tick_ns: tick_period_us as u64 * 1000,
            pending_ns: 0,
            elapsed_ns: 0,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl DelayNs for SimDelay<'_> {
    async fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
        self.pending_ns += ns as u64;
        while self.pending_ns >= self.tick_ns {
            self.bank.tick_all();
            self.pending_ns -= self.tick_ns;
        }
    }
}

/// Offset store kept in memory
#[derive(Default)]
pub struct MemoryOffsetStore {
    pub table: Option<ZeroOffsetTable>,
    pub writes: u32,
    pub fail: bool,
}

impl MemoryOffsetStore {
    pub fn with_table(table: ZeroOffsetTable) -> Self {
        Self {
            table: Some(table),
            ..Default::default()
        }
    }
}

impl OffsetStore for MemoryOffsetStore {
    fn table(&self) -> Option<ZeroOffsetTable> {
        self.table
    }

    async fn write_offsets(&mut self, table: &ZeroOffsetTable) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::Flash);
        }
        let mut table = *table;
        table.update_crc();
        self.table = Some(table);
        self.writes += 1;
        Ok(())
    }
}
