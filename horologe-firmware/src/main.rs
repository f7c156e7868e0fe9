//! Horologe - Clock Hand Controller Firmware
//!
//! Main firmware binary for RP2040 boards driving up to four dual-shaft
//! clock movements. A fixed-rate tick task steps the hands; a serial shell
//! accepts `stepper` commands for homing, calibration and diagnostics.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pin, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_rp::Peri;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use horologe_core::clock::{Clock, Clockwork, Hand, HandBank};
use horologe_core::motion::StepperDevice;
use horologe_drivers::sensor::HallSensor;
use horologe_drivers::stepper::StepDirDriver;
use horologe_hal_rp2040::flash::Rp2040FlashStorage;

use crate::config::{FlashOffsetStore, HOMING, MOTION};

mod channels;
mod config;
mod tasks;

/// Motor driver wired to two GPIO outputs (reset line not connected)
pub type Driver = StepDirDriver<Output<'static>, Output<'static>>;
/// Hall sensor on a pulled-up GPIO input
pub type Sensor = HallSensor<Input<'static>>;
/// The board's hand arena
pub type Bank = HandBank<Driver, Sensor>;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

// Shared between the tick task and the controller task
static BANK: StaticCell<Bank> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Horologe firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    unwrap!(MOTION.validate());
    unwrap!(HOMING.validate());
    info!(
        "Motion config: {} steps/rev, tick every {}us",
        MOTION.steps_per_revolution, MOTION.tick_period_us
    );

    // Wiring: clock c, motor m uses STEP = GPIO(2 + 4c + 2m), DIR = STEP + 1.
    // Sensors: clock 0 on GPIO18/19, clock 1 on 20/21, clock 2 on 22/26,
    // clock 3 on 27/28.
    let mut clockwork = Clockwork::new();
    unwrap!(clockwork.add_clock(Clock::new(
        hand(p.PIN_2, p.PIN_3, p.PIN_18),
        hand(p.PIN_4, p.PIN_5, p.PIN_19),
    )));
    unwrap!(clockwork.add_clock(Clock::new(
        hand(p.PIN_6, p.PIN_7, p.PIN_20),
        hand(p.PIN_8, p.PIN_9, p.PIN_21),
    )));
    unwrap!(clockwork.add_clock(Clock::new(
        hand(p.PIN_10, p.PIN_11, p.PIN_22),
        hand(p.PIN_12, p.PIN_13, p.PIN_26),
    )));
    unwrap!(clockwork.add_clock(Clock::new(
        hand(p.PIN_14, p.PIN_15, p.PIN_27),
        hand(p.PIN_16, p.PIN_17, p.PIN_28),
    )));
    let bank: &'static Bank = BANK.init(HandBank::new(clockwork));
    info!("{} clocks initialized", bank.clock_count());

    // Load zero offsets from flash (erased flash is not an error)
    let flash = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let store = FlashOffsetStore::load(flash).await;

    // Setup UART for the command shell
    let uart_config = UartConfig::default(); // 115200 baud default

    let tx_buf = TX_BUF.init([0u8; 512]);
    let rx_buf = RX_BUF.init([0u8; 64]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for command shell");

    // Spawn tasks
    spawner.spawn(tasks::tick_task(bank)).unwrap();
    spawner.spawn(tasks::shell_task(tx, rx)).unwrap();
    spawner.spawn(tasks::controller_task(bank, store)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Build one hand from its STEP, DIR and sensor pins
fn hand(
    step: Peri<'static, impl Pin>,
    dir: Peri<'static, impl Pin>,
    sensor: Peri<'static, impl Pin>,
) -> Hand<Driver, Sensor> {
    let driver = StepDirDriver::new(Output::new(step, Level::Low), Output::new(dir, Level::Low), false);
    let device = unwrap!(StepperDevice::new(driver, MOTION.steps_per_revolution));
    Hand::new(device, HallSensor::new(Input::new(sensor, Pull::Up)))
}
