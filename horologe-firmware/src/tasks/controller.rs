//! Command controller task
//!
//! Owns the homing controller and the offset store. Executes one shell
//! command at a time; long-running verbs (zeroing, calibration, exercise)
//! hold the shell until they finish.

use defmt::*;
use embassy_time::Delay;

use horologe_core::command::{Command, Controller};
use horologe_core::homing::HomingController;

use crate::channels::{COMMAND_CHANNEL, COMMAND_RESULT};
use crate::config::{FlashOffsetStore, HOMING, MOTION};
use crate::Bank;

/// Controller task - executes commands received from the shell
#[embassy_executor::task]
pub async fn controller_task(bank: &'static Bank, store: FlashOffsetStore<'static>) {
    info!("Controller task started");

    let homing = HomingController::new(bank, Delay, MOTION, HOMING);
    let mut controller = Controller::new(homing, store);

    loop {
        let command = COMMAND_CHANNEL.receive().await;
        debug!("Executing {:?}", command);

        let result = controller.execute(command).await;
        match &result {
            Ok(_) => debug!("Command complete"),
            Err(e) => warn!("Command {:?} failed: {:?}", command, e),
        }

        if matches!(command, Command::ZeroAll | Command::OffsetFromTwelve) && result.is_ok() {
            info!("Zero offsets: {:?}", controller.store().table());
        }

        COMMAND_RESULT.signal(result);
    }
}
