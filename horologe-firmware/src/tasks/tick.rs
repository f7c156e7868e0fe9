//! Step timer task
//!
//! Runs the tick engine for every hand at the configured period, then
//! hands queued move commands to devices that became idle.

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::config::MOTION;
use crate::Bank;

/// Tick task - steps all hands once per timer period
#[embassy_executor::task]
pub async fn tick_task(bank: &'static Bank) {
    info!("Tick task started ({}us period)", MOTION.tick_period_us);

    let mut ticker = Ticker::every(Duration::from_micros(MOTION.tick_period_us as u64));

    loop {
        ticker.next().await;

        bank.tick_all();

        let dispatched = bank.dispatch_queued();
        if dispatched > 0 {
            trace!("Dispatched {} queued moves", dispatched);
        }
    }
}
