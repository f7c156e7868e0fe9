//! Command execution

use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

use super::Command;
use crate::clock::HandId;
use crate::config::MAX_HANDS;
use crate::error::Error;
use crate::homing::HomingController;
use crate::motion::HandStatus;
use crate::traits::{MagnetSensor, OffsetStore, StepperDriver};

/// Help lines for the `stepper` command group
pub const HELP: &[(&str, &str)] = &[
    ("help|status", "Print help or status information"),
    ("reset", "Reset the motor drivers"),
    ("test <c>", "Test stepper motors of clock <c>, or -1 for all"),
    ("zero all", "Move all motors to zero position using the magnet sensor"),
    ("zero <c> <m>", "Move clock <c> motor <m> to zero position"),
    ("offs <c> <m> <v>", "Set stored offset for clock <c> motor <m>"),
    ("offs 12", "Measure offsets with all hands at 12 o'clock"),
    ("step <c> <m> <n>", "Raw relative move of <n> steps"),
    ("idle", "Check if steppers are idle"),
    ("normalize", "Fold hand positions into one revolution"),
];

/// Result of a successfully executed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Done,
    Help,
    Status {
        steps_per_revolution: u32,
        hands: Vec<(HandId, HandStatus), MAX_HANDS>,
    },
    Idle(bool),
}

/// Executes shell commands
pub struct Controller<'a, D, S, T, O> {
    homing: HomingController<'a, D, S, T>,
    store: O,
}

impl<'a, D, S, T, O> Controller<'a, D, S, T, O>
where
    D: StepperDriver,
    S: MagnetSensor,
    T: DelayNs,
    O: OffsetStore,
{
    pub fn new(homing: HomingController<'a, D, S, T>, store: O) -> Self {
        Self { homing, store }
    }

    pub fn store(&self) -> &O {
        &self.store
    }

    pub async fn execute(&mut self, command: Command) -> Result<Response, Error> {
        let bank = self.homing.bank();
        match command {
            Command::Help => Ok(Response::Help),
            Command::Status => Ok(Response::Status {
                steps_per_revolution: self.homing.motion_config().steps_per_revolution,
                hands: bank.status(),
            }),
            Command::Reset => {
                bank.reset_drivers();
                Ok(Response::Done)
            }
            Command::Idle => Ok(Response::Idle(bank.is_idle())),
            Command::Normalize => {
                bank.normalize_positions();
                Ok(Response::Done)
            }
            Command::ZeroAll => {
                self.homing.zero_all_hands(&self.store).await?;
                Ok(Response::Done)
            }
            Command::Zero(id) => {
                self.homing.zero_hand(id, &self.store).await?;
                Ok(Response::Done)
            }
            Command::OffsetFromTwelve => {
                self.homing.set_offset_from_twelve_oclock(&mut self.store).await?;
                Ok(Response::Done)
            }
            Command::SetOffset(id, value) => {
                bank.with_hand(id, |_| ())?;
                let mut table = self.store.table().ok_or(Error::Erased)?;
                table.set(id, value);
                self.store.write_offsets(&table).await?;
                Ok(Response::Done)
            }
            Command::Test(clock) => {
                self.homing.run_exercise(clock).await?;
                Ok(Response::Done)
            }
            Command::Step(id, steps) => {
                self.homing.raw_steps(id, steps).await?;
                Ok(Response::Done)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;
    use crate::clock::HandBank;
    use crate::config::{HomingConfig, MotionConfig, ZeroOffsetTable};
    use crate::sim::{self, MemoryOffsetStore, SimBank, SimDelay, SimDriver, SimSensor};

    type SimController<'a> = Controller<'a, SimDriver, SimSensor, SimDelay<'a>, MemoryOffsetStore>;

    fn controller<'a>(bank: &'a SimBank, store: MemoryOffsetStore) -> SimController<'a> {
        let motion = MotionConfig {
            steps_per_revolution: 720,
            ..Default::default()
        };
        let homing = HomingController::new(
            bank,
            SimDelay::new(bank, motion.tick_period_us),
            motion,
            HomingConfig::default(),
        );
        Controller::new(homing, store)
    }

    fn run(ctrl: &mut SimController<'_>, line: &str) -> Result<Response, Error> {
        block_on(ctrl.execute(Command::parse(line)?))
    }

    #[test]
    fn test_help_and_idle() {
        let bank = HandBank::new(sim::clockwork(720, 1, sim::NO_SENSOR));
        let mut ctrl = controller(&bank, MemoryOffsetStore::default());
        assert_eq!(run(&mut ctrl, "help"), Ok(Response::Help));
        assert_eq!(run(&mut ctrl, "stepper idle"), Ok(Response::Idle(true)));
        bank.with_hand(HandId::new(0, 0), |h| h.device.move_relative_steps(3, 0))
            .unwrap();
        assert_eq!(run(&mut ctrl, "stepper idle"), Ok(Response::Idle(false)));
    }

    #[test]
    fn test_status_lists_every_hand() {
        let bank = HandBank::new(sim::clockwork(720, 2, sim::NO_SENSOR));
        let mut ctrl = controller(&bank, MemoryOffsetStore::default());
        match run(&mut ctrl, "stepper status") {
            Ok(Response::Status {
                steps_per_revolution,
                hands,
            }) => {
                assert_eq!(steps_per_revolution, 720);
                assert_eq!(hands.len(), 4);
                assert_eq!(hands[2].0, HandId::new(1, 0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_step_passes_through_to_driver() {
        let bank = HandBank::new(sim::clockwork(720, 1, sim::NO_SENSOR));
        let mut ctrl = controller(&bank, MemoryOffsetStore::default());
        assert_eq!(run(&mut ctrl, "stepper step 0 1 -25"), Ok(Response::Done));
        let (engine, driver) = bank
            .with_hand(HandId::new(0, 1), |h| (h.device.position(), h.device.driver_position()))
            .unwrap();
        assert_eq!(engine, 0);
        assert_eq!(driver, -25);
        assert_eq!(sim::shaft(&bank, HandId::new(0, 1)), -25);
    }

    #[test]
    fn test_step_leaves_other_hands_running() {
        let bank = HandBank::new(sim::clockwork(720, 1, sim::NO_SENSOR));
        let mut ctrl = controller(&bank, MemoryOffsetStore::default());
        bank.with_hand(HandId::new(0, 0), |h| h.device.move_relative_steps(50, 0))
            .unwrap();
        assert_eq!(run(&mut ctrl, "stepper step 0 1 5"), Ok(Response::Done));
        // 5 pulses spaced by 7 ticks each
        assert_eq!(sim::shaft(&bank, HandId::new(0, 0)), 35);
        assert_eq!(sim::shaft(&bank, HandId::new(0, 1)), 5);
    }

    #[test]
    fn test_normalize_folds_positions() {
        let bank = HandBank::new(sim::clockwork(720, 1, sim::NO_SENSOR));
        let mut ctrl = controller(&bank, MemoryOffsetStore::default());
        bank.with_hand(HandId::new(0, 0), |h| h.device.position = 1500).unwrap();
        bank.with_hand(HandId::new(0, 1), |h| h.device.position = -10).unwrap();
        assert_eq!(run(&mut ctrl, "stepper normalize"), Ok(Response::Done));
        let positions: std::vec::Vec<i32> = bank
            .status()
            .iter()
            .map(|(_, s)| s.position)
            .collect();
        assert_eq!(positions, [60, 710]);
    }

    #[test]
    fn test_uninstalled_clock_is_rejected() {
        let bank = HandBank::new(sim::clockwork(720, 1, sim::NO_SENSOR));
        let mut ctrl = controller(&bank, MemoryOffsetStore::default());
        assert_eq!(run(&mut ctrl, "stepper step 3 0 5"), Err(Error::InvalidHand));
        assert_eq!(run(&mut ctrl, "stepper test 2"), Err(Error::InvalidHand));
        assert_eq!(run(&mut ctrl, "stepper zero 1 1"), Err(Error::InvalidHand));
        assert_eq!(run(&mut ctrl, "stepper bogus"), Err(Error::Failed));
    }

    #[test]
    fn test_set_offset_refuses_erased_store() {
        let bank = HandBank::new(sim::clockwork(720, 1, sim::NO_SENSOR));
        let mut ctrl = controller(&bank, MemoryOffsetStore::default());
        assert_eq!(run(&mut ctrl, "stepper offs 0 1 12"), Err(Error::Erased));
        assert_eq!(ctrl.store().writes, 0);
    }

    #[test]
    fn test_set_offset_writes_table() {
        let bank = HandBank::new(sim::clockwork(720, 1, sim::NO_SENSOR));
        let mut ctrl = controller(&bank, MemoryOffsetStore::with_table(ZeroOffsetTable::new()));
        assert_eq!(run(&mut ctrl, "stepper offs 0 1 -12"), Ok(Response::Done));
        let table = ctrl.store().table().unwrap();
        assert_eq!(table.get(HandId::new(0, 1)), -12);
        assert!(table.verify_crc());
    }

    #[test]
    fn test_reset_reaches_every_driver() {
        let bank = HandBank::new(sim::clockwork(720, 1, sim::NO_SENSOR));
        let mut ctrl = controller(&bank, MemoryOffsetStore::default());
        assert_eq!(run(&mut ctrl, "stepper reset"), Ok(Response::Done));
        let resets = bank.with_hand(HandId::new(0, 1), |h| h.device.driver.resets).unwrap();
        assert_eq!(resets, 1);
    }

    #[test]
    fn test_zero_all_through_controller() {
        let bank = HandBank::new(sim::clockwork(720, 1, Some((300, 340))));
        let mut table = ZeroOffsetTable::new();
        table.set(HandId::new(0, 0), 10);
        let mut ctrl = controller(&bank, MemoryOffsetStore::with_table(table));
        assert_eq!(run(&mut ctrl, "stepper zero all"), Ok(Response::Done));
        assert_eq!(sim::shaft(&bank, HandId::new(0, 0)), 310);
        assert_eq!(sim::shaft(&bank, HandId::new(0, 1)), 300);
    }
}
