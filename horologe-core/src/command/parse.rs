//! Shell line parser for the `stepper` verbs

use crate::clock::HandId;
use crate::config::{HANDS_PER_CLOCK, MAX_CLOCKS};
use crate::error::Error;

/// Command parse errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Line is not a stepper command
    Unknown,
    /// Required argument missing
    MissingArgument,
    /// Argument is not a decimal integer
    InvalidNumber,
    /// Clock, motor or value outside its range
    OutOfRange,
    /// Unexpected trailing argument
    TrailingArgument,
}

impl From<ParseError> for Error {
    fn from(_: ParseError) -> Self {
        Error::Failed
    }
}

/// A parsed stepper command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Help,
    Status,
    /// Reset the motor drivers
    Reset,
    /// Report whether every hand is idle
    Idle,
    /// Fold engine positions into one revolution
    Normalize,
    /// Home every hand with its stored offset
    ZeroAll,
    /// Home one hand with its stored offset
    Zero(HandId),
    /// Measure offsets with all hands at 12 o'clock
    OffsetFromTwelve,
    /// Write one stored offset
    SetOffset(HandId, i16),
    /// Exercise one clock, or all clocks for `None`
    Test(Option<u8>),
    /// Raw relative move through the driver
    Step(HandId, i32),
}

impl Command {
    /// Parse one shell line
    ///
    /// Accepts `stepper <verb> ...` as well as bare `help` and `status`.
    /// Clock indices are checked against the arena capacity only; the
    /// controller rejects clocks that are not installed.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut args = line.split_whitespace();
        let first = args.next().ok_or(ParseError::Unknown)?;

        let verb = match first {
            "help" => return finish(args, Command::Help),
            "status" => return finish(args, Command::Status),
            "stepper" => args.next().ok_or(ParseError::Unknown)?,
            _ => return Err(ParseError::Unknown),
        };

        let cmd = match verb {
            "help" => Command::Help,
            "status" => Command::Status,
            "reset" => Command::Reset,
            "idle" => Command::Idle,
            "normalize" => Command::Normalize,
            "zero" => match args.next() {
                Some("all") => Command::ZeroAll,
                Some(clock) => Command::Zero(hand_id(clock, args.next())?),
                None => return Err(ParseError::MissingArgument),
            },
            "offs" => match args.next() {
                Some("12") => Command::OffsetFromTwelve,
                Some(clock) => {
                    let id = hand_id(clock, args.next())?;
                    let value = number(args.next())?;
                    let value = i16::try_from(value).map_err(|_| ParseError::OutOfRange)?;
                    Command::SetOffset(id, value)
                }
                None => return Err(ParseError::MissingArgument),
            },
            "test" => {
                let clock = number(args.next())?;
                if clock == -1 {
                    Command::Test(None)
                } else if (0..MAX_CLOCKS as i32).contains(&clock) {
                    Command::Test(Some(clock as u8))
                } else {
                    return Err(ParseError::OutOfRange);
                }
            }
            "step" => {
                let clock = args.next().ok_or(ParseError::MissingArgument)?;
                let id = hand_id(clock, args.next())?;
                Command::Step(id, number(args.next())?)
            }
            _ => return Err(ParseError::Unknown),
        };

        finish(args, cmd)
    }
}

fn finish<'a>(mut rest: impl Iterator<Item = &'a str>, cmd: Command) -> Result<Command, ParseError> {
    match rest.next() {
        Some(_) => Err(ParseError::TrailingArgument),
        None => Ok(cmd),
    }
}

fn number(arg: Option<&str>) -> Result<i32, ParseError> {
    arg.ok_or(ParseError::MissingArgument)?
        .parse()
        .map_err(|_| ParseError::InvalidNumber)
}

fn hand_id(clock: &str, motor: Option<&str>) -> Result<HandId, ParseError> {
    let clock = number(Some(clock))?;
    let motor = number(motor)?;
    if !(0..MAX_CLOCKS as i32).contains(&clock) || !(0..HANDS_PER_CLOCK as i32).contains(&motor) {
        return Err(ParseError::OutOfRange);
    }
    Ok(HandId::new(clock as u8, motor as u8))
}
