//! Inter-task communication channels
//!
//! The shell forwards parsed commands to the controller task and waits
//! for the result before reading the next line.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use horologe_core::command::{Command, Response};
use horologe_core::Error;

/// Channel capacity for shell commands
const COMMAND_CHANNEL_SIZE: usize = 8;

/// Parsed commands from the shell
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Result of the last executed command (updated by controller)
pub static COMMAND_RESULT: Signal<CriticalSectionRawMutex, Result<Response, Error>> = Signal::new();
