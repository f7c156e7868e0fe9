//! Shell command verbs
//!
//! `parse` turns one shell line into a `Command`; the `Controller`
//! executes it against the hand bank, the homing controller and the
//! offset store. Text rendering of the response is left to the caller.

mod controller;
mod parse;

pub use controller::{Controller, Response, HELP};
pub use parse::{Command, ParseError};
