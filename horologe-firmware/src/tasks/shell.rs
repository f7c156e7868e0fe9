//! Serial command shell
//!
//! Line-oriented console on UART0. Each line is parsed into a `Command`,
//! forwarded to the controller task, and the result printed back.

use core::fmt::Write as _;

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embedded_io_async::{Read, Write};
use heapless::String;

use horologe_core::command::{Command, Response, HELP};
use horologe_core::Error;

use crate::channels::{COMMAND_CHANNEL, COMMAND_RESULT};

/// Longest accepted input line
const LINE_SIZE: usize = 64;

/// Output buffer for one response
const OUT_SIZE: usize = 768;

const PROMPT: &[u8] = b"> ";

/// Shell task - reads lines, dispatches commands, prints results
#[embassy_executor::task]
pub async fn shell_task(mut tx: BufferedUartTx, mut rx: BufferedUartRx) {
    info!("Shell task started");

    let mut line: String<LINE_SIZE> = String::new();
    let mut buf = [0u8; 16];
    let mut overflow = false;

    write_bytes(&mut tx, PROMPT).await;

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
        };

        for &byte in &buf[..n] {
            match byte {
                b'\r' | b'\n' => {
                    write_bytes(&mut tx, b"\r\n").await;
                    if overflow {
                        write_bytes(&mut tx, b"error: line too long\r\n").await;
                    } else if !line.trim().is_empty() {
                        let out = run_line(line.as_str()).await;
                        write_bytes(&mut tx, out.as_bytes()).await;
                    }
                    line.clear();
                    overflow = false;
                    write_bytes(&mut tx, PROMPT).await;
                }
                // Backspace / DEL
                0x08 | 0x7f => {
                    if line.pop().is_some() {
                        write_bytes(&mut tx, b"\x08 \x08").await;
                    }
                }
                b' '..=b'~' => {
                    if line.push(byte as char).is_err() {
                        overflow = true;
                    } else {
                        write_bytes(&mut tx, &[byte]).await;
                    }
                }
                _ => {}
            }
        }
    }
}

/// Parse and execute one line, returning the text to print
async fn run_line(line: &str) -> String<OUT_SIZE> {
    let result = match Command::parse(line) {
        Ok(command) => {
            COMMAND_CHANNEL.send(command).await;
            COMMAND_RESULT.wait().await
        }
        Err(e) => {
            debug!("Parse error: {:?}", e);
            Err(Error::from(e))
        }
    };

    let mut out = String::new();
    // Output is truncated if the buffer fills up
    let _ = format_result(&mut out, &result);
    out
}

fn format_result(out: &mut String<OUT_SIZE>, result: &Result<Response, Error>) -> core::fmt::Result {
    match result {
        Ok(Response::Done) => write!(out, "ok\r\n"),
        Ok(Response::Help) => {
            for (usage, text) in HELP {
                write!(out, "stepper {:<18} {}\r\n", usage, text)?;
            }
            Ok(())
        }
        Ok(Response::Idle(idle)) => write!(out, "{}\r\n", if *idle { "idle" } else { "busy" }),
        Ok(Response::Status {
            steps_per_revolution,
            hands,
        }) => {
            write!(out, "steps/rev: {}\r\n", steps_per_revolution)?;
            for (id, status) in hands {
                write!(
                    out,
                    "clock {} motor {}: pos={} delay={} queued={} {:?}\r\n",
                    id.clock, id.motor, status.position, status.delay, status.queued, status.state
                )?;
            }
            Ok(())
        }
        Err(e) => write!(out, "error: {:?}\r\n", e),
    }
}

async fn write_bytes(tx: &mut BufferedUartTx, bytes: &[u8]) {
    if let Err(e) = tx.write_all(bytes).await {
        warn!("UART write error: {:?}", e);
    }
}
