//! # Console Commands
//!
//! Single-character commands typed on stdin, polled without blocking.
//!
//! | Key | Command |
//! |-----|---------|
//! | `S` / `s` | Toggle the simulator |
//! | `H` / `h` / `?` | Show help |
//! | `R` / `r` | Reset simulator state |
//! | `I` / `i` | Show status |
//!
//! Newlines are ignored; any other character is echoed back as unknown.

use std::io::Read;
use std::thread;

use tokio::sync::mpsc;
use tracing::debug;

use crate::error::Result;

/// Help text printed for the help command
pub const HELP_TEXT: &str = "\
Commands:
  s  toggle simulator on/off
  h  show this help (also ?)
  r  reset simulator state
  i  show status";

/// A recognised console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    ToggleSimulator,
    Help,
    Reset,
    Status,
    /// Anything not listed above
    Unknown(char),
}

impl ConsoleCommand {
    /// Decode one input byte; `None` for line endings
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'\n' | b'\r' => None,
            b'S' | b's' => Some(Self::ToggleSimulator),
            b'H' | b'h' | b'?' => Some(Self::Help),
            b'R' | b'r' => Some(Self::Reset),
            b'I' | b'i' => Some(Self::Status),
            other => Some(Self::Unknown(char::from(other))),
        }
    }
}

/// Non-blocking reader of console commands
#[derive(Debug)]
pub struct ConsoleReader {
    rx: mpsc::UnboundedReceiver<u8>,
}

impl ConsoleReader {
    /// Wrap a channel of raw input bytes
    pub fn from_receiver(rx: mpsc::UnboundedReceiver<u8>) -> Self {
        Self { rx }
    }

    /// Start a background thread forwarding stdin bytes
    ///
    /// The thread ends when stdin closes or the reader is dropped.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the thread cannot be spawned
    pub fn spawn_stdin() -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        thread::Builder::new()
            .name("wx-console".to_string())
            .spawn(move || {
                for byte in std::io::stdin().lock().bytes() {
                    let Ok(byte) = byte else { break };
                    if tx.send(byte).is_err() {
                        break;
                    }
                }
                debug!("Console input closed");
            })?;

        Ok(Self::from_receiver(rx))
    }

    /// Next pending command, if any, without waiting
    pub fn poll(&mut self) -> Option<ConsoleCommand> {
        while let Ok(byte) = self.rx.try_recv() {
            if let Some(command) = ConsoleCommand::from_byte(byte) {
                return Some(command);
            }
        }
        None
    }
}
