//! In-process simulated power supply.
//!
//! Accepts the same command strings as the real instrument and keeps a
//! record of every open and every byte written, so callers can check what
//! reached the line. Used by tests and by `send --simulate`.

use super::{Connector, Link};
use crate::types::PortId;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// How the simulated instrument answers a query.
#[derive(Debug, Clone, PartialEq)]
pub enum SimBehavior {
    /// Reply with the text of the last set command, verbatim.
    Echo,
    /// Reply with a fixed line regardless of what was set.
    Reply(String),
    /// Never reply; reads time out.
    Silent,
}

#[derive(Debug, Default)]
struct SimState {
    open_links: usize,
    opens: usize,
    written: Vec<u8>,
    settings: HashMap<String, String>,
}

/// A simulated instrument reachable on a fixed set of port names.
#[derive(Debug, Clone)]
pub struct SimulatedInstrument {
    ports: HashSet<String>,
    behavior: SimBehavior,
    state: Arc<Mutex<SimState>>,
}

impl SimulatedInstrument {
    /// Create an instrument reachable on `ports`.
    pub fn new<I, S>(ports: I, behavior: SimBehavior) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ports: ports.into_iter().map(Into::into).collect(),
            behavior,
            state: Arc::new(Mutex::new(SimState::default())),
        }
    }

    /// Instrument on a single port that echoes set values back.
    pub fn echo(port: impl Into<String>) -> Self {
        Self::new([port.into()], SimBehavior::Echo)
    }

    /// All bytes written across every link.
    pub fn written(&self) -> Vec<u8> {
        self.lock().written.clone()
    }

    /// Number of links currently held open.
    pub fn open_links(&self) -> usize {
        self.lock().open_links
    }

    /// Number of successful opens so far.
    pub fn opens(&self) -> usize {
        self.lock().opens
    }

    /// Last value set for a mnemonic (`"VOLT"` / `"CURR"`).
    pub fn setting(&self, mnemonic: &str) -> Option<String> {
        self.lock().settings.get(mnemonic).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        // A panic while holding the lock only happens in a failing test.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Connector for SimulatedInstrument {
    fn open(&self, port: &PortId, _baud_rate: u32, _timeout: Duration) -> io::Result<Box<dyn Link>> {
        if !self.ports.contains(port.as_str()) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such port: {}", port),
            ));
        }

        {
            let mut state = self.lock();
            state.opens += 1;
            state.open_links += 1;
        }

        Ok(Box::new(SimLink {
            instrument: self.clone(),
            pending_command: Vec::new(),
            output: VecDeque::new(),
        }))
    }
}

struct SimLink {
    instrument: SimulatedInstrument,
    pending_command: Vec<u8>,
    output: VecDeque<u8>,
}

impl SimLink {
    fn handle_command(&mut self, command: &str) {
        let command = command.trim();

        if let Some(mnemonic) = command.strip_suffix('?') {
            let reply = match &self.instrument.behavior {
                SimBehavior::Echo => self.instrument.setting(mnemonic),
                SimBehavior::Reply(line) => Some(line.clone()),
                SimBehavior::Silent => None,
            };
            if let Some(reply) = reply {
                self.output.extend(reply.bytes());
                self.output.push_back(b'\n');
            }
        } else if let Some((mnemonic, value)) = command.split_once(' ') {
            self.instrument
                .lock()
                .settings
                .insert(mnemonic.to_string(), value.to_string());
        }
    }
}

impl Write for SimLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.instrument.lock().written.extend_from_slice(buf);

        for &byte in buf {
            if byte == b'\r' {
                let command = String::from_utf8_lossy(&self.pending_command).into_owned();
                self.pending_command.clear();
                self.handle_command(&command);
            } else {
                self.pending_command.push(byte);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for SimLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.output.is_empty() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "operation timed out"));
        }

        let n = buf.len().min(self.output.len());
        for (slot, byte) in buf.iter_mut().zip(self.output.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Drop for SimLink {
    fn drop(&mut self) {
        let mut state = self.instrument.lock();
        state.open_links = state.open_links.saturating_sub(1);
    }
}
