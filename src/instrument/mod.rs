//! Instrument transport - the set-and-confirm exchange over a serial line.
//!
//! The exchange itself only talks to a [`Connector`], which opens a
//! [`Link`] to a named port. [`SerialConnector`] opens real serial ports;
//! [`SimulatedInstrument`] answers in-process and records what it saw.

mod exchange;
pub mod protocol;
pub mod serial;
pub mod sim;

pub use exchange::{send_and_confirm, Confirmation};
pub use serial::SerialConnector;
pub use sim::{SimBehavior, SimulatedInstrument};

use crate::types::PortId;
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};
use std::time::Duration;

/// A byte stream to an open port. Dropping it releases the port.
pub trait Link: Read + Write + Send {}

impl<T: Read + Write + Send + ?Sized> Link for T {}

/// Opens links to named ports.
pub trait Connector: Send + Sync {
    /// Open `port` at `baud_rate` with `timeout` applied to every read.
    fn open(&self, port: &PortId, baud_rate: u32, timeout: Duration) -> io::Result<Box<dyn Link>>;
}

/// How the queried value is compared against the commanded one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmPolicy {
    /// IEEE-754 equality. Values without an exact binary representation
    /// (0.015, for one) only confirm if the instrument echoes the same text.
    Exact,
    /// Absolute difference no larger than the given amount.
    Tolerance(f64),
}

impl ConfirmPolicy {
    pub fn accepts(&self, commanded: f64, observed: f64) -> bool {
        match *self {
            Self::Exact => observed == commanded,
            Self::Tolerance(tolerance) => (observed - commanded).abs() <= tolerance,
        }
    }
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self::Exact
    }
}

/// Line parameters for one exchange.
#[derive(Debug, Clone)]
pub struct ExchangeSettings {
    pub baud_rate: u32,
    /// Timeout used for the reachability probe.
    pub probe_timeout: Duration,
    /// Timeout for reading the query response.
    pub read_timeout: Duration,
    pub confirm: ConfirmPolicy,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            probe_timeout: Duration::ZERO,
            read_timeout: Duration::from_secs(3),
            confirm: ConfirmPolicy::Exact,
        }
    }
}
