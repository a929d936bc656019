//! # psu-remote - Remote set-point control for serial bench power supplies
//!
//! psu-remote sets the output voltage or current limit of a bench power
//! supply over a serial link and confirms the change by reading the value
//! back from the instrument.
//!
//! ## Features
//!
//! - **Checked input**: values are validated against the instrument's
//!   limits and a three-decimal grammar before anything is sent
//! - **Confirmed writes**: every set command is followed by a query and the
//!   reply is compared with what was commanded
//! - **Port discovery**: list serial ports with their USB identifiers
//! - **Build check**: a signed manifest ties the reported version to the
//!   executable it ships with
//! - **Exchange history**: past exchanges are saved and exportable
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use psu_remote::instrument::{send_and_confirm, ExchangeSettings, SerialConnector};
//! use psu_remote::types::{PortId, Quantity, Setpoint};
//!
//! let port = PortId::from_input("3", "COM")?;
//! let setpoint = Setpoint::parse(Quantity::Voltage, "12.5")?;
//! let confirmation = send_and_confirm(&SerialConnector, &port, &setpoint, &ExchangeSettings::default())?;
//!
//! println!("{} confirmed at {}", setpoint, confirmation.observed);
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Newtypes for ports, quantities, set-points and record IDs
//! - [`validation`] - Live classification of operator input
//! - [`instrument`] - Serial transport, wire protocol and the confirm exchange
//! - [`ports`] - Serial port enumeration
//! - [`manifest`] - Build manifest stamping and version check
//! - [`config`] - Persistent settings
//! - [`storage`] - Exchange history persistence
//! - [`error`] - Error types and exit codes
//! - [`output`] - Output formatting utilities

pub mod cli;
pub mod config;
pub mod error;
pub mod instrument;
pub mod logging;
pub mod manifest;
pub mod output;
pub mod ports;
pub mod storage;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use error::{CliError, ControlError};
pub use instrument::{send_and_confirm, Confirmation, ExchangeSettings};
pub use manifest::{check_version, VersionStatus};
pub use ports::{list_ports, PortDescriptor};
pub use types::{PortId, Quantity, Setpoint};
