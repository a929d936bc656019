//! Configuration management for psu-remote.
//!
//! Provides XDG-compliant settings storage: line parameters, port naming,
//! confirmation policy and build manifest locations.

mod settings;

pub use settings::{AppSettings, Paths};
