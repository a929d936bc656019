//! Serial port identifiers.

use crate::error::{ControlError, ControlResult};
use crate::validation::{validate_port_number, ValidationState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A platform serial port name, e.g. `COM3` or `/dev/ttyUSB0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(String);

impl PortId {
    /// Build a port identifier from operator input.
    ///
    /// A bare 1-2 digit number is appended to `prefix` (`"3"` becomes
    /// `COM3` with the Windows prefix). Anything else that is not purely
    /// numeric is taken as a device name as-is.
    pub fn from_input(input: &str, prefix: &str) -> ControlResult<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(ControlError::MalformedInput(
                "no COM port value specified".to_string(),
            ));
        }

        if input.chars().all(|c| c.is_ascii_digit()) {
            return match validate_port_number(input) {
                ValidationState::Valid => Ok(Self(format!("{}{}", prefix, input))),
                _ => Err(ControlError::MalformedInput(format!(
                    "port number '{}' must be 1-2 digits",
                    input
                ))),
            };
        }

        Ok(Self(input.to_string()))
    }

    /// Wrap a device name without interpretation.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
