//! The two programmable quantities of the instrument and their limits.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive operating range of a quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub min: f64,
    pub max: f64,
}

impl Limits {
    /// Check if `value` lies within the range (bounds included).
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A programmable output quantity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    /// Output voltage, 0.000 to 60.600 V.
    Voltage,
    /// Output current, 0.015 to 4.040 A.
    Current,
}

impl Quantity {
    const VOLTAGE_LIMITS: Limits = Limits {
        min: 0.000,
        max: 60.600,
    };
    const CURRENT_LIMITS: Limits = Limits {
        min: 0.015,
        max: 4.040,
    };

    /// SCPI mnemonic used on the wire.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Voltage => "VOLT",
            Self::Current => "CURR",
        }
    }

    /// Operating range accepted by the instrument.
    pub const fn limits(self) -> Limits {
        match self {
            Self::Voltage => Self::VOLTAGE_LIMITS,
            Self::Current => Self::CURRENT_LIMITS,
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::Voltage => "V",
            Self::Current => "A",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Voltage => write!(f, "Voltage"),
            Self::Current => write!(f, "Current"),
        }
    }
}
