//! Validated set-point requests.

use crate::error::{ControlError, ControlResult};
use crate::types::Quantity;
use crate::validation::{validate_set_value, ValidationState, MAX_FRACTION_DIGITS};
use serde::Serialize;
use std::fmt;

/// A quantity and value that passed submission checks.
///
/// The operator's text is kept because it is what goes on the wire; the
/// parsed value is what the instrument's reply is compared against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Setpoint {
    quantity: Quantity,
    value: f64,
    text: String,
}

impl Setpoint {
    /// Run submission checks on operator text.
    ///
    /// Keystroke-level validation states are advisory; here anything that
    /// is a complete decimal number with at most three fractional digits is
    /// accepted, and the instrument range decides the rest.
    pub fn parse(quantity: Quantity, text: &str) -> ControlResult<Self> {
        let text = text.trim();

        if text.is_empty() {
            return Err(ControlError::MalformedInput(
                "no set value specified".to_string(),
            ));
        }
        if text == "." {
            return Err(ControlError::MalformedInput(
                "set value is a lone decimal point".to_string(),
            ));
        }
        if validate_set_value(text) == ValidationState::Invalid {
            return Err(ControlError::MalformedInput(format!(
                "set value '{}' must be digits with an optional decimal point and at most {} fractional digits",
                text, MAX_FRACTION_DIGITS
            )));
        }

        let value: f64 = text
            .parse()
            .map_err(|_| ControlError::MalformedInput(format!("set value '{}' is not a number", text)))?;

        let limits = quantity.limits();
        if !limits.contains(value) {
            return Err(ControlError::OutOfRange {
                quantity,
                value,
                min: limits.min,
                max: limits.max,
            });
        }

        Ok(Self {
            quantity,
            value,
            text: text.to_string(),
        })
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// The value exactly as the operator entered it.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Setpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.quantity, self.text, self.quantity.unit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_in_range_values() {
        let sp = Setpoint::parse(Quantity::Voltage, "12.5").unwrap();
        assert_eq!(sp.value(), 12.5);
        assert_eq!(sp.text(), "12.5");

        assert!(Setpoint::parse(Quantity::Voltage, "0").is_ok());
        assert!(Setpoint::parse(Quantity::Voltage, "60.600").is_ok());
        assert!(Setpoint::parse(Quantity::Current, "0.015").is_ok());
        assert!(Setpoint::parse(Quantity::Current, "4.04").is_ok());
    }

    #[test]
    fn test_current_below_minimum_is_out_of_range() {
        let err = Setpoint::parse(Quantity::Current, "0.010").unwrap_err();
        assert!(matches!(
            err,
            ControlError::OutOfRange {
                quantity: Quantity::Current,
                ..
            }
        ));
    }

    #[test]
    fn test_voltage_above_maximum_is_out_of_range() {
        let err = Setpoint::parse(Quantity::Voltage, "60.601").unwrap_err();
        assert!(matches!(err, ControlError::OutOfRange { .. }));

        let err = Setpoint::parse(Quantity::Current, "5").unwrap_err();
        assert!(matches!(err, ControlError::OutOfRange { .. }));
    }

    #[test]
    fn test_malformed_input() {
        for text in ["", "   ", ".", "abc", "-1", "1.2345", "1e3", "1.2.3"] {
            let err = Setpoint::parse(Quantity::Voltage, text).unwrap_err();
            assert!(
                matches!(err, ControlError::MalformedInput(_)),
                "expected malformed for {:?}, got {:?}",
                text,
                err
            );
        }
    }

    #[test]
    fn test_trailing_decimal_point_is_accepted() {
        let sp = Setpoint::parse(Quantity::Voltage, "12.").unwrap();
        assert_eq!(sp.value(), 12.0);
        assert_eq!(sp.text(), "12.");
    }

    #[test]
    fn test_display() {
        let sp = Setpoint::parse(Quantity::Current, "1.5").unwrap();
        assert_eq!(sp.to_string(), "Current 1.5 A");
    }
}
