//! Keystroke-level input grammars.
//!
//! Each field is checked against its grammar and classified into one of
//! three states, the way a line-edit validator colours its border while the
//! operator types. The states are advisory: hard rejection happens at
//! submission time in [`Setpoint::parse`](crate::types::Setpoint::parse)
//! and [`PortId::from_input`](crate::types::PortId::from_input).

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Most fractional digits the instrument accepts.
pub const MAX_FRACTION_DIGITS: usize = 3;

/// Classification of partially typed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationState {
    /// Input matches the grammar.
    Valid,
    /// Input could still become valid with more characters.
    Intermediate,
    /// No continuation of the input can match.
    Invalid,
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Invalid => write!(f, "invalid"),
        }
    }
}

/// Classify a port-number field: one or two digits.
pub fn validate_port_number(text: &str) -> ValidationState {
    static FULL: OnceLock<Regex> = OnceLock::new();
    let full = FULL.get_or_init(|| Regex::new(r"^[0-9]{1,2}$").expect("port regex should compile"));

    if full.is_match(text) {
        ValidationState::Valid
    } else if text.is_empty() {
        ValidationState::Intermediate
    } else {
        ValidationState::Invalid
    }
}

/// Classify a set-value field: up to two integer digits, an optional
/// decimal point, then one to three digits.
pub fn validate_set_value(text: &str) -> ValidationState {
    static FULL: OnceLock<Regex> = OnceLock::new();
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let full = FULL.get_or_init(|| {
        Regex::new(r"^[0-9]{0,2}\.?[0-9]{1,3}$").expect("set value regex should compile")
    });
    // Proper prefixes of the full grammar that are not matches themselves:
    // the empty string and digits followed by a trailing decimal point.
    let prefix = PREFIX.get_or_init(|| {
        Regex::new(r"^[0-9]{0,2}\.?$").expect("set value prefix regex should compile")
    });

    if full.is_match(text) {
        ValidationState::Valid
    } else if prefix.is_match(text) {
        ValidationState::Intermediate
    } else {
        ValidationState::Invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_number_states() {
        assert_eq!(validate_port_number("3"), ValidationState::Valid);
        assert_eq!(validate_port_number("12"), ValidationState::Valid);
        assert_eq!(validate_port_number(""), ValidationState::Intermediate);
        assert_eq!(validate_port_number("123"), ValidationState::Invalid);
        assert_eq!(validate_port_number("a"), ValidationState::Invalid);
        assert_eq!(validate_port_number("COM3"), ValidationState::Invalid);
    }

    #[test]
    fn test_set_value_valid() {
        for text in ["0", "5", "12.5", "60.600", ".5", "4.040", "123", "12345"] {
            assert_eq!(validate_set_value(text), ValidationState::Valid, "{:?}", text);
        }
    }

    #[test]
    fn test_set_value_intermediate() {
        for text in ["", ".", "1.", "12."] {
            assert_eq!(
                validate_set_value(text),
                ValidationState::Intermediate,
                "{:?}",
                text
            );
        }
    }

    #[test]
    fn test_set_value_invalid() {
        for text in ["abc", "-1", "1.2345", "123.4", "1e3", "1.2.3", "12 "] {
            assert_eq!(validate_set_value(text), ValidationState::Invalid, "{:?}", text);
        }
    }
}
