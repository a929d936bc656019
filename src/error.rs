//! Error types for psu-remote.
//!
//! Uses `thiserror` for ergonomic error definitions. Every failure is
//! recoverable: it is reported to the operator and nothing is retried.

use crate::types::{Quantity, RecordIdError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while validating or carrying out a set-point exchange.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    /// The port could not be opened. Nothing was written.
    #[error("could not open \"{port}\": {reason}")]
    PortUnavailable { port: String, reason: String },

    /// The instrument reported a different value than the one commanded.
    #[error("could not confirm set value: {quantity} commanded {commanded}, instrument reports {observed}")]
    Unconfirmed {
        quantity: Quantity,
        commanded: f64,
        observed: f64,
    },

    /// The value lies outside the instrument's operating range.
    #[error("{quantity} value {value} not within instrument limits: {min} <= value <= {max}")]
    OutOfRange {
        quantity: Quantity,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Operator input that does not describe a port or a value.
    #[error("{0}")]
    MalformedInput(String),

    #[error("failed writing to \"{port}\": {reason}")]
    WriteFailed { port: String, reason: String },

    #[error("failed reading from \"{port}\": {reason}")]
    ReadFailed { port: String, reason: String },

    /// Read timeout elapsed before a full response line arrived.
    #[error("no response from instrument on \"{port}\"")]
    NoResponse { port: String },

    #[error("instrument on \"{port}\" sent an unreadable response: {response:?}")]
    InvalidResponse { port: String, response: String },
}

impl ControlError {
    /// Process exit code for this failure.
    ///
    /// 1 and 2 follow the documented headless contract; input rejection and
    /// mid-exchange communication failures get their own codes.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PortUnavailable { .. } => 1,
            Self::Unconfirmed { .. } => 2,
            Self::OutOfRange { .. } | Self::MalformedInput(_) => 3,
            Self::WriteFailed { .. }
            | Self::ReadFailed { .. }
            | Self::NoResponse { .. }
            | Self::InvalidResponse { .. } => 4,
        }
    }

    /// True when the request was rejected before any port I/O.
    pub fn is_input_rejection(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::MalformedInput(_))
    }
}

/// Result type alias for exchange operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors raised while writing a build manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("build artifact not found: {0}")]
    ArtifactNotFound(PathBuf),

    #[error("invalid build date '{0}', expected YYYYMMDD")]
    InvalidDate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Exchange history storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("history directory error: {0}")]
    DirectoryError(String),

    #[error("failed to save record: {0}")]
    SaveFailed(String),

    #[error("failed to load record: {0}")]
    LoadFailed(String),

    #[error("no exchange record matches '{0}'")]
    RecordNotFound(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Top-level error for CLI commands.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Control(#[from] ControlError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    RecordId(#[from] RecordIdError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Process exit code for this failure.
    ///
    /// Exchange failures keep their own codes; anything local to this
    /// machine (settings, history, manifest, output) exits with 5.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Control(e) => e.exit_code(),
            Self::Cancelled => 130,
            _ => 5,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let unavailable = ControlError::PortUnavailable {
            port: "COM99".to_string(),
            reason: "not found".to_string(),
        };
        assert_eq!(unavailable.exit_code(), 1);

        let unconfirmed = ControlError::Unconfirmed {
            quantity: Quantity::Voltage,
            commanded: 30.0,
            observed: 29.999,
        };
        assert_eq!(unconfirmed.exit_code(), 2);

        let rejected = ControlError::MalformedInput("empty".to_string());
        assert_eq!(rejected.exit_code(), 3);
        assert!(rejected.is_input_rejection());

        let silent = ControlError::NoResponse {
            port: "COM3".to_string(),
        };
        assert_eq!(silent.exit_code(), 4);
        assert!(!silent.is_input_rejection());
    }

    #[test]
    fn test_cli_error_delegates_exit_code() {
        let err: CliError = ControlError::Unconfirmed {
            quantity: Quantity::Current,
            commanded: 1.0,
            observed: 0.5,
        }
        .into();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(CliError::Cancelled.exit_code(), 130);
    }

    #[test]
    fn test_local_failures_do_not_share_port_exit_code() {
        let errors: Vec<CliError> = vec![
            ConfigError::InvalidFormat("baud_rate must be positive".to_string()).into(),
            StorageError::RecordNotFound("abcd".to_string()).into(),
            ManifestError::InvalidDate("2024".to_string()).into(),
            CliError::Other("no data directory".to_string()),
        ];
        for err in errors {
            assert_eq!(err.exit_code(), 5, "{}", err);
        }
    }

    #[test]
    fn test_port_unavailable_message() {
        let err = ControlError::PortUnavailable {
            port: "COM99".to_string(),
            reason: "No such file or directory".to_string(),
        };
        assert!(err.to_string().contains("\"COM99\""));
    }
}
