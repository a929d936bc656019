//! Validate subcommand implementation.
//!
//! Handles `psu-remote validate`, the terminal counterpart of live field
//! feedback: shows how each input classifies and whether it would be
//! accepted, without touching any port.

use super::{Context, OutputFormat};
use crate::error::{CliError, CliResult};
use crate::output;
use crate::types::{PortId, Quantity, Setpoint};
use crate::validation::{validate_port_number, validate_set_value, ValidationState};
use clap::Parser;
use serde::Serialize;

/// Check port and value input without sending anything.
#[derive(Parser, Debug)]
pub struct ValidateCommand {
    /// Port number text to classify
    #[arg(short, long, value_name = "TEXT")]
    pub port: Option<String>,

    /// Set value text to classify
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    pub value: Option<String>,

    /// Also run the submission checks for this quantity
    #[arg(long, value_enum)]
    pub quantity: Option<Quantity>,

    /// Output format (plain or json)
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

/// Classification of one field.
#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub field: &'static str,
    pub text: String,
    pub state: ValidationState,
    /// Submission verdict, when a quantity was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidateCommand {
    /// Execute the validate command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        self.output.reject_csv("validate")?;
        if self.port.is_none() && self.value.is_none() {
            return Err(CliError::Other(
                "nothing to validate: pass --port and/or --value".to_string(),
            ));
        }

        let reports = self.reports(ctx);

        match self.output {
            OutputFormat::Json => output::print_json(&reports)?,
            _ => {
                for report in &reports {
                    output::print_validation(report.field, &report.text, report.state);
                    if let Some(reason) = &report.reason {
                        ctx.info(reason);
                    }
                }
            }
        }

        Ok(())
    }

    /// Classify every given field.
    pub fn reports(&self, ctx: &Context) -> Vec<FieldReport> {
        let mut reports = Vec::new();

        if let Some(text) = &self.port {
            let verdict = PortId::from_input(text, &ctx.settings.port_prefix);
            reports.push(FieldReport {
                field: "port",
                text: text.clone(),
                state: validate_port_number(text),
                accepted: Some(verdict.is_ok()),
                reason: verdict.err().map(|e| e.to_string()),
            });
        }

        if let Some(text) = &self.value {
            let verdict = self.quantity.map(|q| Setpoint::parse(q, text));
            reports.push(FieldReport {
                field: "value",
                text: text.clone(),
                state: validate_set_value(text),
                accepted: verdict.as_ref().map(|v| v.is_ok()),
                reason: verdict.and_then(|v| v.err()).map(|e| e.to_string()),
            });
        }

        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppSettings;

    fn context() -> Context {
        Context {
            settings: AppSettings::default(),
            paths: None,
            verbose: false,
            quiet: true,
        }
    }

    #[test]
    fn test_reports_states_and_verdicts() {
        let cmd = ValidateCommand {
            port: Some("123".to_string()),
            value: Some("0.010".to_string()),
            quantity: Some(Quantity::Current),
            output: OutputFormat::Plain,
        };

        let reports = cmd.reports(&context());
        assert_eq!(reports.len(), 2);

        assert_eq!(reports[0].state, ValidationState::Invalid);
        assert_eq!(reports[0].accepted, Some(false));

        // Grammatically fine, but below the current minimum.
        assert_eq!(reports[1].state, ValidationState::Valid);
        assert_eq!(reports[1].accepted, Some(false));
        assert!(reports[1].reason.as_deref().unwrap().contains("limits"));
    }

    #[test]
    fn test_value_without_quantity_has_no_verdict() {
        let cmd = ValidateCommand {
            port: None,
            value: Some("12.".to_string()),
            quantity: None,
            output: OutputFormat::Plain,
        };

        let reports = cmd.reports(&context());
        assert_eq!(reports[0].state, ValidationState::Intermediate);
        assert!(reports[0].accepted.is_none());
    }

    #[test]
    fn test_requires_a_field() {
        let cmd = ValidateCommand {
            port: None,
            value: None,
            quantity: None,
            output: OutputFormat::Plain,
        };
        assert!(cmd.execute(&context()).is_err());
    }
}
