//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::instrument::Confirmation;
use crate::manifest::VersionStatus;
use crate::ports::PortDescriptor;
use crate::storage::{ExchangeOutcome, ExchangeRecord};
use crate::types::{PortId, Setpoint};
use crate::validation::ValidationState;
use console::{style, Style};
use std::io::{self, Write};
use std::time::Duration;

const RULE: &str = "───────────────────────────────────────────────────────────────";

/// Print the port list followed by the number found.
pub fn print_ports(ports: &[PortDescriptor]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out)?;
    writeln!(out, "{}", style("Port List").bold())?;
    writeln!(out, "{}", style(RULE).dim())?;

    for port in ports {
        writeln!(out, "{}", style(&port.device).white().bold())?;
        field(&mut out, "Description", Some(&port.description))?;
        field(&mut out, "Hardware ID", Some(&port.hwid))?;
        field(&mut out, "Vendor ID", port.vid.map(|v| format!("0x{:04X}", v)).as_ref())?;
        field(&mut out, "Product ID", port.pid.map(|p| format!("0x{:04X}", p)).as_ref())?;
        field(&mut out, "Serial number", port.serial_number.as_ref())?;
        field(&mut out, "Location", port.location.as_ref())?;
        field(&mut out, "Manufacturer", port.manufacturer.as_ref())?;
        field(&mut out, "Product", port.product.as_ref())?;
        writeln!(out)?;
    }

    writeln!(out, "{} ports found", style(ports.len()).bold())?;
    writeln!(out, "{}", style(RULE).dim())?;
    writeln!(out)?;

    Ok(())
}

fn field<W: Write>(out: &mut W, label: &str, value: Option<&String>) -> io::Result<()> {
    let value = value.map_or("None", |v| v.as_str());
    writeln!(out, "     {:<14} {}", style(format!("{}:", label)).dim(), value)
}

/// Print the banner before an exchange starts.
pub fn print_exchange_header(port: &PortId, setpoint: &Setpoint) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("psu-remote").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{} Port: {}", style("•").dim(), style(port).white().bold());
    println!(
        "{} Set {} to {} {}",
        style("•").dim(),
        setpoint.quantity(),
        style(setpoint.text()).yellow(),
        setpoint.quantity().unit()
    );
    println!();
}

/// Print a confirmed exchange.
pub fn print_confirmation(confirmation: &Confirmation) {
    print_success(&format!(
        "{} value changed to {}",
        confirmation.setpoint.quantity(),
        confirmation.setpoint.text()
    ));
}

/// Print the closing line with the time taken.
pub fn print_exchange_footer(elapsed: Duration) {
    println!(
        "{} Time taken: {:.3}s",
        style("•").dim(),
        elapsed.as_secs_f64()
    );
    println!();
}

/// Print the version status line.
pub fn print_version(status: &VersionStatus) {
    let note = match status {
        VersionStatus::Normal(_) => style("build manifest verified").green(),
        VersionStatus::BuildArtifactMissing => style("build artifact not found").yellow(),
        VersionStatus::TokenMissingOrInvalid => style("build manifest missing or invalid").red(),
    };
    println!(
        "{} {} ({})",
        style("Version").bold(),
        status.display_version(),
        note
    );
}

/// Print the validation state of one input field.
pub fn print_validation(label: &str, text: &str, state: ValidationState) {
    let state_style = match state {
        ValidationState::Valid => Style::new().green().bold(),
        ValidationState::Intermediate => Style::new().blue(),
        ValidationState::Invalid => Style::new().red().bold(),
    };
    println!(
        "  {:<10} {:<12} {}",
        style(label).bold(),
        format!("{:?}", text),
        state_style.apply_to(state)
    );
}

/// Print recent exchanges, most recent first.
pub fn print_history(records: &[ExchangeRecord]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if records.is_empty() {
        writeln!(out, "  {}", style("No exchanges recorded.").dim())?;
        return Ok(());
    }

    writeln!(out)?;
    writeln!(
        out,
        "  {:<8}  {:<19}  {:<14}  {:<8}  {:>8}  {}",
        style("ID").bold(),
        style("STARTED").bold(),
        style("PORT").bold(),
        style("QTY").bold(),
        style("VALUE").bold(),
        style("OUTCOME").bold()
    )?;
    writeln!(out, "  {}", style(RULE).dim())?;

    for record in records {
        let outcome_style = match record.outcome {
            ExchangeOutcome::Confirmed => Style::new().green(),
            ExchangeOutcome::Unconfirmed => Style::new().yellow(),
            ExchangeOutcome::PortUnavailable | ExchangeOutcome::CommunicationError => {
                Style::new().red()
            }
        };

        writeln!(
            out,
            "  {:<8}  {:<19}  {:<14}  {:<8}  {:>8}  {}",
            style(record.id.short()).dim(),
            record.started_at.format("%Y-%m-%d %H:%M:%S"),
            truncate_string(record.port.as_str(), 14),
            record.quantity.mnemonic(),
            record.commanded,
            outcome_style.apply_to(record.outcome)
        )?;
    }

    writeln!(out)?;
    Ok(())
}

/// Print one exchange in full.
pub fn print_record(record: &ExchangeRecord) {
    println!("{} {}", style(record.id).dim(), record.summary());
    println!("  {:<10} {}", style("Started").dim(), record.started_at.to_rfc3339());
    if let Some(observed) = record.observed {
        println!("  {:<10} {}", style("Observed").dim(), observed);
    }
    if let Some(detail) = &record.detail {
        println!("  {:<10} {}", style("Detail").dim(), detail);
    }
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to a maximum length, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
