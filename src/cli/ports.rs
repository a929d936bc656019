//! Ports subcommand implementation.
//!
//! Handles `psu-remote ports` for listing serial ports.

use super::{Context, OutputFormat};
use crate::error::CliResult;
use crate::output;
use crate::ports::list_ports;
use clap::Parser;
use std::io;

/// List the serial ports on this machine.
#[derive(Parser, Debug)]
pub struct PortsCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl PortsCommand {
    /// Execute the ports command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let ports = list_ports();

        match self.output {
            OutputFormat::Plain if ctx.quiet => {
                for port in &ports {
                    println!("{}", port.device);
                }
            }
            OutputFormat::Plain => output::print_ports(&ports)?,
            OutputFormat::Json => output::print_json(&ports)?,
            OutputFormat::Csv => output::write_ports_csv(io::stdout().lock(), &ports)?,
        }

        Ok(())
    }
}
