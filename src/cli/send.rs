//! Send subcommand implementation.
//!
//! Handles `psu-remote send`: validate, set, query, confirm.

use super::{Context, OutputFormat};
use crate::error::{CliError, CliResult, ControlResult};
use crate::instrument::{send_and_confirm, Confirmation, Connector, SerialConnector, SimulatedInstrument};
use crate::output;
use crate::storage::ExchangeRecord;
use crate::types::{PortId, Quantity, Setpoint};
use chrono::{DateTime, Utc};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Set a voltage or current on the instrument and confirm it.
///
/// Exit status: 0 confirmed, 1 port could not be opened, 2 instrument
/// reported a different value, 3 input rejected before sending, 4 the
/// instrument did not answer properly, 5 a local failure such as settings
/// or history.
#[derive(Parser, Debug)]
pub struct SendCommand {
    /// Serial port: a 1-2 digit port number or a device name
    ///
    /// Examples:
    ///   3               Port number, expanded with the configured prefix
    ///   COM3            Windows device name
    ///   /dev/ttyUSB0    Unix device path
    #[arg(short, long, value_name = "PORT")]
    pub port: String,

    /// Quantity to set
    #[arg(long, value_enum)]
    pub quantity: Quantity,

    /// Value to set (voltage 0.000-60.600, current 0.015-4.040, at most 3 decimals)
    #[arg(long, value_name = "VALUE", allow_hyphen_values = true)]
    pub value: String,

    /// Talk to a simulated instrument that echoes set values
    #[arg(long)]
    pub simulate: bool,

    /// Don't record this exchange in the history
    #[arg(long)]
    pub no_save: bool,

    /// Output format for the result (plain or json)
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl SendCommand {
    /// Execute the send command.
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        let connector: Arc<dyn Connector> = if self.simulate {
            let port = PortId::from_input(&self.port, &ctx.settings.port_prefix)?;
            Arc::new(SimulatedInstrument::echo(port.as_str()))
        } else {
            Arc::new(SerialConnector)
        };

        self.run(ctx, connector).await
    }

    /// Validate the request, then run the exchange through `connector`.
    /// Nothing is opened unless the port and value pass their checks.
    async fn run(&self, ctx: &Context, connector: Arc<dyn Connector>) -> CliResult<()> {
        self.output.reject_csv("send")?;
        let port = PortId::from_input(&self.port, &ctx.settings.port_prefix)?;
        let setpoint = Setpoint::parse(self.quantity, &self.value)?;
        let plain = self.output == OutputFormat::Plain && !ctx.quiet;

        if plain {
            output::print_exchange_header(&port, &setpoint);
        }

        let started_at = Utc::now();
        let start = Instant::now();
        let spinner = plain.then(|| waiting_spinner(&port));

        let exchange = {
            let port = port.clone();
            let setpoint = setpoint.clone();
            let settings = ctx.settings.exchange_settings();
            tokio::task::spawn_blocking(move || {
                send_and_confirm(connector.as_ref(), &port, &setpoint, &settings)
            })
        };

        // An abandoned exchange keeps running on its blocking thread until
        // the read timeout and releases the port there.
        let result = tokio::select! {
            joined = exchange => joined
                .map_err(|e| CliError::Other(format!("exchange task failed: {}", e)))?,
            _ = tokio::signal::ctrl_c() => {
                if let Some(spinner) = &spinner {
                    spinner.abandon_with_message("cancelled");
                }
                return Err(CliError::Cancelled);
            }
        };

        if let Some(spinner) = &spinner {
            spinner.finish_and_clear();
        }
        let elapsed = start.elapsed();

        if !self.simulate && !self.no_save && ctx.settings.save_history {
            self.record(ctx, started_at, elapsed, &port, &setpoint, &result);
        }

        let confirmation = result?;
        match self.output {
            OutputFormat::Json => output::print_json(&confirmation)?,
            _ if ctx.quiet => {}
            _ => {
                output::print_confirmation(&confirmation);
                output::print_exchange_footer(elapsed);
            }
        }

        Ok(())
    }

    /// Save the exchange to history. A storage failure is reported but
    /// does not change the outcome of the command.
    fn record(
        &self,
        ctx: &Context,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        port: &PortId,
        setpoint: &Setpoint,
        result: &ControlResult<Confirmation>,
    ) {
        let Some(record) =
            ExchangeRecord::from_result(started_at, elapsed.as_millis() as u64, port, setpoint, result)
        else {
            return;
        };

        let saved = ctx
            .history()
            .and_then(|store| match store {
                Some(store) => store.save(&record).map_err(Into::into),
                None => Ok(()),
            });

        if let Err(e) = saved {
            warn!(error = %e, "failed to record exchange");
            if !ctx.quiet {
                output::print_warning(&format!("exchange not saved to history: {}", e));
            }
        }
    }
}

fn waiting_spinner(port: &PortId) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Waiting for instrument on {}...", port));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppSettings;
    use crate::error::ControlError;
    use crate::instrument::SimBehavior;

    fn context() -> Context {
        Context {
            settings: AppSettings {
                port_prefix: "COM".to_string(),
                ..AppSettings::default()
            },
            paths: None,
            verbose: false,
            quiet: true,
        }
    }

    fn command(port: &str, quantity: Quantity, value: &str) -> SendCommand {
        SendCommand {
            port: port.to_string(),
            quantity,
            value: value.to_string(),
            simulate: true,
            no_save: true,
            output: OutputFormat::Plain,
        }
    }

    async fn run_against(sim: &SimulatedInstrument, cmd: &SendCommand) -> CliResult<()> {
        cmd.run(&context(), Arc::new(sim.clone())).await
    }

    #[tokio::test]
    async fn test_simulated_send_confirms() {
        let cmd = command("3", Quantity::Voltage, "12.5");
        assert!(cmd.execute(&context()).await.is_ok());
    }

    #[tokio::test]
    async fn test_confirmed_exchange_reaches_instrument() {
        let sim = SimulatedInstrument::echo("COM3");
        let cmd = command("3", Quantity::Voltage, "12.5");

        run_against(&sim, &cmd).await.unwrap();
        assert_eq!(sim.written(), b"VOLT 12.5\rVOLT?\r");
        assert_eq!(sim.open_links(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_rejected_with_exit_code_3() {
        let cmd = command("3", Quantity::Current, "0.010");
        let err = cmd.execute(&context()).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Control(ControlError::OutOfRange { .. })
        ));
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_out_of_range_never_touches_the_port() {
        for (quantity, value) in [(Quantity::Current, "0.010"), (Quantity::Voltage, "60.601")] {
            let sim = SimulatedInstrument::echo("COM3");
            let err = run_against(&sim, &command("3", quantity, value)).await.unwrap_err();

            assert!(matches!(
                err,
                CliError::Control(ControlError::OutOfRange { .. })
            ));
            assert_eq!(sim.opens(), 0, "{} {} opened the port", quantity, value);
            assert!(sim.written().is_empty(), "{} {} wrote bytes", quantity, value);
        }
    }

    #[tokio::test]
    async fn test_unconfirmed_exit_code_2() {
        let sim = SimulatedInstrument::new(["COM3"], SimBehavior::Reply("29.999".to_string()));
        let err = run_against(&sim, &command("3", Quantity::Voltage, "30.000"))
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_port_exit_code_1() {
        let sim = SimulatedInstrument::echo("COM3");
        let err = run_against(&sim, &command("99", Quantity::Voltage, "12.5"))
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(sim.written().is_empty());
    }

    #[tokio::test]
    async fn test_csv_output_rejected_before_io() {
        let sim = SimulatedInstrument::echo("COM3");
        let mut cmd = command("3", Quantity::Voltage, "12.5");
        cmd.output = OutputFormat::Csv;

        assert!(matches!(
            run_against(&sim, &cmd).await,
            Err(CliError::Other(_))
        ));
        assert_eq!(sim.opens(), 0);
    }

    #[tokio::test]
    async fn test_missing_port_value_is_malformed() {
        let cmd = command("", Quantity::Voltage, "1");
        let err = cmd.execute(&context()).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Control(ControlError::MalformedInput(_))
        ));
    }
}
