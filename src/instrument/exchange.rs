//! The set-then-query confirmation exchange.

use super::protocol::{parse_reading, query_command, read_line, set_command};
use super::{Connector, ExchangeSettings, Link};
use crate::error::{ControlError, ControlResult};
use crate::types::{PortId, Setpoint};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, info_span, warn};

/// A set point the instrument reported back as applied.
#[derive(Debug, Clone, Serialize)]
pub struct Confirmation {
    pub port: PortId,
    pub setpoint: Setpoint,
    pub observed: f64,
    pub elapsed_ms: u64,
}

/// Set a value on the instrument and confirm it with a query.
///
/// Single attempt, blocking for at most the read timeout. The port is
/// probed first so that an unreachable port is reported before any byte
/// is written, then reopened for the exchange. Every link is dropped on
/// every return path.
pub fn send_and_confirm<C: Connector + ?Sized>(
    connector: &C,
    port: &PortId,
    setpoint: &Setpoint,
    settings: &ExchangeSettings,
) -> ControlResult<Confirmation> {
    let _span = info_span!("exchange", port = %port, quantity = %setpoint.quantity()).entered();
    let start = Instant::now();

    let unavailable = |e: std::io::Error| {
        warn!(error = %e, "port unavailable");
        ControlError::PortUnavailable {
            port: port.to_string(),
            reason: e.to_string(),
        }
    };

    drop(
        connector
            .open(port, settings.baud_rate, settings.probe_timeout)
            .map_err(unavailable)?,
    );

    let mut link = connector
        .open(port, settings.baud_rate, settings.read_timeout)
        .map_err(unavailable)?;

    write_command(link.as_mut(), port, &set_command(setpoint))?;
    write_command(link.as_mut(), port, &query_command(setpoint.quantity()))?;

    let response = read_line(link.as_mut(), port, settings.read_timeout)?;
    drop(link);
    debug!(response = %response.trim_end(), "received");

    let observed = parse_reading(&response).ok_or_else(|| ControlError::InvalidResponse {
        port: port.to_string(),
        response: response.clone(),
    })?;

    let commanded = setpoint.value();
    if !settings.confirm.accepts(commanded, observed) {
        warn!(commanded, observed, "set value not confirmed");
        return Err(ControlError::Unconfirmed {
            quantity: setpoint.quantity(),
            commanded,
            observed,
        });
    }

    let elapsed_ms = start.elapsed().as_millis() as u64;
    info!(value = %setpoint.text(), elapsed_ms, "set value confirmed");

    Ok(Confirmation {
        port: port.clone(),
        setpoint: setpoint.clone(),
        observed,
        elapsed_ms,
    })
}

fn write_command(link: &mut dyn Link, port: &PortId, command: &str) -> ControlResult<()> {
    debug!(command = %command.trim_end(), "sending");
    link.write_all(command.as_bytes())
        .and_then(|_| link.flush())
        .map_err(|e| ControlError::WriteFailed {
            port: port.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::{ConfirmPolicy, SimBehavior, SimulatedInstrument};
    use crate::types::Quantity;

    fn setpoint(quantity: Quantity, text: &str) -> Setpoint {
        Setpoint::parse(quantity, text).unwrap()
    }

    fn send(sim: &SimulatedInstrument, port: &str, sp: &Setpoint) -> ControlResult<Confirmation> {
        send_and_confirm(sim, &PortId::new(port), sp, &ExchangeSettings::default())
    }

    #[test]
    fn test_echoed_voltage_is_confirmed() {
        let sim = SimulatedInstrument::echo("COM3");
        let sp = setpoint(Quantity::Voltage, "12.5");

        let confirmation = send(&sim, "COM3", &sp).unwrap();
        assert_eq!(confirmation.observed, 12.5);
        assert_eq!(sim.written(), b"VOLT 12.5\rVOLT?\r");
        assert_eq!(sim.open_links(), 0);
    }

    #[test]
    fn test_echo_confirms_across_voltage_range() {
        for text in ["0", "0.001", "0.015", "1.1", "12.345", "30.000", "59.999", "60.600"] {
            let sim = SimulatedInstrument::echo("COM3");
            let sp = setpoint(Quantity::Voltage, text);
            assert!(send(&sim, "COM3", &sp).is_ok(), "{} not confirmed", text);
        }
    }

    #[test]
    fn test_echo_confirms_current() {
        let sim = SimulatedInstrument::echo("COM3");
        let sp = setpoint(Quantity::Current, "0.015");
        assert!(send(&sim, "COM3", &sp).is_ok());
        assert_eq!(sim.setting("CURR").as_deref(), Some("0.015"));
    }

    #[test]
    fn test_different_reading_is_unconfirmed() {
        let sim = SimulatedInstrument::new(["COM3"], SimBehavior::Reply("29.999".to_string()));
        let sp = setpoint(Quantity::Voltage, "30.000");

        let err = send(&sim, "COM3", &sp).unwrap_err();
        assert_eq!(
            err,
            ControlError::Unconfirmed {
                quantity: Quantity::Voltage,
                commanded: 30.0,
                observed: 29.999,
            }
        );
        assert_eq!(sim.open_links(), 0);
    }

    #[test]
    fn test_reformatted_reading_still_confirms() {
        let sim = SimulatedInstrument::new(["COM3"], SimBehavior::Reply("30.000".to_string()));
        let sp = setpoint(Quantity::Voltage, "30");
        assert!(send(&sim, "COM3", &sp).is_ok());
    }

    #[test]
    fn test_missing_port_writes_nothing() {
        let sim = SimulatedInstrument::echo("COM3");
        let sp = setpoint(Quantity::Voltage, "12.5");

        let err = send(&sim, "COM99", &sp).unwrap_err();
        assert!(matches!(
            err,
            ControlError::PortUnavailable { ref port, .. } if port == "COM99"
        ));
        assert!(sim.written().is_empty());
        assert_eq!(sim.opens(), 0);
        assert_eq!(sim.open_links(), 0);
    }

    #[test]
    fn test_silent_instrument_is_no_response() {
        let sim = SimulatedInstrument::new(["COM3"], SimBehavior::Silent);
        let sp = setpoint(Quantity::Current, "1.000");

        let err = send(&sim, "COM3", &sp).unwrap_err();
        assert!(matches!(err, ControlError::NoResponse { .. }));
        assert_eq!(sim.open_links(), 0);
    }

    #[test]
    fn test_garbage_reading_is_invalid_response() {
        let sim = SimulatedInstrument::new(["COM3"], SimBehavior::Reply("ERR -100".to_string()));
        let sp = setpoint(Quantity::Current, "1.000");

        let err = send(&sim, "COM3", &sp).unwrap_err();
        assert!(matches!(err, ControlError::InvalidResponse { .. }));
    }

    #[test]
    fn test_tolerance_policy_accepts_close_reading() {
        let sim = SimulatedInstrument::new(["COM3"], SimBehavior::Reply("29.9995".to_string()));
        let sp = setpoint(Quantity::Voltage, "30.000");
        let settings = ExchangeSettings {
            confirm: ConfirmPolicy::Tolerance(0.001),
            ..ExchangeSettings::default()
        };

        assert!(send_and_confirm(&sim, &PortId::new("COM3"), &sp, &settings).is_ok());
    }

    #[test]
    fn test_probe_and_exchange_both_open() {
        let sim = SimulatedInstrument::echo("COM3");
        let sp = setpoint(Quantity::Voltage, "5");
        send(&sim, "COM3", &sp).unwrap();
        assert_eq!(sim.opens(), 2);
    }
}
