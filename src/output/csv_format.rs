//! CSV output formatting.

use crate::ports::PortDescriptor;
use crate::storage::ExchangeRecord;
use std::io::Write;

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map_or(String::new(), |v| v.to_string())
}

/// Write the port list as CSV.
pub fn write_ports_csv<W: Write>(out: W, ports: &[PortDescriptor]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record([
        "device",
        "description",
        "hwid",
        "vid",
        "pid",
        "serial_number",
        "location",
        "manufacturer",
        "product",
    ])?;

    for port in ports {
        wtr.write_record([
            port.device.clone(),
            port.description.clone(),
            port.hwid.clone(),
            port.vid.map_or(String::new(), |v| format!("{:04X}", v)),
            port.pid.map_or(String::new(), |p| format!("{:04X}", p)),
            opt(&port.serial_number),
            opt(&port.location),
            opt(&port.manufacturer),
            opt(&port.product),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write exchange history as CSV.
pub fn write_history_csv<W: Write>(out: W, records: &[ExchangeRecord]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record([
        "id",
        "started_at",
        "duration_ms",
        "port",
        "quantity",
        "commanded",
        "outcome",
        "observed",
    ])?;

    for record in records {
        wtr.write_record([
            record.id.to_string(),
            record.started_at.to_rfc3339(),
            record.duration_ms.to_string(),
            record.port.to_string(),
            record.quantity.mnemonic().to_string(),
            record.commanded.clone(),
            record.outcome.to_string(),
            opt(&record.observed),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
