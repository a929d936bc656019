//! Serial port backend.

use super::{Connector, Link};
use crate::types::PortId;
use serialport::{DataBits, FlowControl, Parity, StopBits};
use std::io;
use std::time::Duration;

/// Opens real serial ports, 8N1 without flow control.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialConnector;

impl Connector for SerialConnector {
    fn open(&self, port: &PortId, baud_rate: u32, timeout: Duration) -> io::Result<Box<dyn Link>> {
        let serial = serialport::new(port.as_str(), baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()?;

        Ok(Box::new(serial))
    }
}
