//! Serial port enumeration.

use serde::Serialize;
use serialport::{SerialPortInfo, SerialPortType};
use tracing::warn;

/// Metadata about one serial port on this machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortDescriptor {
    /// Device path or name used to open the port.
    pub device: String,
    /// Human-readable description.
    pub description: String,
    /// Hardware identification string.
    pub hwid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vid: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// Physical location; not reported by every platform.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

impl From<SerialPortInfo> for PortDescriptor {
    fn from(info: SerialPortInfo) -> Self {
        let device = info.port_name;

        match info.port_type {
            SerialPortType::UsbPort(usb) => {
                let mut hwid = format!("USB VID:PID={:04X}:{:04X}", usb.vid, usb.pid);
                if let Some(ref serial) = usb.serial_number {
                    hwid.push_str(&format!(" SER={}", serial));
                }

                Self {
                    description: usb.product.clone().unwrap_or_else(|| "n/a".to_string()),
                    hwid,
                    vid: Some(usb.vid),
                    pid: Some(usb.pid),
                    serial_number: usb.serial_number,
                    location: None,
                    manufacturer: usb.manufacturer,
                    product: usb.product,
                    device,
                }
            }
            other => {
                let description = match other {
                    SerialPortType::PciPort => "PCI serial port",
                    SerialPortType::BluetoothPort => "Bluetooth serial port",
                    _ => "n/a",
                };

                Self {
                    device,
                    description: description.to_string(),
                    hwid: "n/a".to_string(),
                    vid: None,
                    pid: None,
                    serial_number: None,
                    location: None,
                    manufacturer: None,
                    product: None,
                }
            }
        }
    }
}

/// List the serial ports present right now, sorted by device name.
///
/// Never fails: if the OS cannot be queried the list is empty.
pub fn list_ports() -> Vec<PortDescriptor> {
    match serialport::available_ports() {
        Ok(ports) => describe_all(ports),
        Err(e) => {
            warn!(error = %e, "serial port enumeration failed");
            Vec::new()
        }
    }
}

fn describe_all(ports: Vec<SerialPortInfo>) -> Vec<PortDescriptor> {
    let mut descriptors: Vec<PortDescriptor> = ports.into_iter().map(PortDescriptor::from).collect();
    descriptors.sort_by(|a, b| a.device.cmp(&b.device));
    descriptors.dedup_by(|a, b| a.device == b.device);
    descriptors
}
