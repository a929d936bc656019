//! Wire format of the instrument.
//!
//! Commands are ASCII terminated by a carriage return. Queries are answered
//! with a single decimal number on a newline-terminated line.

use crate::error::{ControlError, ControlResult};
use crate::types::{PortId, Quantity, Setpoint};
use std::io::{self, Read};
use std::time::{Duration, Instant};

/// Command terminator expected by the instrument.
pub const TERMINATOR: char = '\r';

/// Upper bound on a response line; a reading is a handful of characters.
const MAX_RESPONSE_LEN: usize = 256;

/// `VOLT 12.5\r` / `CURR 1.000\r`
pub fn set_command(setpoint: &Setpoint) -> String {
    format!(
        "{} {}{}",
        setpoint.quantity().mnemonic(),
        setpoint.text(),
        TERMINATOR
    )
}

/// `VOLT?\r` / `CURR?\r`
pub fn query_command(quantity: Quantity) -> String {
    format!("{}?{}", quantity.mnemonic(), TERMINATOR)
}

/// Parse a response line into a reading.
pub fn parse_reading(line: &str) -> Option<f64> {
    line.trim().parse().ok()
}

/// Read one newline-terminated line from `link`.
///
/// `timeout` bounds the whole line, not each read, matching a serial
/// `readline`. Bytes received before it elapses count as the line.
/// Nothing at all is `NoResponse`.
pub fn read_line<R: Read + ?Sized>(
    link: &mut R,
    port: &PortId,
    timeout: Duration,
) -> ControlResult<String> {
    let deadline = Instant::now() + timeout;
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];

    while buf.len() < MAX_RESPONSE_LEN {
        match link.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {
                buf.push(byte[0]);
                if byte[0] == b'\n' {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
            Err(e) => {
                return Err(ControlError::ReadFailed {
                    port: port.to_string(),
                    reason: e.to_string(),
                })
            }
        }

        if Instant::now() >= deadline {
            break;
        }
    }

    if buf.is_empty() {
        return Err(ControlError::NoResponse {
            port: port.to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::thread;

    const WAIT: Duration = Duration::from_secs(3);

    /// Hands out one byte per read, pausing before each.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        delay: Duration,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            thread::sleep(self.delay);
            match self.data.get(self.pos) {
                Some(&b) => {
                    buf[0] = b;
                    self.pos += 1;
                    Ok(1)
                }
                None => Err(io::Error::new(io::ErrorKind::TimedOut, "timed out")),
            }
        }
    }

    #[test]
    fn test_set_command_uses_operator_text() {
        let sp = Setpoint::parse(Quantity::Voltage, "30.000").unwrap();
        assert_eq!(set_command(&sp), "VOLT 30.000\r");

        let sp = Setpoint::parse(Quantity::Current, "1.5").unwrap();
        assert_eq!(set_command(&sp), "CURR 1.5\r");
    }

    #[test]
    fn test_query_command() {
        assert_eq!(query_command(Quantity::Voltage), "VOLT?\r");
        assert_eq!(query_command(Quantity::Current), "CURR?\r");
    }

    #[test]
    fn test_parse_reading() {
        assert_eq!(parse_reading("12.5\n"), Some(12.5));
        assert_eq!(parse_reading(" 29.999\r\n"), Some(29.999));
        assert_eq!(parse_reading("ERR"), None);
        assert_eq!(parse_reading(""), None);
    }

    #[test]
    fn test_read_line_stops_at_newline() {
        let port = PortId::new("COM1");
        let mut link = Cursor::new(b"12.5\nleftover\n".to_vec());
        assert_eq!(read_line(&mut link, &port, WAIT).unwrap(), "12.5\n");
    }

    #[test]
    fn test_read_line_partial_without_newline() {
        let port = PortId::new("COM1");
        let mut link = Cursor::new(b"4.04".to_vec());
        assert_eq!(read_line(&mut link, &port, WAIT).unwrap(), "4.04");
    }

    #[test]
    fn test_read_line_nothing_is_no_response() {
        let port = PortId::new("COM1");
        let mut link = Cursor::new(Vec::new());
        assert!(matches!(
            read_line(&mut link, &port, WAIT),
            Err(ControlError::NoResponse { .. })
        ));
    }

    #[test]
    fn test_read_line_leaves_rest_unread() {
        let port = PortId::new("COM1");
        let mut link = Cursor::new(b"12.5\n4.04\n".to_vec());
        read_line(&mut link, &port, WAIT).unwrap();
        assert_eq!(read_line(&mut link, &port, WAIT).unwrap(), "4.04\n");
    }

    #[test]
    fn test_slow_line_is_cut_at_deadline() {
        let port = PortId::new("COM1");
        let mut link = Trickle {
            data: b"12.345\n".to_vec(),
            pos: 0,
            delay: Duration::from_millis(20),
        };

        let line = read_line(&mut link, &port, Duration::from_millis(50)).unwrap();
        assert!(!line.is_empty());
        assert!(line.len() < 7, "read past the deadline: {:?}", line);
    }

    #[test]
    fn test_bounded_response_length() {
        let port = PortId::new("COM1");
        let mut link = Cursor::new(vec![b'9'; 1000]);
        assert_eq!(read_line(&mut link, &port, WAIT).unwrap().len(), MAX_RESPONSE_LEN);
    }
}
