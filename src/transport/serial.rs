//! A real serial-port backed [`ByteTransport`], built on the `serialport`
//! crate. Gated behind the `serial-port` feature so the core protocol
//! stack, and its tests, never need a TTY to build or run.

use std::time::{Duration, Instant};

use super::ByteTransport;
use crate::config::BaudRate;
use crate::error::{Error, Result};

/// 8 data bits, no parity, 1 stop bit, no flow control — the only line
/// discipline this link runs over.
pub struct SerialPortTransport {
    port_name: String,
    baud_rate: u32,
    port: Option<Box<dyn serialport::SerialPort>>,
}

impl SerialPortTransport {
    pub fn new(port_name: impl Into<String>, baud_rate: BaudRate) -> Self {
        SerialPortTransport {
            port_name: port_name.into(),
            baud_rate: baud_rate.as_u32(),
            port: None,
        }
    }
}

impl ByteTransport for SerialPortTransport {
    fn open(&mut self) -> Result<()> {
        let port = serialport::new(&self.port_name, self.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(100))
            .open()
            .map_err(|e| Error::TransportOpen(e.to_string()))?;
        log::debug!("opened {} at {} baud", self.port_name, self.baud_rate);
        self.port = Some(port);
        Ok(())
    }

    fn read_byte(&mut self, deadline: Instant) -> Result<Option<u8>> {
        let port = self
            .port
            .as_mut()
            .ok_or_else(|| Error::Transport("serial port not open".into()))?;
        let mut byte = [0u8; 1];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            let slice = remaining.min(Duration::from_millis(100));
            port.set_timeout(slice)
                .map_err(|e| Error::Transport(e.to_string()))?;
            match port.read(&mut byte) {
                Ok(0) => continue,
                Ok(_) => return Ok(Some(byte[0])),
                Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                Err(e) => return Err(Error::Transport(e.to_string())),
            }
        }
    }

    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize> {
        use std::io::Write;
        let port = self
            .port
            .as_mut()
            .ok_or_else(|| Error::Transport("serial port not open".into()))?;
        port.write_all(buf)
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(buf.len())
    }

    fn close(&mut self) -> Result<()> {
        self.port = None;
        Ok(())
    }
}
