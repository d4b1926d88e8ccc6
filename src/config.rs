//! Endpoint configuration: role, transport identifier, line rate, and
//! retry/timeout policy.

use std::convert::TryFrom;
use std::time::Duration;

/// The two roles a link-layer endpoint can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Transmitter,
    Receiver,
}

/// The serial bit rates the byte transport is required to support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaudRate {
    B1200,
    B1800,
    B2400,
    B4800,
    B9600,
    B19200,
    B38400,
    B57600,
    B115200,
}

impl BaudRate {
    pub fn as_u32(self) -> u32 {
        match self {
            BaudRate::B1200 => 1200,
            BaudRate::B1800 => 1800,
            BaudRate::B2400 => 2400,
            BaudRate::B4800 => 4800,
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115200,
        }
    }
}

/// Error returned when a requested baud rate is not one of the supported
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedBaudRate(pub u32);

impl TryFrom<u32> for BaudRate {
    type Error = UnsupportedBaudRate;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1200 => Ok(BaudRate::B1200),
            1800 => Ok(BaudRate::B1800),
            2400 => Ok(BaudRate::B2400),
            4800 => Ok(BaudRate::B4800),
            9600 => Ok(BaudRate::B9600),
            19200 => Ok(BaudRate::B19200),
            38400 => Ok(BaudRate::B38400),
            57600 => Ok(BaudRate::B57600),
            115200 => Ok(BaudRate::B115200),
            other => Err(UnsupportedBaudRate(other)),
        }
    }
}

/// Largest unstuffed I-frame payload the link layer will build or accept.
pub const MAX_PAYLOAD: usize = 255;

/// Immutable per-endpoint configuration.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub role: Role,
    /// Identifier passed to the byte transport (e.g. a serial device path).
    pub port: String,
    pub baud_rate: BaudRate,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Maximum number of transmission attempts per frame.
    pub max_attempts: u8,
}

impl LinkConfig {
    pub fn new(
        role: Role,
        port: impl Into<String>,
        baud_rate: BaudRate,
        timeout: Duration,
        max_attempts: u8,
    ) -> Self {
        LinkConfig {
            role,
            port: port.into(),
            baud_rate,
            timeout,
            max_attempts,
        }
    }
}
