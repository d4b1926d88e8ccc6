//! The byte transport: an opaque, full-duplex byte stream with a blocking,
//! deadline-bounded single-byte read and a bulk write. The link layer is the
//! only component that ever touches a [`ByteTransport`].

pub mod loopback;
#[cfg(feature = "serial-port")]
pub mod serial;

use std::time::Instant;

use crate::error::Result;

/// A full-duplex byte stream. Implementations never buffer or re-frame —
/// framing is the link layer's job.
pub trait ByteTransport {
    /// Opens the underlying channel (e.g. configures and opens a serial
    /// port). Idempotent on an already-open transport is not required.
    fn open(&mut self) -> Result<()>;

    /// Blocks until one byte is available or `deadline` passes, whichever
    /// comes first. Returns `Ok(None)` on a timeout, never an error for that
    /// case — timeouts are expected control flow, not failures.
    fn read_byte(&mut self, deadline: Instant) -> Result<Option<u8>>;

    /// Writes all of `buf`. A short write is a transport error.
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize>;

    /// Restores prior settings (if any) and releases the channel.
    fn close(&mut self) -> Result<()>;
}
