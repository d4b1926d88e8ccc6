//! Error taxonomy for the link and application layers.
//!
//! Only terminal conditions are represented here. Transient conditions that
//! the link layer resolves on the wire (malformed frames, duplicate
//! I-frames) never reach this type — see `receiver::FrameError`.

use thiserror::Error;

/// Errors surfaced to callers of [`crate::link::LinkLayer`] and the transfer
/// driver.
#[derive(Debug, Error)]
pub enum Error {
    /// The byte transport could not be opened.
    #[error("failed to open byte transport: {0}")]
    TransportOpen(String),

    /// The byte transport failed during a read or write.
    #[error("byte transport error: {0}")]
    Transport(String),

    /// `write` exhausted its retransmission budget without an acknowledgment.
    #[error("link timeout: no acknowledgment after all retransmissions")]
    LinkTimeout,

    /// The connect handshake (`SET`/`UA`) exhausted its retries.
    #[error("connect timeout: peer did not respond to SET")]
    ConnectTimeout,

    /// The disconnect handshake exhausted its retries.
    #[error("close timeout: peer did not complete the disconnect handshake")]
    CloseTimeout,

    /// `write` was called with an invalid payload length.
    #[error("invalid argument: payload length {0} is out of range (1..={1})")]
    ArgInvalid(usize, u16),

    /// START and END metadata disagreed, or an unexpected packet arrived out
    /// of order.
    #[error("transfer integrity error: {0}")]
    TransferIntegrity(String),

    /// Local filesystem I/O failed (opening the input/output file).
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
