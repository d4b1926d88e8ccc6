//! # filelink
//!
//! A point-to-point, error-controlled file transfer protocol over an
//! asynchronous serial link. A Stop-and-Wait ARQ data link layer (framing,
//! byte stuffing, checksums, connect/disconnect handshakes) carries a thin
//! application layer that drives a one-shot Start/Data/End file transfer
//! between a Transmitter and a Receiver.
//!
//! ## Layout
//!
//! - [`transport`] — the `ByteTransport` trait and its implementations
//!   (a real serial port, and an in-memory loopback pair for tests).
//! - [`framing`] — byte stuffing/destuffing and the block check functions.
//! - [`frame`] — the control-field vocabulary and frame builders.
//! - [`receiver`] — the byte-at-a-time receive automaton.
//! - [`link`] — `LinkLayer`: open/write/read/close.
//! - [`packet`] — the TLV-based application packets (Start/Data/End).
//! - [`transfer`] — `send_file`/`receive_file`, the transfer driver.
//! - [`config`] — endpoint configuration (`LinkConfig`, `BaudRate`, `Role`).
//! - [`error`] — the crate's `Error` enum and `Result` alias.

pub mod config;
pub mod error;
pub mod frame;
pub mod framing;
pub mod link;
pub mod packet;
pub mod receiver;
pub mod transfer;
pub mod transport;

pub use config::{BaudRate, LinkConfig, Role};
pub use error::{Error, Result};
pub use link::LinkLayer;
pub use transport::ByteTransport;
