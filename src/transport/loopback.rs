//! An in-memory transport pair that models a full-duplex serial cable,
//! used by the test suite in place of real hardware. Supports one-shot
//! fault injection (drop the next write outright, or flip a bit in it) so
//! ACK-loss and corruption scenarios can be reproduced deterministically.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use super::ByteTransport;
use crate::error::{Error, Result};

#[derive(Clone)]
struct Faults {
    drop_next: Arc<AtomicBool>,
    corrupt_next: Arc<AtomicBool>,
}

impl Faults {
    fn new() -> Self {
        Faults {
            drop_next: Arc::new(AtomicBool::new(false)),
            corrupt_next: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// A handle a test can use to arm one-shot fault injection on an endpoint's
/// outgoing direction, independent of the [`LoopbackTransport`] itself
/// (which is usually moved into a `LinkLayer`).
#[derive(Clone)]
pub struct FaultControl {
    faults: Faults,
}

impl FaultControl {
    /// The next call to `write_bytes` on the associated transport vanishes
    /// entirely — as if the frame were lost on the wire.
    pub fn drop_next_write(&self) {
        self.faults.drop_next.store(true, Ordering::SeqCst);
    }

    /// The next call to `write_bytes` on the associated transport has one
    /// bit flipped roughly in the middle of the buffer, corrupting whatever
    /// frame is in flight.
    pub fn corrupt_next_write(&self) {
        self.faults.corrupt_next.store(true, Ordering::SeqCst);
    }
}

/// One endpoint of an in-memory loopback pair.
pub struct LoopbackTransport {
    outbound: Arc<Mutex<VecDeque<u8>>>,
    inbound: Arc<Mutex<VecDeque<u8>>>,
    faults: Faults,
    open: bool,
}

/// Builds two connected endpoints: bytes written to one appear, byte for
/// byte, as reads on the other.
pub fn pair() -> (LoopbackTransport, LoopbackTransport) {
    let a_to_b = Arc::new(Mutex::new(VecDeque::new()));
    let b_to_a = Arc::new(Mutex::new(VecDeque::new()));
    let a = LoopbackTransport {
        outbound: a_to_b.clone(),
        inbound: b_to_a.clone(),
        faults: Faults::new(),
        open: false,
    };
    let b = LoopbackTransport {
        outbound: b_to_a,
        inbound: a_to_b,
        faults: Faults::new(),
        open: false,
    };
    (a, b)
}

impl LoopbackTransport {
    /// Returns a cloneable handle for injecting faults on this endpoint's
    /// outgoing direction, independent of ownership of `self`.
    pub fn fault_control(&self) -> FaultControl {
        FaultControl {
            faults: self.faults.clone(),
        }
    }
}

impl ByteTransport for LoopbackTransport {
    fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    fn read_byte(&mut self, deadline: Instant) -> Result<Option<u8>> {
        loop {
            if let Some(byte) = self.inbound.lock().unwrap().pop_front() {
                return Ok(Some(byte));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            thread::sleep(Duration::from_micros(200));
        }
    }

    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize> {
        if !self.open {
            return Err(Error::Transport("write on closed loopback transport".into()));
        }
        if self.faults.drop_next.swap(false, Ordering::SeqCst) {
            return Ok(buf.len());
        }
        let mut data = buf.to_vec();
        if self.faults.corrupt_next.swap(false, Ordering::SeqCst) && data.len() > 4 {
            let idx = data.len() / 2;
            data[idx] ^= 0x01;
        }
        self.outbound.lock().unwrap().extend(data);
        Ok(buf.len())
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }
}
