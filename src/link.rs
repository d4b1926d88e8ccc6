//! The link layer: connect/disconnect handshakes and the
//! Stop-and-Wait `write`/`read` contract, built over any [`ByteTransport`].

use std::time::{Duration, Instant};

use crate::config::{LinkConfig, Role, MAX_PAYLOAD};
use crate::error::{Error, Result};
use crate::frame::{build_i_frame, build_supervisory, Control, Seq, ADDR_RX, ADDR_TX};
use crate::receiver::{Event, FrameKind, Receiver};
use crate::transport::ByteTransport;

/// One endpoint of the link. Owns the transport, the current sequence
/// bits, and whether the connection handshake has completed.
pub struct LinkLayer<T: ByteTransport> {
    transport: T,
    config: LinkConfig,
    ns: Seq,
    nr: Seq,
    connected: bool,
}

/// Address this endpoint stamps on frames it sends, derived from its role.
fn local_addr(role: Role) -> u8 {
    match role {
        Role::Transmitter => ADDR_TX,
        Role::Receiver => ADDR_RX,
    }
}

/// Address the peer stamps on frames it sends — the complement of `local_addr`.
fn peer_addr(role: Role) -> u8 {
    match role {
        Role::Transmitter => ADDR_RX,
        Role::Receiver => ADDR_TX,
    }
}

impl<T: ByteTransport> LinkLayer<T> {
    pub fn new(transport: T, config: LinkConfig) -> Self {
        LinkLayer {
            transport,
            config,
            ns: Seq::Zero,
            nr: Seq::Zero,
            connected: false,
        }
    }

    fn deadline(&self) -> Instant {
        Instant::now() + self.config.timeout
    }

    /// Reads bytes into `receiver` until it produces a non-`Pending` event
    /// or `deadline` passes.
    fn wait_for(&mut self, receiver: &mut Receiver, deadline: Instant) -> Result<Event> {
        loop {
            match self.transport.read_byte(deadline)? {
                Some(byte) => match receiver.push(byte) {
                    Event::Pending => continue,
                    other => return Ok(other),
                },
                None => return Ok(Event::Pending),
            }
        }
    }

    /// Performs the connect handshake. Transmitter sends SET and
    /// retries up to `max_attempts` times awaiting UA; Receiver waits for
    /// SET (across the same overall budget) and answers with a single UA.
    pub fn open(&mut self) -> Result<()> {
        self.transport.open()?;
        match self.config.role {
            Role::Transmitter => {
                let frame = build_supervisory(ADDR_TX, Control::Set);
                for attempt in 1..=self.config.max_attempts {
                    log::debug!("connect: sending SET (attempt {})", attempt);
                    self.transport.write_bytes(&frame)?;
                    let mut rx = Receiver::new(peer_addr(self.config.role), FrameKind::Supervisory, 0);
                    let deadline = self.deadline();
                    match self.wait_for(&mut rx, deadline)? {
                        Event::Supervisory(Control::Ua) => {
                            log::debug!("connect: received UA");
                            self.connected = true;
                            return Ok(());
                        }
                        _ => continue,
                    }
                }
                Err(Error::ConnectTimeout)
            }
            Role::Receiver => {
                let overall_deadline =
                    Instant::now() + self.config.timeout * self.config.max_attempts as u32;
                let mut rx = Receiver::new(peer_addr(self.config.role), FrameKind::Supervisory, 0);
                loop {
                    if Instant::now() >= overall_deadline {
                        return Err(Error::ConnectTimeout);
                    }
                    match self.wait_for(&mut rx, overall_deadline)? {
                        Event::Supervisory(Control::Set) => {
                            log::debug!("connect: received SET, sending UA");
                            let frame = build_supervisory(ADDR_RX, Control::Ua);
                            self.transport.write_bytes(&frame)?;
                            self.connected = true;
                            return Ok(());
                        }
                        Event::Pending => return Err(Error::ConnectTimeout),
                        _ => continue,
                    }
                }
            }
        }
    }

    /// Sends one I-frame and waits for it to be acknowledged, retransmitting
    /// on timeout or on a mismatched/rejected response.
    pub fn write(&mut self, payload: &[u8]) -> Result<()> {
        if payload.is_empty() || payload.len() > MAX_PAYLOAD {
            return Err(Error::ArgInvalid(payload.len(), MAX_PAYLOAD as u16));
        }
        let local = local_addr(self.config.role);
        let peer = peer_addr(self.config.role);
        let frame = build_i_frame(local, self.ns, payload);

        for attempt in 1..=self.config.max_attempts {
            log::trace!("write: sending I({:?}) attempt {}", self.ns, attempt);
            self.transport.write_bytes(&frame)?;
            let mut rx = Receiver::new(peer, FrameKind::Supervisory, 0);
            let deadline = self.deadline();
            loop {
                match self.wait_for(&mut rx, deadline)? {
                    Event::Supervisory(Control::Rr(seq)) => {
                        if seq == self.ns.flipped() {
                            self.ns = self.ns.flipped();
                            return Ok(());
                        }
                        // Stale RR (e.g. an RR for the previous frame
                        // arriving late); keep waiting within this deadline.
                        continue;
                    }
                    Event::Supervisory(Control::Rej(seq)) => {
                        if seq == self.ns {
                            log::debug!("write: peer rejected I({:?}), retransmitting now", self.ns);
                            break;
                        }
                        continue;
                    }
                    Event::Pending => break,
                    _ => continue,
                }
            }
        }
        Err(Error::LinkTimeout)
    }

    /// Blocks until the next in-order I-frame arrives, answering duplicates
    /// with a repeated RR without delivering them.
    pub fn read(&mut self) -> Result<Vec<u8>> {
        let local = local_addr(self.config.role);
        let peer = peer_addr(self.config.role);
        let mut rx = Receiver::new(peer, FrameKind::IFrame, MAX_PAYLOAD);
        loop {
            let byte = match self.transport.read_byte(self.far_future())? {
                Some(b) => b,
                None => continue,
            };
            match rx.push(byte) {
                Event::Pending => continue,
                Event::FrameError => {
                    log::warn!("read: discarding malformed frame");
                    let frame = build_supervisory(local, Control::Rej(self.nr));
                    self.transport.write_bytes(&frame)?;
                    continue;
                }
                Event::IFrame { seq, payload } => {
                    if seq != self.nr {
                        log::debug!("read: duplicate I({:?}) received, re-acking", seq);
                        let ack = build_supervisory(local, Control::Rr(self.nr));
                        self.transport.write_bytes(&ack)?;
                        continue;
                    }
                    let ack = build_supervisory(local, Control::Rr(self.nr.flipped()));
                    self.transport.write_bytes(&ack)?;
                    self.nr = self.nr.flipped();
                    return Ok(payload);
                }
                Event::Supervisory(_) => continue,
            }
        }
    }

    /// A deadline far enough in the future to model "no timeout" for `read`,
    /// which blocks indefinitely for the next frame.
    fn far_future(&self) -> Instant {
        Instant::now() + Duration::from_secs(60 * 60 * 24 * 365)
    }

    /// Performs the three-way disconnect handshake and releases the
    /// transport unconditionally, even on timeout.
    pub fn close(&mut self) -> Result<()> {
        let result = match self.config.role {
            Role::Transmitter => self.close_as_transmitter(),
            Role::Receiver => self.close_as_receiver(),
        };
        self.connected = false;
        let close_err = self.transport.close();
        result.and(close_err)
    }

    fn close_as_transmitter(&mut self) -> Result<()> {
        let disc = build_supervisory(ADDR_TX, Control::Disc);
        for attempt in 1..=self.config.max_attempts {
            log::debug!("disconnect: sending DISC (attempt {})", attempt);
            self.transport.write_bytes(&disc)?;
            let mut rx = Receiver::new(ADDR_RX, FrameKind::Supervisory, 0);
            let deadline = self.deadline();
            if let Event::Supervisory(Control::Disc) = self.wait_for(&mut rx, deadline)? {
                let ua = build_supervisory(ADDR_TX, Control::Ua);
                self.transport.write_bytes(&ua)?;
                return Ok(());
            }
        }
        Err(Error::CloseTimeout)
    }

    fn close_as_receiver(&mut self) -> Result<()> {
        let mut rx = Receiver::new(ADDR_TX, FrameKind::Supervisory, 0);
        let overall_deadline =
            Instant::now() + self.config.timeout * self.config.max_attempts as u32;
        loop {
            if Instant::now() >= overall_deadline {
                return Err(Error::CloseTimeout);
            }
            match self.wait_for(&mut rx, overall_deadline)? {
                Event::Supervisory(Control::Disc) => break,
                Event::Pending => return Err(Error::CloseTimeout),
                _ => continue,
            }
        }
        let disc = build_supervisory(ADDR_RX, Control::Disc);
        for attempt in 1..=self.config.max_attempts {
            log::debug!("disconnect: sending DISC reply (attempt {})", attempt);
            self.transport.write_bytes(&disc)?;
            let mut rx = Receiver::new(ADDR_TX, FrameKind::Supervisory, 0);
            let deadline = self.deadline();
            if let Event::Supervisory(Control::Ua) = self.wait_for(&mut rx, deadline)? {
                return Ok(());
            }
        }
        Err(Error::CloseTimeout)
    }
}
