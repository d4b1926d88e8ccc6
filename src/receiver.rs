//! The receive state machine: a single byte-at-a-time DFA shared by
//! supervisory/unnumbered frame reception and I-frame reception.
//!
//! One [`Receiver`] is built fresh for each `read`/`write`/handshake call —
//! no automaton state is ever kept across calls beyond what the link layer
//! explicitly threads through (`Ns`/`Nr`, connection phase). Leaking receive
//! state between operations is exactly the kind of bug that only shows up
//! once two endpoints run concurrently, so it's avoided by construction.

use crate::frame::{Control, Seq};
use crate::framing::{bcc2, destuff, FLAG};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    AfterFlag,
    GotA,
    GotC,
    GotBcc1,
}

/// What kind of frame this automaton instance is willing to accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// A supervisory/unnumbered frame (no payload region).
    Supervisory,
    /// An I-frame; payload is accumulated until the trailing FLAG.
    IFrame,
}

/// An event produced by feeding one byte to the automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Not enough bytes yet; keep feeding.
    Pending,
    /// A supervisory/unnumbered frame was accepted.
    Supervisory(Control),
    /// An I-frame passed BCC1 and BCC2 and was destuffed successfully.
    IFrame { seq: Seq, payload: Vec<u8> },
    /// A frame was discarded: bad destuffing, short payload, BCC2 mismatch,
    /// or an oversized accumulator. Never surfaced past the link layer.
    FrameError,
}

/// Per-call receive automaton state.
pub struct Receiver {
    addr: u8,
    kind: FrameKind,
    state: State,
    header_a: u8,
    header_c: u8,
    accum: Vec<u8>,
    max_accum: usize,
}

impl Receiver {
    /// Builds an automaton that accepts frames from address `addr`.
    ///
    /// `max_payload` bounds the post-stuffing accumulator at
    /// `2*max_payload + 2` (payload plus BCC2, worst case every byte
    /// stuffed).
    pub fn new(addr: u8, kind: FrameKind, max_payload: usize) -> Self {
        Receiver {
            addr,
            kind,
            state: State::Idle,
            header_a: 0,
            header_c: 0,
            accum: Vec::new(),
            max_accum: 2 * max_payload + 2,
        }
    }

    fn is_expected_c(&self, byte: u8) -> bool {
        match self.kind {
            FrameKind::Supervisory => Control::supervisory_from_byte(byte).is_some(),
            FrameKind::IFrame => Control::i_from_byte(byte).is_some(),
        }
    }

    fn decode_header(&self) -> Control {
        match self.kind {
            FrameKind::Supervisory => Control::supervisory_from_byte(self.header_c)
                .expect("header_c validated in GotA -> GotC transition"),
            FrameKind::IFrame => Control::i_from_byte(self.header_c)
                .expect("header_c validated in GotA -> GotC transition"),
        }
    }

    fn reset(&mut self) {
        self.state = State::Idle;
        self.accum.clear();
    }

    /// Feeds one wire byte to the automaton.
    pub fn push(&mut self, byte: u8) -> Event {
        match self.state {
            State::Idle => {
                if byte == FLAG {
                    self.state = State::AfterFlag;
                }
                Event::Pending
            }
            State::AfterFlag => {
                if byte == FLAG {
                    // stay in AfterFlag
                } else if byte == self.addr {
                    self.header_a = byte;
                    self.state = State::GotA;
                } else {
                    self.state = State::Idle;
                }
                Event::Pending
            }
            State::GotA => {
                if self.is_expected_c(byte) {
                    self.header_c = byte;
                    self.state = State::GotC;
                } else if byte == FLAG {
                    self.state = State::AfterFlag;
                } else {
                    self.state = State::Idle;
                }
                Event::Pending
            }
            State::GotC => {
                if byte == crate::framing::bcc1(self.header_a, self.header_c) {
                    self.state = State::GotBcc1;
                    self.accum.clear();
                } else if byte == FLAG {
                    self.state = State::AfterFlag;
                } else {
                    self.state = State::Idle;
                }
                Event::Pending
            }
            State::GotBcc1 => self.push_after_header(byte),
        }
    }

    fn push_after_header(&mut self, byte: u8) -> Event {
        match self.kind {
            FrameKind::Supervisory => {
                let control = self.decode_header();
                self.reset();
                if byte == FLAG {
                    Event::Supervisory(control)
                } else {
                    Event::FrameError
                }
            }
            FrameKind::IFrame => {
                if byte == FLAG {
                    let control = self.decode_header();
                    let seq = match control {
                        Control::I(seq) => seq,
                        _ => unreachable!("is_expected_c only accepts I-frame control bytes"),
                    };
                    let result = self.finish_i_frame();
                    self.reset();
                    match result {
                        Ok(payload) => Event::IFrame { seq, payload },
                        Err(_) => Event::FrameError,
                    }
                } else {
                    self.accum.push(byte);
                    if self.accum.len() > self.max_accum {
                        self.reset();
                        Event::FrameError
                    } else {
                        Event::Pending
                    }
                }
            }
        }
    }

    fn finish_i_frame(&self) -> Result<Vec<u8>, ()> {
        let destuffed = destuff(&self.accum).map_err(|_| ())?;
        if destuffed.is_empty() {
            return Err(());
        }
        let (payload, check) = destuffed.split_at(destuffed.len() - 1);
        if bcc2(payload) != check[0] {
            return Err(());
        }
        Ok(payload.to_vec())
    }
}
