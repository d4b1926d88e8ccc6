//! Wire-level constants and the control-field vocabulary.
//!
//! These are pure data definitions; framing (stuffing/BCC) lives in
//! [`crate::framing`] and the receive automaton lives in [`crate::receiver`].

use crate::framing::FLAG;

/// Address byte stamped on every frame the Transmitter endpoint sends
/// (SET, I-frames, DISC, and the closing UA).
pub const ADDR_TX: u8 = 0x03;
/// Address byte stamped on every frame the Receiver endpoint sends
/// (UA, RR, REJ, and DISC).
pub const ADDR_RX: u8 = 0x01;

/// Control-field values for supervisory, unnumbered, and information frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Set,
    Ua,
    Disc,
    I(Seq),
    Rr(Seq),
    Rej(Seq),
}

/// A Stop-and-Wait sequence bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seq {
    Zero,
    One,
}

impl Seq {
    pub fn flipped(self) -> Seq {
        match self {
            Seq::Zero => Seq::One,
            Seq::One => Seq::Zero,
        }
    }

    pub fn bit(self) -> u8 {
        match self {
            Seq::Zero => 0,
            Seq::One => 1,
        }
    }
}

impl Control {
    /// Encodes the control field to its wire byte.
    pub fn to_byte(self) -> u8 {
        match self {
            Control::Set => 0x03,
            Control::Ua => 0x07,
            Control::Disc => 0x0B,
            Control::I(Seq::Zero) => 0x00,
            Control::I(Seq::One) => 0x80,
            Control::Rr(Seq::Zero) => 0x05,
            Control::Rr(Seq::One) => 0x85,
            Control::Rej(Seq::Zero) => 0x01,
            Control::Rej(Seq::One) => 0x81,
        }
    }

    /// Decodes a supervisory/unnumbered control byte. Returns `None` for
    /// I-frame control bytes — use [`Control::i_from_byte`] for those, since
    /// the caller usually knows up front whether it expects data or
    /// supervisory traffic.
    pub fn supervisory_from_byte(byte: u8) -> Option<Control> {
        match byte {
            0x03 => Some(Control::Set),
            0x07 => Some(Control::Ua),
            0x0B => Some(Control::Disc),
            0x05 => Some(Control::Rr(Seq::Zero)),
            0x85 => Some(Control::Rr(Seq::One)),
            0x01 => Some(Control::Rej(Seq::Zero)),
            0x81 => Some(Control::Rej(Seq::One)),
            _ => None,
        }
    }

    /// Decodes an I-frame control byte (bit 6 carries the sequence number).
    pub fn i_from_byte(byte: u8) -> Option<Control> {
        match byte {
            0x00 => Some(Control::I(Seq::Zero)),
            0x80 => Some(Control::I(Seq::One)),
            _ => None,
        }
    }

    pub fn is_i_frame(self) -> bool {
        matches!(self, Control::I(_))
    }
}

/// Builds an unnumbered/supervisory frame (no payload): `FLAG A C BCC1 FLAG`.
pub fn build_supervisory(addr: u8, control: Control) -> Vec<u8> {
    let c = control.to_byte();
    vec![FLAG, addr, c, addr ^ c, FLAG]
}

/// Builds an I-frame: header, stuffed payload + BCC2, trailing FLAG.
pub fn build_i_frame(addr: u8, seq: Seq, payload: &[u8]) -> Vec<u8> {
    let control = Control::I(seq);
    let c = control.to_byte();
    let check = crate::framing::bcc2(payload);
    let mut body = payload.to_vec();
    body.push(check);
    let stuffed = crate::framing::stuff(&body);

    let mut frame = Vec::with_capacity(5 + stuffed.len());
    frame.push(FLAG);
    frame.push(addr);
    frame.push(c);
    frame.push(addr ^ c);
    frame.extend_from_slice(&stuffed);
    frame.push(FLAG);
    frame
}
