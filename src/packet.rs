//! Application framing: the TLV-based control/data packets
//! carried inside link-layer I-frames.

use crate::error::{Error, Result};

const KIND_START: u8 = 0x01;
const KIND_DATA: u8 = 0x02;
const KIND_END: u8 = 0x03;

const TLV_SIZE: u8 = 0x00;
const TLV_NAME: u8 = 0x01;

/// One application-layer unit, as carried inside a single I-frame payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// Announces an incoming file: its size and name.
    Start { file_size: u64, file_name: String },
    /// One chunk of file content.
    Data(Vec<u8>),
    /// Marks the end of the transfer. Carries the same metadata as `Start`
    /// so the receiver can cross-check what it actually received.
    End { file_size: u64, file_name: String },
}

/// Smallest number of bytes that holds `value`, at least 1.
fn size_width(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    std::cmp::max(1, (bits + 7) / 8)
}

fn encode_size_tlv(file_size: u64, out: &mut Vec<u8>) {
    let width = size_width(file_size);
    out.push(TLV_SIZE);
    out.push(width as u8);
    for i in (0..width).rev() {
        out.push(((file_size >> (i * 8)) & 0xFF) as u8);
    }
}

fn encode_name_tlv(file_name: &str, out: &mut Vec<u8>) {
    let bytes = file_name.as_bytes();
    out.push(TLV_NAME);
    out.push(bytes.len() as u8);
    out.extend_from_slice(bytes);
}

fn encode_metadata(file_size: u64, file_name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    encode_size_tlv(file_size, &mut out);
    encode_name_tlv(file_name, &mut out);
    out
}

fn decode_metadata(body: &[u8]) -> Result<(u64, String)> {
    let mut file_size = None;
    let mut file_name = None;
    let mut pos = 0;
    while pos < body.len() {
        if pos + 2 > body.len() {
            return Err(Error::TransferIntegrity("truncated TLV header".into()));
        }
        let tlv_type = body[pos];
        let len = body[pos + 1] as usize;
        let start = pos + 2;
        let end = start + len;
        if end > body.len() {
            return Err(Error::TransferIntegrity("truncated TLV value".into()));
        }
        let value = &body[start..end];
        match tlv_type {
            TLV_SIZE => {
                if len == 0 || len > 8 {
                    return Err(Error::TransferIntegrity(format!(
                        "size TLV has invalid width {}",
                        len
                    )));
                }
                let mut v: u64 = 0;
                for &b in value {
                    v = (v << 8) | b as u64;
                }
                file_size = Some(v);
            }
            TLV_NAME => {
                file_name = Some(
                    String::from_utf8(value.to_vec())
                        .map_err(|_| Error::TransferIntegrity("file name is not UTF-8".into()))?,
                );
            }
            other => {
                log::trace!("ignoring unknown TLV type {:#04x}", other);
            }
        }
        pos = end;
    }
    let file_size = file_size.ok_or_else(|| Error::TransferIntegrity("missing size TLV".into()))?;
    let file_name =
        file_name.ok_or_else(|| Error::TransferIntegrity("missing name TLV".into()))?;
    Ok((file_size, file_name))
}

impl Packet {
    /// Serializes this packet to the bytes that go straight into an I-frame
    /// payload (no link-layer framing here).
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Packet::Start { file_size, file_name } => {
                let mut out = vec![KIND_START];
                out.extend(encode_metadata(*file_size, file_name));
                out
            }
            Packet::Data(bytes) => {
                let mut out = Vec::with_capacity(3 + bytes.len());
                out.push(KIND_DATA);
                out.push((bytes.len() >> 8) as u8);
                out.push((bytes.len() & 0xFF) as u8);
                out.extend_from_slice(bytes);
                out
            }
            Packet::End { file_size, file_name } => {
                let mut out = vec![KIND_END];
                out.extend(encode_metadata(*file_size, file_name));
                out
            }
        }
    }

    /// Parses a packet from a raw I-frame payload.
    pub fn decode(bytes: &[u8]) -> Result<Packet> {
        let (&kind, body) = bytes
            .split_first()
            .ok_or_else(|| Error::TransferIntegrity("empty packet".into()))?;
        match kind {
            KIND_START => {
                let (file_size, file_name) = decode_metadata(body)?;
                Ok(Packet::Start { file_size, file_name })
            }
            KIND_END => {
                let (file_size, file_name) = decode_metadata(body)?;
                Ok(Packet::End { file_size, file_name })
            }
            KIND_DATA => {
                let (&len_hi, rest) = body
                    .split_first()
                    .ok_or_else(|| Error::TransferIntegrity("truncated data length".into()))?;
                let (&len_lo, rest) = rest
                    .split_first()
                    .ok_or_else(|| Error::TransferIntegrity("truncated data length".into()))?;
                let len = (len_hi as usize) * 256 + len_lo as usize;
                if rest.len() != len {
                    return Err(Error::TransferIntegrity(format!(
                        "data packet declared {} bytes but carried {}",
                        len,
                        rest.len()
                    )));
                }
                Ok(Packet::Data(rest.to_vec()))
            }
            other => Err(Error::TransferIntegrity(format!(
                "unknown packet kind {:#04x}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_packet_round_trips() {
        let packet = Packet::Start {
            file_size: 424242,
            file_name: "report.pdf".to_string(),
        };
        let encoded = packet.encode();
        assert_eq!(Packet::decode(&encoded).unwrap(), packet);
    }

    #[test]
    fn data_packet_round_trips() {
        let packet = Packet::Data(vec![1, 2, 3, 4, 5]);
        let encoded = packet.encode();
        assert_eq!(Packet::decode(&encoded).unwrap(), packet);
    }

    #[test]
    fn data_packet_carries_big_endian_length_prefix() {
        let packet = Packet::Data(vec![0xAA; 300]);
        let encoded = packet.encode();
        assert_eq!(encoded[0], KIND_DATA);
        assert_eq!(encoded[1], 1); // len_hi
        assert_eq!(encoded[2], 44); // len_lo: 300 = 1*256 + 44
        assert_eq!(&encoded[3..], &vec![0xAA; 300][..]);
    }

    #[test]
    fn decode_rejects_data_length_mismatch() {
        let body = vec![KIND_DATA, 0x00, 0x05, 1, 2, 3];
        assert!(Packet::decode(&body).is_err());
    }

    #[test]
    fn size_width_is_minimal() {
        assert_eq!(size_width(0), 1);
        assert_eq!(size_width(255), 1);
        assert_eq!(size_width(256), 2);
        assert_eq!(size_width(u64::from(u32::MAX)), 4);
    }

    #[test]
    fn start_and_end_use_distinct_kinds() {
        let start = Packet::Start { file_size: 10, file_name: "a".into() }.encode();
        let end = Packet::End { file_size: 10, file_name: "a".into() }.encode();
        assert_ne!(start[0], end[0]);
    }

    #[test]
    fn decode_rejects_missing_name_tlv() {
        let mut body = vec![KIND_START];
        encode_size_tlv(10, &mut body);
        assert!(Packet::decode(&body).is_err());
    }
}
