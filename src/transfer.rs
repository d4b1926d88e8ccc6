//! The file transfer driver: drives a [`LinkLayer`] through a
//! complete one-shot Start/Data.../End exchange.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::config::MAX_PAYLOAD;
use crate::error::{Error, Result};
use crate::link::LinkLayer;
use crate::packet::Packet;
use crate::transport::ByteTransport;

/// Largest chunk of file content one `Data` packet can carry, leaving room
/// for the one-byte packet kind tag and the two-byte length prefix inside
/// the I-frame payload.
const DATA_CHUNK: usize = MAX_PAYLOAD - 3;

/// Sends `path` over an already-open link, then closes the link.
pub fn send_file<T: ByteTransport>(link: &mut LinkLayer<T>, path: &Path) -> Result<()> {
    let mut file = File::open(path)?;
    let file_size = file.metadata()?.len();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    log::info!("sending {} ({} bytes)", file_name, file_size);

    link.open()?;
    link.write(&Packet::Start { file_size, file_name: file_name.clone() }.encode())?;

    let mut buf = vec![0u8; DATA_CHUNK];
    let mut sent = 0u64;
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        link.write(&Packet::Data(buf[..n].to_vec()).encode())?;
        sent += n as u64;
    }
    if sent != file_size {
        return Err(Error::TransferIntegrity(format!(
            "read {} bytes from {} but metadata reported {}",
            sent,
            path.display(),
            file_size
        )));
    }

    link.write(&Packet::End { file_size, file_name }.encode())?;
    link.close()?;
    log::info!("transfer complete: {} bytes sent", sent);
    Ok(())
}

/// Receives one file over an already-open link and writes it under
/// `dest_dir`, using the file name announced in the `Start` packet. Returns
/// the path written.
pub fn receive_file<T: ByteTransport>(
    link: &mut LinkLayer<T>,
    dest_dir: &Path,
) -> Result<std::path::PathBuf> {
    link.open()?;

    let start = Packet::decode(&link.read()?)?;
    let (file_size, file_name) = match start {
        Packet::Start { file_size, file_name } => (file_size, file_name),
        other => {
            return Err(Error::TransferIntegrity(format!(
                "expected Start packet, got {:?}",
                other
            )))
        }
    };
    log::info!("receiving {} ({} bytes)", file_name, file_size);

    let dest_path = dest_dir.join(&file_name);
    let mut out = File::create(&dest_path)?;
    let mut received = 0u64;

    loop {
        let packet = Packet::decode(&link.read()?)?;
        match packet {
            Packet::Data(bytes) => {
                out.write_all(&bytes)?;
                received += bytes.len() as u64;
            }
            Packet::End { file_size: end_size, file_name: end_name } => {
                if end_size != file_size || end_name != file_name {
                    return Err(Error::TransferIntegrity(
                        "End packet metadata does not match Start packet".into(),
                    ));
                }
                break;
            }
            Packet::Start { .. } => {
                return Err(Error::TransferIntegrity("unexpected second Start packet".into()))
            }
        }
    }

    if received != file_size {
        return Err(Error::TransferIntegrity(format!(
            "received {} bytes but Start/End announced {}",
            received, file_size
        )));
    }

    link.close()?;
    log::info!("transfer complete: {} bytes written to {}", received, dest_path.display());
    Ok(dest_path)
}
