//! End-to-end file transfer through the public API: a real temp file on
//! disk, driven across the in-memory loopback transport pair.

use std::thread;
use std::time::Duration;

use filelink::config::{BaudRate, LinkConfig, Role};
use filelink::link::LinkLayer;
use filelink::transfer::{receive_file, send_file};
use filelink::transport::loopback;
use filelink::Result;

fn scratch_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("filelink-it-{}-{}", tag, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn transfers_a_multi_chunk_file_and_preserves_name_and_content() {
    let dir = scratch_dir("multi-chunk");
    let src_path = dir.join("notes.bin");
    // Large enough to span several Data packets at the 254-byte chunk size.
    let content: Vec<u8> = (0..2000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(&src_path, &content).unwrap();

    let timeout = Duration::from_millis(200);
    let tx_cfg = LinkConfig::new(Role::Transmitter, "loop", BaudRate::B9600, timeout, 3);
    let rx_cfg = LinkConfig::new(Role::Receiver, "loop", BaudRate::B9600, timeout, 3);
    let (tx_transport, rx_transport) = loopback::pair();

    let src_path_clone = src_path.clone();
    let tx_thread = thread::spawn(move || -> Result<()> {
        let mut link = LinkLayer::new(tx_transport, tx_cfg);
        send_file(&mut link, &src_path_clone)
    });
    let dest_dir = dir.clone();
    let rx_thread = thread::spawn(move || -> Result<std::path::PathBuf> {
        let mut link = LinkLayer::new(rx_transport, rx_cfg);
        receive_file(&mut link, &dest_dir)
    });

    tx_thread.join().unwrap().unwrap();
    let dest_path = rx_thread.join().unwrap().unwrap();

    assert_eq!(dest_path.file_name().unwrap(), "notes.bin");
    let copied = std::fs::read(&dest_path).unwrap();
    assert_eq!(copied, content);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn empty_file_transfers_as_start_immediately_followed_by_end() {
    let dir = scratch_dir("empty-file");
    let src_path = dir.join("empty.txt");
    std::fs::write(&src_path, b"").unwrap();

    let timeout = Duration::from_millis(200);
    let tx_cfg = LinkConfig::new(Role::Transmitter, "loop", BaudRate::B9600, timeout, 3);
    let rx_cfg = LinkConfig::new(Role::Receiver, "loop", BaudRate::B9600, timeout, 3);
    let (tx_transport, rx_transport) = loopback::pair();

    let src_path_clone = src_path.clone();
    let tx_thread = thread::spawn(move || -> Result<()> {
        let mut link = LinkLayer::new(tx_transport, tx_cfg);
        send_file(&mut link, &src_path_clone)
    });
    let dest_dir = dir.clone();
    let rx_thread = thread::spawn(move || -> Result<std::path::PathBuf> {
        let mut link = LinkLayer::new(rx_transport, rx_cfg);
        receive_file(&mut link, &dest_dir)
    });

    tx_thread.join().unwrap().unwrap();
    let dest_path = rx_thread.join().unwrap().unwrap();
    assert_eq!(std::fs::read(&dest_path).unwrap().len(), 0);

    std::fs::remove_dir_all(&dir).ok();
}
