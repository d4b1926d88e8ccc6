//! CLI front end for the filelink protocol stack. A thin consumer of the
//! library: argument parsing, wiring, and process exit codes only.

use std::convert::TryFrom;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use filelink::config::{BaudRate, LinkConfig, Role};
use filelink::link::LinkLayer;
use filelink::transfer::{receive_file, send_file};
use filelink::transport::serial::SerialPortTransport;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Tx,
    Rx,
}

/// Send or receive a single file over a serial link.
#[derive(Debug, Parser)]
#[command(name = "filetransfer", version, about)]
struct Cli {
    /// Which end of the link this process acts as.
    #[arg(long, value_enum)]
    role: RoleArg,

    /// Serial device path, e.g. /dev/ttyS0.
    #[arg(long)]
    port: String,

    /// Line rate in bits per second.
    #[arg(long, default_value_t = 9600)]
    baud: u32,

    /// Maximum number of attempts per frame before giving up.
    #[arg(long, default_value_t = 3)]
    tries: u8,

    /// Per-attempt timeout in milliseconds.
    #[arg(long, default_value_t = 3000)]
    timeout: u64,

    /// File to send (role tx) or directory to write the received file into
    /// (role rx).
    path: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let baud_rate = match BaudRate::try_from(cli.baud) {
        Ok(rate) => rate,
        Err(e) => {
            eprintln!("unsupported baud rate: {}", e.0);
            return ExitCode::FAILURE;
        }
    };

    let role = match cli.role {
        RoleArg::Tx => Role::Transmitter,
        RoleArg::Rx => Role::Receiver,
    };

    let config = LinkConfig::new(
        role,
        cli.port.clone(),
        baud_rate,
        Duration::from_millis(cli.timeout),
        cli.tries,
    );

    let transport = SerialPortTransport::new(cli.port, baud_rate);
    let mut link = LinkLayer::new(transport, config);

    let result = match cli.role {
        RoleArg::Tx => send_file(&mut link, &cli.path),
        RoleArg::Rx => receive_file(&mut link, &cli.path).map(|_| ()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("filetransfer: {}", e);
            ExitCode::FAILURE
        }
    }
}
