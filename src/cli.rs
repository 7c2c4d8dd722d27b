//! CLI argument parsing

use clap::Parser;
use gwspi_linux::DEFAULT_DEVICE;

#[derive(Parser)]
#[command(name = "gwspi")]
#[command(author, version, about = "SPI diagnostic harness for LoRa concentrator boards", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Linux SPI device path
    #[arg(short, long, default_value = DEFAULT_DEVICE)]
    pub device: String,

    /// SPI clock speed in Hz
    #[arg(long)]
    pub speed: Option<u32>,

    /// Run against the in-memory emulator instead of hardware
    #[arg(long)]
    pub dummy: bool,

    /// Repeat each transaction, for timing characterisation with a logic
    /// analyzer
    #[arg(long, default_value_t = 1)]
    pub repeat: u32,
}
