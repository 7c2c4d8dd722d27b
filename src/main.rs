//! gwspi - SPI diagnostic harness for LoRa concentrator boards
//!
//! Exercises the register transaction driver with a fixed probe sequence
//! (single register accesses plus small and oversized bursts) so the wire
//! framing and chunk timing can be checked with a logic analyzer. With
//! `--dummy` the same sequence runs against the in-memory emulator.

mod cli;

use clap::Parser;
use cli::Cli;

use gwspi_core::{ConcentratorPort, MuxMode, Result, SpiBus, Target};
use gwspi_dummy::DummyConcentrator;
use gwspi_linux::{SpidevBus, SpidevConfig};

/// Burst length deliberately far above the chunk size
const BURST_TEST_SIZE: usize = 2500;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    println!("{}", gwspi_core::version_info());

    let result = if cli.dummy {
        run_probe_sequence(ConcentratorPort::new(DummyConcentrator::new()), &cli)
    } else {
        let mut config = SpidevConfig::new(&cli.device);
        if let Some(speed) = cli.speed {
            config = config.with_speed(speed);
        }
        match SpidevBus::open(&config) {
            Ok(bus) => run_probe_sequence(ConcentratorPort::new(bus), &cli),
            Err(e) => {
                eprintln!("fatal: {}", e);
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = result {
        eprintln!("SPI test failed: {}", e);
        std::process::exit(1);
    }
}

/// The classic loragw probe sequence: single R/W, small bursts, bursts far
/// beyond the chunk size, and a final blocking read.
fn run_probe_sequence<B: SpiBus>(mut port: ConcentratorPort<B>, cli: &Cli) -> Result<()> {
    let dataout: Vec<u8> = (0..BURST_TEST_SIZE)
        .map(|i| 0x30 + (i % 10) as u8) // ASCII '0' -> '9'
        .collect();
    // Garbage fill, to be overwritten by received data
    let mut datain = vec![0x23u8; BURST_TEST_SIZE];

    println!("Beginning of SPI test");

    // Normal R/W test
    for _ in 0..cli.repeat {
        port.write_register(MuxMode::Mode0, Target::Sx1301, 0xAA, 0x96)?;
    }
    for _ in 0..cli.repeat {
        port.read_register(MuxMode::Mode0, Target::Sx1301, 0x55)?;
    }

    // Burst R/W test, small bursts well below the chunk size
    for _ in 0..cli.repeat {
        port.write_burst(MuxMode::Mode0, Target::Sx1301, 0x55, &dataout[..16])?;
    }
    for _ in 0..cli.repeat {
        port.read_burst(MuxMode::Mode0, Target::Sx1301, 0x55, &mut datain[..16])?;
    }

    // Burst R/W test, large bursts far above the chunk size
    for _ in 0..cli.repeat {
        port.write_burst(MuxMode::Mode0, Target::Sx1301, 0x5A, &dataout)?;
    }
    for _ in 0..cli.repeat {
        port.read_burst(MuxMode::Mode0, Target::Sx1301, 0x5A, &mut datain)?;
    }

    // Last blocking read, so the harness does not quit before the bus
    // buffer is flushed
    let data = port.read_register(MuxMode::Mode0, Target::Sx1301, 0x55)?;
    println!("data received (simple read): {}", data);

    port.close();
    println!("End of SPI test");

    Ok(())
}
