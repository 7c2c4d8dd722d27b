//! gwspi-core - Register transaction protocol for concentrator SPI buses
//!
//! This crate implements the host side of the SX1301-style register access
//! protocol: a fixed 3-byte transaction header (mux mode, target id,
//! direction + 7-bit address) followed by data, with long transfers split
//! into bus-native chunks. It knows nothing about any particular OS bus
//! device; backends plug in through the [`SpiBus`] trait.
//!
//! # Example
//!
//! ```ignore
//! use gwspi_core::{ConcentratorPort, MuxMode, Target};
//!
//! let mut port = ConcentratorPort::new(bus);
//! port.write_register(MuxMode::Mode0, Target::Sx1301, 0x2A, 0x96)?;
//! let version = port.read_register(MuxMode::Mode0, Target::Sx1301, 0x01)?;
//!
//! let mut fifo = vec![0u8; 2500];
//! port.read_burst(MuxMode::Mode0, Target::Sx1301, 0x5A, &mut fifo)?;
//! port.close();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bus;
pub mod error;
pub mod header;
pub mod port;

pub use bus::SpiBus;
pub use error::{Error, Result};
pub use header::{
    Direction, MuxMode, Target, TransferHeader, ADDRESS_MASK, BURST_CHUNK, HEADER_LEN,
};
pub use port::ConcentratorPort;

/// Library version string, for diagnostic banners
pub fn version_info() -> &'static str {
    concat!("gwspi-core v", env!("CARGO_PKG_VERSION"))
}
