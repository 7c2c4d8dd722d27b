//! gwspi-linux - Linux spidev backend
//!
//! Drives a concentrator board through the Linux `/dev/spidevX.Y`
//! character device interface.
//!
//! # Example
//!
//! ```no_run
//! use gwspi_linux::{SpidevBus, SpidevConfig};
//! use gwspi_core::{ConcentratorPort, MuxMode, Target};
//!
//! // Open with default settings (8 MHz, mode 0)
//! let bus = SpidevBus::open_device("/dev/spidev0.0")?;
//!
//! // Or with custom settings
//! let config = SpidevConfig::new("/dev/spidev0.0")
//!     .with_speed(2_000_000)
//!     .with_mode(0);
//! let bus = SpidevBus::open(&config)?;
//!
//! let mut port = ConcentratorPort::new(bus);
//! let version = port.read_register(MuxMode::Mode0, Target::Sx1301, 0x01)?;
//! println!("chip version: 0x{:02X}", version);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # System requirements
//!
//! - Linux kernel with spidev support enabled (`CONFIG_SPI_SPIDEV`)
//! - Read/write access to the `/dev/spidevX.Y` device

pub mod device;
pub mod error;

// Re-exports
pub use device::{mode, SpidevBus, SpidevConfig, DEFAULT_DEVICE};
pub use error::{Result, SpidevError};
