//! Linux spidev bus implementation
//!
//! Implements the [`SpiBus`] trait on top of the `/dev/spidevX.Y` character
//! device interface.

use crate::error::{Result, SpidevError};

use gwspi_core::bus::SpiBus;
use gwspi_core::Result as CoreResult;

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Default device path on a concentrator board
pub const DEFAULT_DEVICE: &str = "/dev/spidev0.0";

/// Default SPI clock speed in Hz (8 MHz)
const DEFAULT_SPEED_HZ: u32 = 8_000_000;

/// SPI mode constants
pub mod mode {
    /// SPI mode 0: CPOL=0, CPHA=0
    pub const MODE_0: u8 = 0;
    /// SPI mode 1: CPOL=0, CPHA=1
    pub const MODE_1: u8 = 1;
    /// SPI mode 2: CPOL=1, CPHA=0
    pub const MODE_2: u8 = 2;
    /// SPI mode 3: CPOL=1, CPHA=1
    pub const MODE_3: u8 = 3;
}

/// Linux spidev ioctl constants
mod ioctl {
    use nix::ioctl_write_ptr;

    // SPI ioctl magic number
    const SPI_IOC_MAGIC: u8 = b'k';

    // SPI ioctl type numbers
    const SPI_IOC_TYPE_MODE: u8 = 1;
    const SPI_IOC_TYPE_BITS_PER_WORD: u8 = 3;
    const SPI_IOC_TYPE_MAX_SPEED_HZ: u8 = 4;

    ioctl_write_ptr!(spi_ioc_wr_mode, SPI_IOC_MAGIC, SPI_IOC_TYPE_MODE, u8);
    ioctl_write_ptr!(
        spi_ioc_wr_bits_per_word,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_BITS_PER_WORD,
        u8
    );
    ioctl_write_ptr!(
        spi_ioc_wr_max_speed_hz,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_MAX_SPEED_HZ,
        u32
    );

    // SPI_IOC_MESSAGE(n) = _IOW(SPI_IOC_MAGIC, 0, char[n * sizeof(struct spi_ioc_transfer)])
    // Variable-size, so it cannot be generated with the nix macros.

    /// Size of struct spi_ioc_transfer
    pub const SPI_IOC_TRANSFER_SIZE: usize = 32;

    /// Calculate the ioctl number for SPI_IOC_MESSAGE(n)
    pub fn spi_ioc_message(n: u8) -> libc::c_ulong {
        let size = (n as usize) * SPI_IOC_TRANSFER_SIZE;
        // _IOC(_IOC_WRITE, type, 0, size)
        ((1u32 << 30) | ((size as u32) << 16) | ((SPI_IOC_MAGIC as u32) << 8)) as libc::c_ulong
    }
}

/// SPI transfer structure for ioctl, matching the kernel's
/// struct spi_ioc_transfer layout
#[repr(C)]
#[derive(Debug, Default, Clone)]
struct SpiIocTransfer {
    tx_buf: u64,
    rx_buf: u64,
    len: u32,
    speed_hz: u32,
    delay_usecs: u16,
    bits_per_word: u8,
    cs_change: u8,
    tx_nbits: u8,
    rx_nbits: u8,
    word_delay_usecs: u8,
    _pad: u8,
}

/// Configuration for opening a spidev device
#[derive(Debug, Clone)]
pub struct SpidevConfig {
    /// Device path (e.g., "/dev/spidev0.0")
    pub device: String,
    /// SPI clock speed in Hz (default: 8 MHz)
    pub speed_hz: u32,
    /// SPI mode (0-3, default: 0)
    pub mode: u8,
}

impl Default for SpidevConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            speed_hz: DEFAULT_SPEED_HZ,
            mode: mode::MODE_0,
        }
    }
}

impl SpidevConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Set the SPI clock speed in Hz
    pub fn with_speed(mut self, speed_hz: u32) -> Self {
        self.speed_hz = speed_hz;
        self
    }

    /// Set the SPI mode (0-3)
    pub fn with_mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }
}

/// Open spidev bus handle
///
/// Exclusively owns the device file; the connection closes when the value
/// is dropped or [`close`](Self::close)d.
pub struct SpidevBus {
    file: File,
    speed_hz: u32,
}

impl SpidevBus {
    /// Open a spidev device with the given configuration
    pub fn open(config: &SpidevConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(SpidevError::NoDevice);
        }
        if config.mode > 3 {
            return Err(SpidevError::InvalidParameter(format!(
                "SPI mode {} (must be 0-3)",
                config.mode
            )));
        }

        log::debug!("spidev: opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| SpidevError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        let fd = file.as_raw_fd();

        let spi_mode = config.mode;
        unsafe {
            ioctl::spi_ioc_wr_mode(fd, &spi_mode).map_err(|e| SpidevError::SetModeFailed {
                mode: spi_mode,
                source: std::io::Error::from_raw_os_error(e as i32),
            })?;
        }

        let bits: u8 = 8;
        unsafe {
            ioctl::spi_ioc_wr_bits_per_word(fd, &bits).map_err(|e| {
                SpidevError::SetBitsPerWordFailed {
                    bits,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        let speed = config.speed_hz;
        unsafe {
            ioctl::spi_ioc_wr_max_speed_hz(fd, &speed).map_err(|e| {
                SpidevError::SetSpeedFailed {
                    speed,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        log::info!(
            "spidev: opened {} (mode={}, speed={} kHz)",
            config.device,
            spi_mode,
            speed / 1000
        );

        Ok(Self {
            file,
            speed_hz: speed,
        })
    }

    /// Open a device with default settings
    pub fn open_device(device: &str) -> Result<Self> {
        Self::open(&SpidevConfig::new(device))
    }

    /// Perform one SPI transaction
    ///
    /// Issues a single SPI_IOC_MESSAGE with either one transfer (write
    /// only) or two transfers (write phase then read phase) with chip
    /// select held asserted across both.
    fn spi_transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        if tx.is_empty() {
            return Err(SpidevError::InvalidParameter(
                "transfer needs at least the header bytes".into(),
            ));
        }

        let fd = self.file.as_raw_fd();

        let write_phase = SpiIocTransfer {
            tx_buf: tx.as_ptr() as u64,
            rx_buf: 0,
            len: tx.len() as u32,
            speed_hz: self.speed_hz,
            bits_per_word: 8,
            cs_change: 0, // keep CS asserted between phases
            ..Default::default()
        };

        let transfers: Vec<SpiIocTransfer> = if rx.is_empty() {
            vec![write_phase]
        } else {
            vec![
                write_phase,
                SpiIocTransfer {
                    tx_buf: 0,
                    rx_buf: rx.as_mut_ptr() as u64,
                    len: rx.len() as u32,
                    speed_hz: self.speed_hz,
                    bits_per_word: 8,
                    cs_change: 0,
                    ..Default::default()
                },
            ]
        };

        let ioctl_num = ioctl::spi_ioc_message(transfers.len() as u8);
        let ret = unsafe { libc::ioctl(fd, ioctl_num, transfers.as_ptr()) };

        if ret < 0 {
            return Err(SpidevError::TransferFailed(
                std::io::Error::last_os_error(),
            ));
        }

        Ok(())
    }

    /// Get the current clock speed setting
    pub fn speed_hz(&self) -> u32 {
        self.speed_hz
    }

    /// Set a new SPI clock speed
    pub fn set_speed(&mut self, speed_hz: u32) -> Result<()> {
        let fd = self.file.as_raw_fd();
        unsafe {
            ioctl::spi_ioc_wr_max_speed_hz(fd, &speed_hz).map_err(|e| {
                SpidevError::SetSpeedFailed {
                    speed: speed_hz,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }
        self.speed_hz = speed_hz;
        log::debug!("spidev: set speed to {} Hz", speed_hz);
        Ok(())
    }

    /// Close the device
    ///
    /// Dropping the bus closes it as well; this form just makes the
    /// release point explicit in calling code.
    pub fn close(self) {
        log::debug!("spidev: closing device");
        drop(self.file);
    }
}

impl SpiBus for SpidevBus {
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> CoreResult<()> {
        self.spi_transfer(tx, rx).map_err(gwspi_core::Error::from)
    }
}
