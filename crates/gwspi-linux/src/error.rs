//! Error types for the spidev backend

use thiserror::Error;

/// Spidev-specific errors
#[derive(Debug, Error)]
pub enum SpidevError {
    /// Failed to open device
    #[error("failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set SPI mode
    #[error("failed to set SPI mode to {mode}: {source}")]
    SetModeFailed {
        mode: u8,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set bits per word
    #[error("failed to set bits per word to {bits}: {source}")]
    SetBitsPerWordFailed {
        bits: u8,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set clock speed
    #[error("failed to set clock speed to {speed} Hz: {source}")]
    SetSpeedFailed {
        speed: u32,
        #[source]
        source: std::io::Error,
    },

    /// SPI transfer failed
    #[error("SPI transfer failed: {0}")]
    TransferFailed(#[source] std::io::Error),

    /// Invalid parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Device not specified
    #[error("no device specified")]
    NoDevice,
}

impl From<SpidevError> for gwspi_core::Error {
    fn from(err: SpidevError) -> Self {
        match err {
            SpidevError::OpenFailed { .. } | SpidevError::NoDevice => {
                gwspi_core::Error::DeviceUnavailable(err.to_string())
            }
            SpidevError::SetModeFailed { .. }
            | SpidevError::SetBitsPerWordFailed { .. }
            | SpidevError::SetSpeedFailed { .. } => {
                gwspi_core::Error::DeviceUnavailable(err.to_string())
            }
            SpidevError::TransferFailed(_) | SpidevError::InvalidParameter(_) => {
                gwspi_core::Error::BusIo(err.to_string())
            }
        }
    }
}

/// Result type for spidev operations
pub type Result<T> = std::result::Result<T, SpidevError>;
