//! Error types for gwspi-core

use thiserror::Error;

/// Core error type shared by all bus backends
#[derive(Debug, Error)]
pub enum Error {
    /// The bus device could not be opened; no valid handle exists
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Register address does not fit the 7-bit header field
    #[error("invalid register address 0x{0:02X} (7-bit range is 0x00..=0x7F)")]
    InvalidAddress(u8),

    /// A bus transaction failed at the transport level
    #[error("bus transfer failed: {0}")]
    BusIo(String),

    /// A burst was interrupted mid-way, leaving it partially applied.
    ///
    /// `completed` chunks reached the chip before the failing one, so
    /// downstream register state may be inconsistent. Never retried
    /// internally; whether a retry is safe depends on the registers
    /// involved and is the caller's call.
    #[error("burst aborted after {completed} of {total} chunks: {source}")]
    PartialBurst {
        /// Number of chunk transactions that completed before the failure
        completed: usize,
        /// Total number of chunks the burst was split into
        total: usize,
        /// The underlying transport failure
        #[source]
        source: Box<Error>,
    },
}

/// Result type alias using the core Error type
pub type Result<T> = std::result::Result<T, Error>;
