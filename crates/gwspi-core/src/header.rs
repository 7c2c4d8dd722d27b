//! Transaction header encoding
//!
//! Every bus transaction starts with a fixed 3-byte header that selects the
//! mux framing, the target chip, the transfer direction and the register
//! address. Burst transactions repeat the header in front of every chunk.

use crate::error::{Error, Result};

/// Fixed size of the transaction header in bytes
pub const HEADER_LEN: usize = 3;

/// Maximum payload of one physical bus transaction.
///
/// Bursts longer than this are split into multiple transactions, each with
/// its own header.
pub const BURST_CHUNK: usize = 1024;

/// Direction flag in the MSB of the address byte
const WRITE_ACCESS: u8 = 0x80;

/// Register addresses occupy the low 7 bits of the address byte
pub const ADDRESS_MASK: u8 = 0x7F;

/// Header framing convention for the shared bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuxMode {
    /// Default framing
    Mode0,
    /// Alternative framing used by boards with an address demux in front
    /// of the concentrator
    Mode1,
}

impl MuxMode {
    /// Selector byte transmitted as header byte 0
    pub fn selector(self) -> u8 {
        match self {
            MuxMode::Mode0 => 0x00,
            MuxMode::Mode1 => 0x01,
        }
    }

    /// Parse a selector byte back into a mux mode
    pub fn from_selector(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(MuxMode::Mode0),
            0x01 => Some(MuxMode::Mode1),
            _ => None,
        }
    }
}

/// Chip reachable over the shared bus
///
/// Several logical targets share one physical bus; each transaction selects
/// exactly one of them via header byte 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// SX1301 concentrator
    Sx1301,
    /// Companion FPGA
    Fpga,
    /// Calibration EEPROM
    Eeprom,
    /// SX127x radio
    Sx127x,
}

impl Target {
    /// Target id transmitted as header byte 1
    pub fn id(self) -> u8 {
        match self {
            Target::Sx1301 => 0x00,
            Target::Fpga => 0x01,
            Target::Eeprom => 0x02,
            Target::Sx127x => 0x03,
        }
    }

    /// Parse a target id byte back into a target
    pub fn from_id(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Target::Sx1301),
            0x01 => Some(Target::Fpga),
            0x02 => Some(Target::Eeprom),
            0x03 => Some(Target::Sx127x),
            _ => None,
        }
    }
}

/// Transfer direction, encoded in the MSB of the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host reads from the target; direction bit clear
    Read,
    /// Host writes to the target; direction bit set
    Write,
}

/// One transaction header, prior to encoding
///
/// Pure description of the addressing part of a transaction; encoding has
/// no side effects. The same header is reused for every chunk of a burst.
#[derive(Debug, Clone, Copy)]
pub struct TransferHeader {
    /// Bus framing convention
    pub mux_mode: MuxMode,
    /// Addressed chip
    pub target: Target,
    /// Transfer direction
    pub direction: Direction,
    /// 7-bit register address
    pub address: u8,
}

impl TransferHeader {
    /// Header for a read transaction
    pub fn read(mux_mode: MuxMode, target: Target, address: u8) -> Self {
        Self {
            mux_mode,
            target,
            direction: Direction::Read,
            address,
        }
    }

    /// Header for a write transaction
    pub fn write(mux_mode: MuxMode, target: Target, address: u8) -> Self {
        Self {
            mux_mode,
            target,
            direction: Direction::Write,
            address,
        }
    }

    /// Encode the header into its 3-byte wire form
    ///
    /// Fails with [`Error::InvalidAddress`] if the address does not fit the
    /// 7-bit field; the MSB of that byte carries the direction flag.
    pub fn encode(&self) -> Result<[u8; HEADER_LEN]> {
        if self.address > ADDRESS_MASK {
            return Err(Error::InvalidAddress(self.address));
        }
        let direction_bit = match self.direction {
            Direction::Write => WRITE_ACCESS,
            Direction::Read => 0x00,
        };
        Ok([
            self.mux_mode.selector(),
            self.target.id(),
            direction_bit | self.address,
        ])
    }

    /// Whether the direction bit is set in an encoded address byte
    pub fn is_write_byte(byte: u8) -> bool {
        byte & WRITE_ACCESS != 0
    }

    /// Extract the 7-bit address from an encoded address byte
    pub fn address_of_byte(byte: u8) -> u8 {
        byte & ADDRESS_MASK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_header_sets_direction_bit() {
        let header = TransferHeader::write(MuxMode::Mode0, Target::Sx1301, 0x2A);
        assert_eq!(header.encode().unwrap(), [0x00, 0x00, 0xAA]);
    }

    #[test]
    fn read_header_clears_direction_bit() {
        let header = TransferHeader::read(MuxMode::Mode0, Target::Sx1301, 0x55);
        assert_eq!(header.encode().unwrap(), [0x00, 0x00, 0x55]);
    }

    #[test]
    fn mux_mode_and_target_bytes() {
        let header = TransferHeader::read(MuxMode::Mode1, Target::Fpga, 0x10);
        assert_eq!(header.encode().unwrap(), [0x01, 0x01, 0x10]);
        let header = TransferHeader::write(MuxMode::Mode0, Target::Sx127x, 0x7F);
        assert_eq!(header.encode().unwrap(), [0x00, 0x03, 0xFF]);
    }

    #[test]
    fn out_of_range_address_is_rejected() {
        let header = TransferHeader::read(MuxMode::Mode0, Target::Sx1301, 0x80);
        assert!(matches!(
            header.encode(),
            Err(Error::InvalidAddress(0x80))
        ));
    }

    #[test]
    fn selector_round_trip() {
        assert_eq!(MuxMode::from_selector(0x01), Some(MuxMode::Mode1));
        assert_eq!(MuxMode::from_selector(0x02), None);
        assert_eq!(Target::from_id(0x02), Some(Target::Eeprom));
        assert_eq!(Target::from_id(0x7F), None);
    }
}
