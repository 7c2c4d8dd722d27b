//! Concentrator port: register transfers and burst chunking
//!
//! [`ConcentratorPort`] owns a bus backend and speaks the register
//! transaction protocol over it: single-byte addressed reads/writes and
//! arbitrary-length bursts split into [`BURST_CHUNK`]-sized transactions.

use crate::bus::SpiBus;
use crate::error::{Error, Result};
use crate::header::{MuxMode, Target, TransferHeader, ADDRESS_MASK, BURST_CHUNK, HEADER_LEN};

/// Register access port to a concentrator board
///
/// Owns the bus exclusively; dropping the port (or calling
/// [`close`](Self::close)) releases the underlying device. Because `close`
/// consumes the port, no transfer can be issued on a closed handle.
pub struct ConcentratorPort<B: SpiBus> {
    bus: B,
}

impl<B: SpiBus> ConcentratorPort<B> {
    /// Wrap an open bus backend
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Write one byte to a register
    ///
    /// One bus transaction: 3-byte header followed by the value. The MSB of
    /// `address` is ignored; that bit position carries the direction flag
    /// on the wire, so register addresses are 7-bit.
    pub fn write_register(
        &mut self,
        mux_mode: MuxMode,
        target: Target,
        address: u8,
        value: u8,
    ) -> Result<()> {
        let header = TransferHeader::write(mux_mode, target, address & ADDRESS_MASK).encode()?;
        let mut tx = [0u8; HEADER_LEN + 1];
        tx[..HEADER_LEN].copy_from_slice(&header);
        tx[HEADER_LEN] = value;
        self.bus.transfer(&tx, &mut [])?;
        log::debug!(
            "write {:?}/{:?} reg 0x{:02X} <- 0x{:02X}",
            mux_mode,
            target,
            address & ADDRESS_MASK,
            value
        );
        Ok(())
    }

    /// Read one byte from a register
    ///
    /// One bus transaction: 3-byte header, then one byte clocked in.
    pub fn read_register(&mut self, mux_mode: MuxMode, target: Target, address: u8) -> Result<u8> {
        let header = TransferHeader::read(mux_mode, target, address & ADDRESS_MASK).encode()?;
        let mut value = [0u8; 1];
        self.bus.transfer(&header, &mut value)?;
        log::debug!(
            "read {:?}/{:?} reg 0x{:02X} -> 0x{:02X}",
            mux_mode,
            target,
            address & ADDRESS_MASK,
            value[0]
        );
        Ok(value[0])
    }

    /// Burst-write `data` to a register
    ///
    /// The buffer is split into chunks of at most [`BURST_CHUNK`] bytes,
    /// one bus transaction per chunk, in increasing offset order. Each
    /// chunk repeats the same header: burst registers on the concentrator
    /// are FIFO ports that advance internally, so the address is held
    /// constant rather than incremented. An empty buffer succeeds without
    /// touching the bus.
    ///
    /// If a chunk transaction fails the burst stops immediately and the
    /// error reports how many chunks had already been applied.
    pub fn write_burst(
        &mut self,
        mux_mode: MuxMode,
        target: Target,
        address: u8,
        data: &[u8],
    ) -> Result<()> {
        let header = TransferHeader::write(mux_mode, target, address & ADDRESS_MASK).encode()?;
        if data.is_empty() {
            return Ok(());
        }

        let total = data.len().div_ceil(BURST_CHUNK);
        let mut tx = Vec::with_capacity(HEADER_LEN + BURST_CHUNK);
        for (completed, chunk) in data.chunks(BURST_CHUNK).enumerate() {
            tx.clear();
            tx.extend_from_slice(&header);
            tx.extend_from_slice(chunk);
            self.bus
                .transfer(&tx, &mut [])
                .map_err(|e| burst_failure(e, completed, total))?;
        }
        log::debug!(
            "burst write {:?}/{:?} reg 0x{:02X}: {} bytes in {} chunks",
            mux_mode,
            target,
            address & ADDRESS_MASK,
            data.len(),
            total
        );
        Ok(())
    }

    /// Burst-read into `buf`
    ///
    /// Fills the whole buffer, issuing one transaction per
    /// [`BURST_CHUNK`]-sized chunk in increasing offset order, each with
    /// the same repeated header (see [`write_burst`](Self::write_burst) for
    /// the addressing convention). An empty buffer succeeds without
    /// touching the bus.
    pub fn read_burst(
        &mut self,
        mux_mode: MuxMode,
        target: Target,
        address: u8,
        buf: &mut [u8],
    ) -> Result<()> {
        let header = TransferHeader::read(mux_mode, target, address & ADDRESS_MASK).encode()?;
        if buf.is_empty() {
            return Ok(());
        }

        let total = buf.len().div_ceil(BURST_CHUNK);
        let len = buf.len();
        for (completed, chunk) in buf.chunks_mut(BURST_CHUNK).enumerate() {
            self.bus
                .transfer(&header, chunk)
                .map_err(|e| burst_failure(e, completed, total))?;
        }
        log::debug!(
            "burst read {:?}/{:?} reg 0x{:02X}: {} bytes in {} chunks",
            mux_mode,
            target,
            address & ADDRESS_MASK,
            len,
            total
        );
        Ok(())
    }

    /// Release the port and hand the bus backend back
    pub fn into_inner(self) -> B {
        self.bus
    }

    /// Release the port, closing the underlying bus
    pub fn close(self) {
        log::debug!("closing concentrator port");
        drop(self.bus);
    }
}

/// Tag a chunk failure with burst progress so the caller can tell how much
/// of the burst reached the chip
fn burst_failure(source: Error, completed: usize, total: usize) -> Error {
    Error::PartialBurst {
        completed,
        total,
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every transaction; optionally fails the nth one and scripts
    /// bytes to clock in on reads.
    #[derive(Default)]
    struct MockBus {
        transactions: Vec<Vec<u8>>,
        rx_script: Vec<u8>,
        fail_at: Option<usize>,
    }

    impl SpiBus for MockBus {
        fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
            if self.fail_at == Some(self.transactions.len()) {
                return Err(Error::BusIo("injected fault".into()));
            }
            self.transactions.push(tx.to_vec());
            for byte in rx.iter_mut() {
                *byte = if self.rx_script.is_empty() {
                    0
                } else {
                    self.rx_script.remove(0)
                };
            }
            Ok(())
        }
    }

    fn port() -> ConcentratorPort<MockBus> {
        ConcentratorPort::new(MockBus::default())
    }

    #[test]
    fn write_register_frames_header_and_value() {
        let mut port = port();
        port.write_register(MuxMode::Mode0, Target::Sx1301, 0x2A, 0x96)
            .unwrap();
        let bus = port.into_inner();
        assert_eq!(bus.transactions, vec![vec![0x00, 0x00, 0xAA, 0x96]]);
    }

    #[test]
    fn write_register_masks_direction_bit_position() {
        // 0xAA addresses register 0x2A; the top bit belongs to the
        // direction flag.
        let mut port = port();
        port.write_register(MuxMode::Mode0, Target::Sx1301, 0xAA, 0x96)
            .unwrap();
        let bus = port.into_inner();
        assert_eq!(bus.transactions, vec![vec![0x00, 0x00, 0xAA, 0x96]]);
    }

    #[test]
    fn read_register_returns_clocked_byte() {
        let mut port = port();
        port.bus.rx_script = vec![0x5A];
        let value = port
            .read_register(MuxMode::Mode0, Target::Sx1301, 0x55)
            .unwrap();
        assert_eq!(value, 0x5A);
        let bus = port.into_inner();
        assert_eq!(bus.transactions, vec![vec![0x00, 0x00, 0x55]]);
    }

    #[test]
    fn burst_write_splits_into_chunks_in_order() {
        let data: Vec<u8> = (0..2500u32).map(|i| (i % 251) as u8).collect();
        let mut port = port();
        port.write_burst(MuxMode::Mode0, Target::Sx1301, 0x5A, &data)
            .unwrap();
        let bus = port.into_inner();
        assert_eq!(bus.transactions.len(), 3);
        assert_eq!(bus.transactions[0].len(), HEADER_LEN + 1024);
        assert_eq!(bus.transactions[1].len(), HEADER_LEN + 1024);
        assert_eq!(bus.transactions[2].len(), HEADER_LEN + 452);

        // Every chunk repeats the same header
        for tx in &bus.transactions {
            assert_eq!(&tx[..HEADER_LEN], &[0x00, 0x00, 0xDA]);
        }

        // Concatenated payloads reconstruct the buffer in order
        let replayed: Vec<u8> = bus
            .transactions
            .iter()
            .flat_map(|tx| tx[HEADER_LEN..].to_vec())
            .collect();
        assert_eq!(replayed, data);
    }

    #[test]
    fn burst_of_exact_chunk_multiple_has_no_partial_chunk() {
        let data = vec![0x42u8; 2 * BURST_CHUNK];
        let mut port = port();
        port.write_burst(MuxMode::Mode0, Target::Sx1301, 0x10, &data)
            .unwrap();
        let bus = port.into_inner();
        assert_eq!(bus.transactions.len(), 2);
        assert!(bus
            .transactions
            .iter()
            .all(|tx| tx.len() == HEADER_LEN + BURST_CHUNK));
    }

    #[test]
    fn small_burst_is_one_chunk() {
        let mut port = port();
        port.write_burst(MuxMode::Mode0, Target::Sx1301, 0x55, &[1, 2, 3])
            .unwrap();
        assert_eq!(port.into_inner().transactions.len(), 1);
    }

    #[test]
    fn empty_bursts_touch_nothing() {
        let mut port = port();
        port.write_burst(MuxMode::Mode0, Target::Sx1301, 0x55, &[])
            .unwrap();
        port.read_burst(MuxMode::Mode0, Target::Sx1301, 0x55, &mut [])
            .unwrap();
        assert!(port.into_inner().transactions.is_empty());
    }

    #[test]
    fn burst_read_fills_buffer_in_order() {
        let mut port = port();
        port.bus.rx_script = (0..2500u32).map(|i| (i % 251) as u8).collect();
        let mut buf = vec![0u8; 2500];
        port.read_burst(MuxMode::Mode0, Target::Sx1301, 0x5A, &mut buf)
            .unwrap();
        let expected: Vec<u8> = (0..2500u32).map(|i| (i % 251) as u8).collect();
        assert_eq!(buf, expected);
        assert_eq!(port.into_inner().transactions.len(), 3);
    }

    #[test]
    fn chunk_failure_reports_progress() {
        let data = vec![0u8; 2500];
        let mut port = port();
        port.bus.fail_at = Some(1);
        let err = port
            .write_burst(MuxMode::Mode0, Target::Sx1301, 0x5A, &data)
            .unwrap_err();
        match err {
            Error::PartialBurst {
                completed, total, ..
            } => {
                assert_eq!(completed, 1);
                assert_eq!(total, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        // The burst stopped at the fault; only the first chunk went out
        assert_eq!(port.into_inner().transactions.len(), 1);
    }

    #[test]
    fn first_chunk_failure_reports_zero_completed() {
        let mut port = port();
        port.bus.fail_at = Some(0);
        let err = port
            .read_burst(MuxMode::Mode0, Target::Sx1301, 0x5A, &mut [0u8; 10])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::PartialBurst {
                completed: 0,
                total: 1,
                ..
            }
        ));
    }
}
