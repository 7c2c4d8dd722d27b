//! gwspi-dummy - In-memory concentrator emulator for testing
//!
//! This crate provides a dummy bus backend that emulates a concentrator
//! board in memory. It's useful for testing and development without real
//! hardware: it decodes every transaction header, so the full wire framing
//! is exercised end to end.
//!
//! Single-byte writes latch the value at (target, register); single-byte
//! reads return the latch, giving the loop-back behavior of an echo test
//! fixture. Burst data goes through a per-register FIFO queue, modelling
//! the FIFO-port registers that bursts address on the real chip: burst
//! writes enqueue, burst reads drain in order, and reads fall back to the
//! latch once the queue is empty.

use std::collections::{HashMap, VecDeque};

use gwspi_core::bus::SpiBus;
use gwspi_core::{Error, MuxMode, Result, Target, TransferHeader, HEADER_LEN};

/// In-memory emulated concentrator
#[derive(Debug, Default)]
pub struct DummyConcentrator {
    latches: HashMap<(u8, u8), u8>,
    fifos: HashMap<(u8, u8), VecDeque<u8>>,
    transactions: usize,
}

impl DummyConcentrator {
    /// Create a new emulator with all registers at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physical transactions seen so far
    ///
    /// Each chunk of a burst counts as one transaction, so chunking is
    /// observable from tests.
    pub fn transaction_count(&self) -> usize {
        self.transactions
    }

    /// Current latch value of a register (0 if never written)
    pub fn register(&self, target: Target, address: u8) -> u8 {
        self.latches
            .get(&(target.id(), address))
            .copied()
            .unwrap_or(0)
    }

    /// Preload a register latch, as if the chip had powered up with it
    pub fn set_register(&mut self, target: Target, address: u8, value: u8) {
        self.latches.insert((target.id(), address), value);
    }

    /// Bytes currently queued on a burst register
    pub fn fifo_len(&self, target: Target, address: u8) -> usize {
        self.fifos
            .get(&(target.id(), address))
            .map(VecDeque::len)
            .unwrap_or(0)
    }

    fn decode_header(tx: &[u8]) -> Result<(MuxMode, Target, bool, u8)> {
        if tx.len() < HEADER_LEN {
            return Err(Error::BusIo(format!(
                "short transaction: {} bytes, header needs {}",
                tx.len(),
                HEADER_LEN
            )));
        }
        let mux_mode = MuxMode::from_selector(tx[0])
            .ok_or_else(|| Error::BusIo(format!("bad mux selector byte 0x{:02X}", tx[0])))?;
        let target = Target::from_id(tx[1])
            .ok_or_else(|| Error::BusIo(format!("bad target id byte 0x{:02X}", tx[1])))?;
        let is_write = TransferHeader::is_write_byte(tx[2]);
        let address = TransferHeader::address_of_byte(tx[2]);
        Ok((mux_mode, target, is_write, address))
    }
}

impl SpiBus for DummyConcentrator {
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        self.transactions += 1;
        let (mux_mode, target, is_write, address) = Self::decode_header(tx)?;
        let key = (target.id(), address);

        if is_write {
            let payload = &tx[HEADER_LEN..];
            if !rx.is_empty() {
                return Err(Error::BusIo(
                    "write transaction cannot clock data in".into(),
                ));
            }
            if payload.is_empty() {
                return Err(Error::BusIo("write transaction without payload".into()));
            }
            if let Some(&last) = payload.last() {
                self.latches.insert(key, last);
            }
            self.fifos.entry(key).or_default().extend(payload);
            log::trace!(
                "dummy: {:?}/{:?} write {} bytes at 0x{:02X}",
                mux_mode,
                target,
                payload.len(),
                address
            );
        } else {
            if tx.len() != HEADER_LEN {
                return Err(Error::BusIo(
                    "read transaction must not carry payload".into(),
                ));
            }
            if rx.is_empty() {
                return Err(Error::BusIo("read transaction without read buffer".into()));
            }
            let latch = self.latches.get(&key).copied().unwrap_or(0);
            let fifo = self.fifos.entry(key).or_default();
            for byte in rx.iter_mut() {
                *byte = fifo.pop_front().unwrap_or(latch);
            }
            log::trace!(
                "dummy: {:?}/{:?} read {} bytes at 0x{:02X}",
                mux_mode,
                target,
                rx.len(),
                address
            );
        }

        Ok(())
    }
}
