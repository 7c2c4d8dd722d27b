//! Bus backend trait
//!
//! [`SpiBus`] is the seam between the protocol layer and the physical (or
//! emulated) bus. Backends only have to provide one primitive: a blocking
//! write-then-read transaction with chip select held for its duration.

use crate::error::Result;

/// One physical bus connection
///
/// A transaction clocks out all of `tx`, then clocks `rx.len()` bytes in,
/// without releasing chip select in between. The call blocks until the
/// transaction completes or fails; transactions issued sequentially on one
/// bus execute in issue order.
///
/// A bus value is not internally synchronized. Callers that share one bus
/// across threads must serialize access themselves (mutex or single-owner
/// task), since the wire has no notion of interleaved transactions.
pub trait SpiBus {
    /// Execute one bus transaction: transmit `tx`, then receive into `rx`.
    ///
    /// `rx` may be empty for write-only transactions.
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()>;
}

// Blanket impl so backends can be selected at runtime behind a trait object
impl SpiBus for Box<dyn SpiBus + Send> {
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        (**self).transfer(tx, rx)
    }
}
