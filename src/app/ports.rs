//! Port traits: the boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SignalGenerator / FuelMeter (domain)
//! ```
//!
//! Digital pins use the `embedded-hal` traits directly (`OutputPin` for the
//! generator's outputs, `InputPin` for the meter's mode button).  The
//! capabilities `embedded-hal` has no blocking equivalent for are defined
//! here.

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Edge source (driven adapter: hardware → edge counter)
// ───────────────────────────────────────────────────────────────

/// A GPIO line configured for rising-edge detection.
pub trait EdgeSource {
    type Error: core::fmt::Display;

    /// Consumer label of the line (e.g. `"speed_sensor"`), for diagnostics.
    fn label(&self) -> &'static str;

    /// Block until at least one rising edge arrives.
    ///
    /// Returns the number of edges delivered by this wake-up, or `None`
    /// once the source is closed for good.
    fn wait_for_edges(&mut self) -> Result<Option<u32>, Self::Error>;
}

// ───────────────────────────────────────────────────────────────
// Serial link (driven adapter: bytes ↔ peer node)
// ───────────────────────────────────────────────────────────────

/// Byte-oriented link to the other node.
pub trait SerialLink {
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes without blocking.
    /// Returns 0 if no data is available.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data`, returning the number of bytes accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → segment display)
// ───────────────────────────────────────────────────────────────

/// A 4-digit segment display.  Drawing is buffered until [`commit`].
///
/// [`commit`]: DisplayPort::commit
pub trait DisplayPort {
    /// Set the character at `position` (0 = leftmost), with or without the
    /// decimal point.
    fn draw(&mut self, position: u8, ch: char, dot: bool);

    /// Push the buffered frame to the panel.
    fn commit(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / echo)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.  Adapters
/// decide where they go (log, serial echo, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
