//! Inbound commands to the signal generator.
//!
//! Produced by [`link::command::parse_line`](crate::link::command::parse_line)
//! from serial lines and interpreted by
//! [`SignalGenerator`](super::generator::SignalGenerator).

use crate::link::display::{DisplayError, DisplayReading};

/// Commands the measuring node (or a host terminal) can send.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorCommand {
    /// Press the mode button now.
    FireTrigger,

    /// New pulse targets as parsed.  Negative values are carried through
    /// so the scheduler can reject them per channel.
    SetTargets { speed_hz: i64, flow_hz: i64 },

    /// Show a reading on the display.
    Show(DisplayReading),

    /// A display line that failed validation.
    DisplayRejected(DisplayError),

    /// Neither a trigger nor a complete `S…F…` pair.
    Unrecognised,
}
