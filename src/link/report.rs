//! Consumption report sent by the measuring node.
//!
//! Wire format, parsed positionally by the generator node:
//!
//! ```text
//! ┌──────┬──────────────┬────┐
//! │ unit │ value  dd.d  │ \n │
//! │ L/G  │ zero-padded  │    │
//! └──────┴──────────────┴────┘
//!   e.g. "L07.5\n"
//! ```

use core::fmt::Write as _;

use crate::control::consumption::UnitMode;
use crate::link::display::DISPLAY_MAX;

/// Report text plus terminator always fits.
pub type ReportText = heapless::String<8>;

/// Format a report without the trailing newline.
///
/// Values are clamped to the displayable range so the width never grows;
/// NaN reports as 0.
pub fn format_report(mode: UnitMode, value: f64) -> ReportText {
    let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, DISPLAY_MAX).abs() };
    let mut s = ReportText::new();
    let _ = write!(s, "{}{:04.1}", mode.marker(), value);
    s
}

/// Format a report including the `\n` terminator.
pub fn format_report_line(mode: UnitMode, value: f64) -> ReportText {
    let mut s = format_report(mode, value);
    let _ = s.push('\n');
    s
}
