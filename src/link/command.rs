//! Text commands accepted by the signal generator node.
//!
//! ```text
//!   T            fire the mode-button trigger ('T' anywhere wins)
//!   S<n>F<m>     speed target n Hz, flow target m Hz
//!   L07.5        show a metric reading on the display
//!   G02.6        show an imperial reading on the display
//! ```
//!
//! Integers are read the way C's `atol` reads them: leading whitespace,
//! optional sign, digits up to the first non-digit.  No digits reads as 0,
//! so `SxF5` resets the speed channel.  Negative values are passed through
//! and rejected by the scheduler, leaving that channel unchanged.

use crate::app::commands::GeneratorCommand;
use crate::link::display;

/// Classify and parse one inbound line.
pub fn parse_line(line: &str) -> GeneratorCommand {
    match line.chars().next() {
        Some('L' | 'G') => match display::parse_display(line) {
            Ok(reading) => GeneratorCommand::Show(reading),
            Err(e) => GeneratorCommand::DisplayRejected(e),
        },
        _ => parse_pulse_command(line),
    }
}

/// Parse a trigger or frequency command.
pub fn parse_pulse_command(line: &str) -> GeneratorCommand {
    if line.contains('T') {
        return GeneratorCommand::FireTrigger;
    }

    let (Some(s), Some(f)) = (line.find('S'), line.find('F')) else {
        return GeneratorCommand::Unrecognised;
    };
    // `F10S20` is ignored rather than read with the bounds swapped.
    if f < s {
        return GeneratorCommand::Unrecognised;
    }

    GeneratorCommand::SetTargets {
        speed_hz: parse_leading_int(&line[s + 1..f]),
        flow_hz: parse_leading_int(&line[f + 1..]),
    }
}

/// `atol`-style integer prefix parse.  Saturates instead of overflowing.
pub fn parse_leading_int(text: &str) -> i64 {
    let s = text.trim_start_matches([' ', '\t', '\x0b', '\x0c']);
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for d in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(d - b'0'));
    }
    if negative { -value } else { value }
}
