//! Display commands received by the generator node.
//!
//! A display line is the measuring node's report echoed back: a unit
//! marker followed by a value in `[0, 99.9]`.  Accepted readings become
//! four glyphs for the 4-digit segment display:
//!
//! ```text
//!   "L07.5"  →  [0:'L'] [1:'0'] [2:'7'.] [3:'5']
//! ```
//!
//! Anything else is rejected and the display keeps what it shows.

use core::fmt::{self, Write as _};

use crate::app::ports::DisplayPort;
use crate::control::consumption::UnitMode;

/// Highest value the display accepts.
pub const DISPLAY_MAX: f64 = 99.9;

/// Number of digit positions on the display.
pub const DISPLAY_DIGITS: usize = 4;

/// A validated reading to show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayReading {
    pub mode: UnitMode,
    pub value: f64,
}

/// One drawing command for the segment display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub position: u8,
    pub ch: char,
    pub dot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// The line does not start with `L` or `G`.
    UnknownUnit(char),
    /// Nothing follows the unit marker.
    Empty,
    /// The remainder is not a finite number.
    NotANumber,
    /// The number is outside `[0, 99.9]`.
    OutOfRange,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownUnit(c) => write!(f, "unknown unit marker {c:?}"),
            Self::Empty => write!(f, "missing value"),
            Self::NotANumber => write!(f, "value is not a number"),
            Self::OutOfRange => write!(f, "value outside 0..={DISPLAY_MAX}"),
        }
    }
}

/// Validate a display line.
pub fn parse_display(line: &str) -> Result<DisplayReading, DisplayError> {
    let mut chars = line.chars();
    let marker = chars.next().ok_or(DisplayError::Empty)?;
    let mode = UnitMode::from_marker(marker).ok_or(DisplayError::UnknownUnit(marker))?;

    let rest = chars.as_str().trim();
    if rest.is_empty() {
        return Err(DisplayError::Empty);
    }
    let value: f64 = rest.parse().map_err(|_| DisplayError::NotANumber)?;
    if !value.is_finite() {
        return Err(DisplayError::NotANumber);
    }
    if !(0.0..=DISPLAY_MAX).contains(&value) {
        return Err(DisplayError::OutOfRange);
    }
    // abs() folds "-0" into 0 so it never renders as "-0.0".
    Ok(DisplayReading {
        mode,
        value: value.abs(),
    })
}

impl DisplayReading {
    /// Lay the reading out as glyphs: the unit marker, then the value as
    /// `00.0` with the decimal point attached to the preceding digit.
    pub fn glyphs(&self) -> heapless::Vec<Glyph, DISPLAY_DIGITS> {
        let mut text: heapless::String<8> = heapless::String::new();
        // Range-checked value always renders as exactly "dd.d".
        let _ = write!(text, "{:04.1}", self.value);

        let mut out: heapless::Vec<Glyph, DISPLAY_DIGITS> = heapless::Vec::new();
        let _ = out.push(Glyph {
            position: 0,
            ch: self.mode.marker(),
            dot: false,
        });
        for c in text.chars() {
            if c == '.' {
                if let Some(prev) = out.last_mut() {
                    prev.dot = true;
                }
                continue;
            }
            let position = out.len() as u8;
            if out.push(Glyph { position, ch: c, dot: false }).is_err() {
                break;
            }
        }
        out
    }

    /// Draw every glyph and commit the frame.
    pub fn render<D: DisplayPort>(&self, display: &mut D) {
        for g in self.glyphs() {
            display.draw(g.position, g.ch, g.dot);
        }
        display.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_reading_layout() {
        let r = parse_display("L07.5").unwrap();
        let g = r.glyphs();
        let chars: Vec<(char, bool)> = g.iter().map(|g| (g.ch, g.dot)).collect();
        assert_eq!(chars, [('L', false), ('0', false), ('7', true), ('5', false)]);
        assert!(g.iter().enumerate().all(|(i, g)| g.position as usize == i));
    }

    #[test]
    fn imperial_reading_pads_and_rounds() {
        let r = parse_display("G2.64").unwrap();
        assert_eq!(r.mode, UnitMode::Imperial);
        let s: String = r.glyphs().iter().map(|g| g.ch).collect();
        assert_eq!(s, "G026");
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(parse_display("L0").is_ok());
        assert!(parse_display("L99.9").is_ok());
        assert_eq!(parse_display("L99.95"), Err(DisplayError::OutOfRange));
        assert_eq!(parse_display("L-0.1"), Err(DisplayError::OutOfRange));
    }

    #[test]
    fn negative_zero_shows_as_zero() {
        let r = parse_display("L-0").unwrap();
        let s: String = r.glyphs().iter().map(|g| g.ch).collect();
        assert_eq!(s, "L000");
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_display("X07.5"), Err(DisplayError::UnknownUnit('X')));
        assert_eq!(parse_display("L"), Err(DisplayError::Empty));
        assert_eq!(parse_display(""), Err(DisplayError::Empty));
        assert_eq!(parse_display("Labc"), Err(DisplayError::NotANumber));
        assert_eq!(parse_display("Linf"), Err(DisplayError::NotANumber));
        assert_eq!(parse_display("LNaN"), Err(DisplayError::NotANumber));
    }
}
