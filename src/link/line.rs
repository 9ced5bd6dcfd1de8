//! Newline framing for the serial link.
//!
//! Bytes are accumulated into a fixed-capacity buffer until `\n`.  A single
//! `read` may deliver part of a line or several lines, so the assembler
//! keeps its state between calls.
//!
//! - `\r` is dropped
//! - only printable ASCII (0x20..=0x7E) is kept
//! - a line longer than the buffer is discarded up to its newline
//! - empty lines produce nothing

use log::warn;

/// Longest line accepted, excluding the terminator.
pub const LINE_CAPACITY: usize = 64;

pub type Line = heapless::String<LINE_CAPACITY>;

#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: Line,
    overflowed: bool,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte.  Returns a completed line on `\n`.
    pub fn push(&mut self, byte: u8) -> Option<Line> {
        match byte {
            b'\n' => {
                if self.overflowed {
                    warn!("link: dropped line longer than {} bytes", LINE_CAPACITY);
                    self.overflowed = false;
                    self.buf.clear();
                    return None;
                }
                if self.buf.is_empty() {
                    return None;
                }
                Some(core::mem::take(&mut self.buf))
            }
            0x20..=0x7E => {
                if !self.overflowed && self.buf.push(byte as char).is_err() {
                    self.overflowed = true;
                }
                None
            }
            _ => None,
        }
    }

    /// Feed a chunk, invoking `on_line` for every completed line.
    pub fn feed(&mut self, bytes: &[u8], mut on_line: impl FnMut(&str)) {
        for &b in bytes {
            if let Some(line) = self.push(b) {
                on_line(&line);
            }
        }
    }

    /// Bytes buffered for the current, incomplete line.
    pub fn pending(&self) -> &str {
        &self.buf
    }
}
