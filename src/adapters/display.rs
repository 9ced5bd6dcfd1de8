//! Segment display adapter.
//!
//! The generator board has no panel driver of its own yet, so committed
//! frames are written to the log.  A hardware driver implements the same
//! [`DisplayPort`] and is swapped in at construction.

use log::info;

use crate::app::ports::DisplayPort;
use crate::link::display::DISPLAY_DIGITS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Cell {
    ch: char,
    dot: bool,
}

/// Buffers one frame and logs it on commit.
#[derive(Debug, Default)]
pub struct LogDisplay {
    cells: [Cell; DISPLAY_DIGITS],
    frames: u32,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last committed frame as text, dots inline (e.g. `"L07.5"`).
    pub fn frame(&self) -> heapless::String<{ DISPLAY_DIGITS * 2 }> {
        let mut s = heapless::String::new();
        for cell in &self.cells {
            let _ = s.push(if cell.ch == '\0' { ' ' } else { cell.ch });
            if cell.dot {
                let _ = s.push('.');
            }
        }
        s
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }
}

impl DisplayPort for LogDisplay {
    fn draw(&mut self, position: u8, ch: char, dot: bool) {
        if let Some(cell) = self.cells.get_mut(usize::from(position)) {
            *cell = Cell { ch, dot };
        }
    }

    fn commit(&mut self) {
        self.frames = self.frames.wrapping_add(1);
        info!("DISP | [{}]", self.frame());
    }
}
