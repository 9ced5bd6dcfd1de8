//! Polled rising-edge detector for the unit-mode button.
//!
//! The button is sampled once per sampling window.  Human presses last far
//! longer than the poll interval, so remembering the previous level is
//! enough debouncing: only a low→high transition counts as a press.

#[derive(Debug, Default)]
pub struct ModeToggle {
    previous: bool,
}

impl ModeToggle {
    pub const fn new() -> Self {
        Self { previous: false }
    }

    /// Feed the current level.  Returns `true` on a low→high transition.
    pub fn update(&mut self, level: bool) -> bool {
        let pressed = level && !self.previous;
        self.previous = level;
        pressed
    }
}
