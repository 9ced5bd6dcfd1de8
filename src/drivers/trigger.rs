//! Momentary trigger output that presses the meter's mode button.
//!
//! ## State machine
//!
//! | State    | Event                           | Next     | Pin  |
//! |----------|---------------------------------|----------|------|
//! | Idle     | `fire()`                        | Asserted | HIGH |
//! | Asserted | `fire()`                        | Asserted | HIGH (window restarts) |
//! | Asserted | `poll()` with held > hold_ms    | Idle     | LOW  |
//!
//! Release is a non-blocking poll from the main loop, never a timer
//! interrupt.  An auto-repeat timer re-fires the trigger on a fixed
//! period independently of any command.

use embedded_hal::digital::OutputPin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    Asserted { since_ms: u32 },
}

pub struct TriggerChannel<P> {
    pin: P,
    state: TriggerState,
    hold_ms: u32,
    last_auto_fire_ms: u32,
}

impl<P: OutputPin> TriggerChannel<P> {
    pub fn new(pin: P, hold_ms: u32) -> Self {
        Self {
            pin,
            state: TriggerState::Idle,
            hold_ms,
            last_auto_fire_ms: 0,
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, TriggerState::Asserted { .. })
    }

    /// Assert the output.  Firing while already asserted restarts the
    /// assertion window.
    pub fn fire(&mut self, now_ms: u32) -> Result<(), P::Error> {
        self.pin.set_high()?;
        self.state = TriggerState::Asserted { since_ms: now_ms };
        Ok(())
    }

    /// Release the output once the hold time has strictly elapsed.
    /// Returns `true` exactly once per assertion.
    pub fn poll(&mut self, now_ms: u32) -> Result<bool, P::Error> {
        let TriggerState::Asserted { since_ms } = self.state else {
            return Ok(false);
        };
        if now_ms.wrapping_sub(since_ms) <= self.hold_ms {
            return Ok(false);
        }
        self.pin.set_low()?;
        self.state = TriggerState::Idle;
        Ok(true)
    }

    /// Fire automatically once more than `interval_ms` has passed since the
    /// previous automatic fire.  Returns `true` when it fired.
    pub fn update_auto_toggle(&mut self, now_ms: u32, interval_ms: u32) -> Result<bool, P::Error> {
        if now_ms.wrapping_sub(self.last_auto_fire_ms) <= interval_ms {
            return Ok(false);
        }
        self.last_auto_fire_ms = now_ms;
        self.fire(now_ms)?;
        Ok(true)
    }
}
