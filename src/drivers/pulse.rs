//! Square-wave pulse channels for the signal generator node.
//!
//! Each [`PulseChannel`] owns one output pin and produces a 50 % duty
//! square wave at its target frequency.  [`PulseScheduler`] drives the
//! speed and flow channels from the cooperative main loop: `tick()` never
//! blocks, it only compares elapsed time against the half period.
//!
//! ## Timing
//!
//! Timestamps are microseconds truncated to `u32`, so they wrap roughly
//! every 71 minutes.  Elapsed time is always computed with
//! `wrapping_sub`, which stays correct across the wrap.

use embedded_hal::digital::OutputPin;
use log::debug;

const MICROS_PER_SEC: u64 = 1_000_000;

/// Which of the two simulated sensors a channel mimics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseKind {
    Speed,
    Flow,
}

/// Half of the period of `hz`, in microseconds.
///
/// Computed in 64 bits so `hz * 2` cannot overflow.  Frequencies above
/// 500 kHz yield 0, i.e. a toggle on every tick.
pub fn half_period_us(hz: u32) -> u32 {
    if hz == 0 {
        return 0;
    }
    (MICROS_PER_SEC / (u64::from(hz) * 2)) as u32
}

/// One square-wave output.
pub struct PulseChannel<P> {
    pin: P,
    target_hz: u32,
    last_toggle_us: u32,
    level: bool,
}

impl<P: OutputPin> PulseChannel<P> {
    /// Wrap an output pin.  The channel starts parked (0 Hz, low).
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            target_hz: 0,
            last_toggle_us: 0,
            level: false,
        }
    }

    pub fn target_hz(&self) -> u32 {
        self.target_hz
    }

    /// Current output level (`true` = high).
    pub fn level(&self) -> bool {
        self.level
    }

    /// Timestamp of the last edge this channel produced.
    pub fn last_toggle_us(&self) -> u32 {
        self.last_toggle_us
    }

    pub fn set_target_hz(&mut self, hz: u32) {
        self.target_hz = hz;
    }

    /// Advance the waveform to `now_us`.  Returns `true` if an edge was
    /// produced.
    ///
    /// A parked channel is forced low and its timestamp is left untouched.
    pub fn tick(&mut self, now_us: u32) -> Result<bool, P::Error> {
        if self.target_hz == 0 {
            self.level = false;
            self.pin.set_low()?;
            return Ok(false);
        }

        let half = half_period_us(self.target_hz);
        if now_us.wrapping_sub(self.last_toggle_us) < half {
            return Ok(false);
        }

        self.level = !self.level;
        if self.level {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.last_toggle_us = now_us;
        Ok(true)
    }
}

/// Drives the speed and flow channels from the main loop.
pub struct PulseScheduler<P> {
    speed: PulseChannel<P>,
    flow: PulseChannel<P>,
}

impl<P: OutputPin> PulseScheduler<P> {
    pub fn new(speed_pin: P, flow_pin: P) -> Self {
        Self {
            speed: PulseChannel::new(speed_pin),
            flow: PulseChannel::new(flow_pin),
        }
    }

    pub fn channel(&self, kind: PulseKind) -> &PulseChannel<P> {
        match kind {
            PulseKind::Speed => &self.speed,
            PulseKind::Flow => &self.flow,
        }
    }

    /// Current `(speed, flow)` targets in Hz.
    pub fn targets(&self) -> (u32, u32) {
        (self.speed.target_hz(), self.flow.target_hz())
    }

    /// Set a channel's target frequency.
    ///
    /// Negative values are ignored (the channel keeps its target), as are
    /// values that do not fit in a `u32`.  `0` parks the channel low on the
    /// next tick.  Returns `true` if the target was accepted.
    pub fn set_target(&mut self, kind: PulseKind, hz: i64) -> bool {
        let Ok(hz) = u32::try_from(hz) else {
            debug!("pulse: ignoring {:?} target {}", kind, hz);
            return false;
        };
        match kind {
            PulseKind::Speed => self.speed.set_target_hz(hz),
            PulseKind::Flow => self.flow.set_target_hz(hz),
        }
        true
    }

    /// Advance both channels.  Call at least twice per period of the
    /// fastest configured frequency.
    pub fn tick(&mut self, now_us: u32) -> Result<(), P::Error> {
        self.speed.tick(now_us)?;
        self.flow.tick(now_us)?;
        Ok(())
    }
}
