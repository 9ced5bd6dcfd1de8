//! Sensor subsystem: edge counters and the aggregating [`PulseSampler`].
//!
//! The sampler owns a handle to each channel's [`EdgeCounter`] and produces
//! a [`PulseCounts`] snapshot once per sampling window.

pub mod edge_counter;
pub mod mode_button;

use std::sync::Arc;

use edge_counter::EdgeCounter;

/// Pulses counted on each channel during one sampling window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PulseCounts {
    pub speed: u32,
    pub flow: u32,
}

/// Reads and resets both edge counters once per window.
pub struct PulseSampler {
    speed: Arc<EdgeCounter>,
    flow: Arc<EdgeCounter>,
}

impl PulseSampler {
    pub fn new(speed: Arc<EdgeCounter>, flow: Arc<EdgeCounter>) -> Self {
        Self { speed, flow }
    }

    /// Swap both counters to zero and return what they held.
    ///
    /// Each counter is reset atomically on its own; the two resets are not
    /// synchronised with each other.
    pub fn sample_and_reset(&self) -> PulseCounts {
        PulseCounts {
            speed: self.speed.take(),
            flow: self.flow.take(),
        }
    }
}
