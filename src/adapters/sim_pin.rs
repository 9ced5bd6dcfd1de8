//! Host-side output pin for running the generator without hardware.
//!
//! Tracks its level and counts rising edges into a shared
//! [`EdgeCounter`], so the simulation loop can report the frequency it
//! actually produced.

use std::sync::Arc;

use embedded_hal::digital::{ErrorType, OutputPin};
use log::trace;

use crate::sensors::edge_counter::EdgeCounter;

pub struct SimPin {
    name: &'static str,
    high: bool,
    rises: Arc<EdgeCounter>,
}

impl SimPin {
    pub fn new(name: &'static str) -> Self {
        Self::with_counter(name, Arc::new(EdgeCounter::new()))
    }

    pub fn with_counter(name: &'static str, rises: Arc<EdgeCounter>) -> Self {
        Self {
            name,
            high: false,
            rises,
        }
    }

    pub fn is_set_high(&self) -> bool {
        self.high
    }

    pub fn rises(&self) -> Arc<EdgeCounter> {
        Arc::clone(&self.rises)
    }
}

impl ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.high {
            trace!("PIN | {} low", self.name);
        }
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if !self.high {
            trace!("PIN | {} high", self.name);
            self.rises.record(1);
        }
        self.high = true;
        Ok(())
    }
}
