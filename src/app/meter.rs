//! Fuel meter service: the measuring node's core.
//!
//! Once per sampling window the main loop hands [`FuelMeter::cycle`] the
//! mode-button level and the pulse counts drained from the edge counters.
//! The meter returns the report line to transmit.
//!
//! ```text
//!  button level ──▶ ModeToggle ──▶ UnitMode ─┐   (toggle resets filter)
//!                                            ▼
//!  PulseCounts ──▶ consumption ──▶ SmoothingFilter ──▶ format_report
//! ```

use log::info;

use crate::config::{MeterConfig, SensorConstants};
use crate::control::consumption::{ConsumptionConstants, UnitMode};
use crate::control::frequency;
use crate::control::smoothing::SmoothingFilter;
use crate::link::report::{self, ReportText};
use crate::sensors::PulseCounts;
use crate::sensors::mode_button::ModeToggle;

use super::events::{AppEvent, ReportData};
use super::ports::EventSink;

pub struct FuelMeter {
    constants: ConsumptionConstants,
    sensor: SensorConstants,
    window_secs: f64,
    mode: UnitMode,
    toggle: ModeToggle,
    filter: SmoothingFilter,
}

impl FuelMeter {
    /// Starts in metric mode with an empty filter.
    pub fn new(config: &MeterConfig) -> Self {
        Self {
            constants: ConsumptionConstants::derive(&config.sensor),
            sensor: config.sensor,
            window_secs: config.sample_window_secs(),
            mode: UnitMode::default(),
            toggle: ModeToggle::new(),
            filter: SmoothingFilter::new(),
        }
    }

    pub fn mode(&self) -> UnitMode {
        self.mode
    }

    pub fn constants(&self) -> &ConsumptionConstants {
        &self.constants
    }

    /// Feed the mode-button level.  On a rising edge the unit mode flips
    /// and the filter is emptied so units never mix in one average.
    pub fn poll_mode(&mut self, level: bool, sink: &mut impl EventSink) -> bool {
        if !self.toggle.update(level) {
            return false;
        }
        self.mode = self.mode.toggled();
        self.filter.reset();
        info!("METER | unit mode -> {:?}", self.mode);
        sink.emit(&AppEvent::ModeChanged(self.mode));
        true
    }

    /// Turn one window's counts into a smoothed, formatted report.
    pub fn process(&mut self, counts: PulseCounts, sink: &mut impl EventSink) -> ReportText {
        let raw = self
            .constants
            .consumption(counts.speed, counts.flow, self.mode);
        let smoothed = self.filter.apply(raw);
        let text = report::format_report(self.mode, smoothed);

        sink.emit(&AppEvent::Report(ReportData {
            counts,
            mode: self.mode,
            raw,
            smoothed,
            speed_kmh: frequency::speed_kmh(counts.speed, self.window_secs, &self.sensor),
            flow_lph: frequency::flow_lph(counts.flow, self.window_secs, &self.sensor),
            text: text.clone(),
        }));
        text
    }

    /// One full sampling cycle: mode poll first, then the report.
    pub fn cycle(&mut self, button_level: bool, counts: PulseCounts, sink: &mut impl EventSink) -> ReportText {
        self.poll_mode(button_level, sink);
        self.process(counts, sink)
    }
}
