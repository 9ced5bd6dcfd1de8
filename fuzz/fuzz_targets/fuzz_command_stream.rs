//! Fuzz target: serial bytes into `SignalGenerator::feed`
//!
//! Arbitrary byte streams (split at an arbitrary point to mimic partial
//! reads) must never panic, and the targets must always be whatever the
//! last accepted command left them at.
//!
//! cargo fuzz run fuzz_command_stream

#![no_main]

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use fuelmeter::app::events::AppEvent;
use fuelmeter::app::generator::SignalGenerator;
use fuelmeter::app::ports::{DisplayPort, EventSink};
use fuelmeter::config::SimConfig;
use libfuzzer_sys::fuzz_target;

struct Pin;

impl ErrorType for Pin {
    type Error = Infallible;
}

impl OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

struct NoDisplay;

impl DisplayPort for NoDisplay {
    fn draw(&mut self, position: u8, _ch: char, _dot: bool) {
        assert!(position < 4, "glyph outside the display");
    }
    fn commit(&mut self) {}
}

#[derive(Default)]
struct LastTargets(Option<(u32, u32)>);

impl EventSink for LastTargets {
    fn emit(&mut self, event: &AppEvent) {
        if let AppEvent::Targets { speed_hz, flow_hz } = event {
            self.0 = Some((*speed_hz, *flow_hz));
        }
        let _ = event.echo();
    }
}

fuzz_target!(|data: &[u8]| {
    let mut g = SignalGenerator::new(&SimConfig::default(), Pin, Pin, Pin);
    let mut sink = LastTargets::default();

    let split = data.first().map_or(0, |&b| usize::from(b)).min(data.len());
    let (a, b) = data.split_at(split);
    let _ = g.feed(a, 0, &mut NoDisplay, &mut sink);
    let _ = g.tick(0, 1, &mut sink);
    let _ = g.feed(b, 2, &mut NoDisplay, &mut sink);

    if let Some(last) = sink.0 {
        assert_eq!(last, g.targets());
    }
});
