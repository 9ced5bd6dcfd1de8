//! Signal generator service: the generator node's core.
//!
//! [`SignalGenerator`] owns both pulse channels, the trigger output and the
//! inbound line assembler.  The main loop calls [`tick`] as often as it can
//! and hands it every byte read from the serial link via [`feed`].
//!
//! ```text
//!  serial bytes ──▶ LineAssembler ──▶ parse_line ──▶ handle_command
//!                                                        │
//!         ┌──────────────────────────────────────────────┤
//!         ▼                   ▼                          ▼
//!   PulseScheduler      TriggerChannel              DisplayPort
//!   (speed, flow)       (mode button)
//! ```
//!
//! [`tick`]: SignalGenerator::tick
//! [`feed`]: SignalGenerator::feed

use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use crate::config::SimConfig;
use crate::drivers::pulse::{PulseKind, PulseScheduler};
use crate::drivers::trigger::TriggerChannel;
use crate::link::command::parse_line;
use crate::link::line::LineAssembler;

use super::commands::GeneratorCommand;
use super::events::AppEvent;
use super::ports::{DisplayPort, EventSink};

pub struct SignalGenerator<P> {
    pulses: PulseScheduler<P>,
    trigger: TriggerChannel<P>,
    line: LineAssembler,
    auto_toggle_interval_ms: u32,
}

impl<P: OutputPin> SignalGenerator<P> {
    /// Both channels start parked with their pins low.
    pub fn new(config: &SimConfig, speed_pin: P, flow_pin: P, trigger_pin: P) -> Self {
        Self {
            pulses: PulseScheduler::new(speed_pin, flow_pin),
            trigger: TriggerChannel::new(trigger_pin, config.trigger_hold_ms),
            line: LineAssembler::new(),
            auto_toggle_interval_ms: config.auto_toggle_interval_ms,
        }
    }

    pub fn targets(&self) -> (u32, u32) {
        self.pulses.targets()
    }

    pub fn pulses(&self) -> &PulseScheduler<P> {
        &self.pulses
    }

    pub fn trigger(&self) -> &TriggerChannel<P> {
        &self.trigger
    }

    // ── Per-iteration work ────────────────────────────────────

    /// Advance both pulse channels, release the trigger once its hold time
    /// has elapsed and fire the periodic auto-toggle.
    pub fn tick(&mut self, now_us: u32, now_ms: u32, sink: &mut impl EventSink) -> Result<(), P::Error> {
        self.pulses.tick(now_us)?;

        if self.trigger.poll(now_ms)? {
            sink.emit(&AppEvent::TriggerReleased);
        }
        if self.auto_toggle_interval_ms > 0
            && self
                .trigger
                .update_auto_toggle(now_ms, self.auto_toggle_interval_ms)?
        {
            sink.emit(&AppEvent::TriggerFired { auto: true });
        }
        Ok(())
    }

    // ── Inbound serial ────────────────────────────────────────

    /// Assemble `bytes` into lines and execute each complete one.
    pub fn feed(
        &mut self,
        bytes: &[u8],
        now_ms: u32,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) -> Result<(), P::Error> {
        for &b in bytes {
            if let Some(line) = self.line.push(b) {
                debug!("SIM | line {:?}", line.as_str());
                let cmd = parse_line(&line);
                self.handle_command(cmd, now_ms, display, sink)?;
            }
        }
        Ok(())
    }

    /// Execute one parsed command.
    pub fn handle_command(
        &mut self,
        cmd: GeneratorCommand,
        now_ms: u32,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) -> Result<(), P::Error> {
        match cmd {
            GeneratorCommand::FireTrigger => {
                self.trigger.fire(now_ms)?;
                sink.emit(&AppEvent::TriggerFired { auto: false });
            }
            GeneratorCommand::SetTargets { speed_hz, flow_hz } => {
                if !self.pulses.set_target(PulseKind::Speed, speed_hz) {
                    warn!("SIM | speed target {} rejected", speed_hz);
                }
                if !self.pulses.set_target(PulseKind::Flow, flow_hz) {
                    warn!("SIM | flow target {} rejected", flow_hz);
                }
                self.emit_targets(sink);
            }
            GeneratorCommand::Show(reading) => {
                reading.render(display);
                sink.emit(&AppEvent::DisplayShown(reading));
            }
            GeneratorCommand::DisplayRejected(e) => {
                sink.emit(&AppEvent::DisplayRejected(e));
            }
            GeneratorCommand::Unrecognised => {
                // Still echo so the sender sees the unchanged state.
                self.emit_targets(sink);
            }
        }
        Ok(())
    }

    fn emit_targets(&self, sink: &mut impl EventSink) {
        let (speed_hz, flow_hz) = self.pulses.targets();
        sink.emit(&AppEvent::Targets { speed_hz, flow_hz });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct Pin {
        high: bool,
    }

    impl ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Frames(Vec<(u8, char, bool)>, usize);

    impl DisplayPort for Frames {
        fn draw(&mut self, position: u8, ch: char, dot: bool) {
            self.0.push((position, ch, dot));
        }
        fn commit(&mut self) {
            self.1 += 1;
        }
    }

    #[derive(Default)]
    struct Recorder(Vec<AppEvent>);

    impl EventSink for Recorder {
        fn emit(&mut self, event: &AppEvent) {
            self.0.push(event.clone());
        }
    }

    fn generator() -> SignalGenerator<Pin> {
        let cfg = SimConfig {
            auto_toggle_interval_ms: 0,
            ..SimConfig::default()
        };
        SignalGenerator::new(&cfg, Pin::default(), Pin::default(), Pin::default())
    }

    #[test]
    fn set_command_updates_targets_and_echoes() {
        let mut g = generator();
        let mut d = Frames::default();
        let mut sink = Recorder::default();
        g.feed(b"S1500F600\n", 0, &mut d, &mut sink).unwrap();
        assert_eq!(g.targets(), (1500, 600));
        assert_eq!(
            sink.0,
            vec![AppEvent::Targets {
                speed_hz: 1500,
                flow_hz: 600
            }]
        );
    }

    #[test]
    fn unrecognised_line_echoes_unchanged_targets() {
        let mut g = generator();
        let mut d = Frames::default();
        let mut sink = Recorder::default();
        g.feed(b"S10F20\nS99\n", 0, &mut d, &mut sink).unwrap();
        assert_eq!(g.targets(), (10, 20));
        assert_eq!(sink.0.len(), 2);
        assert_eq!(sink.0[0], sink.0[1]);
    }

    #[test]
    fn trigger_command_asserts_then_releases() {
        let mut g = generator();
        let mut d = Frames::default();
        let mut sink = Recorder::default();
        g.feed(b"T\n", 1_000, &mut d, &mut sink).unwrap();
        assert!(g.trigger().is_active());
        g.tick(0, 1_200, &mut sink).unwrap();
        assert!(g.trigger().is_active());
        g.tick(0, 1_201, &mut sink).unwrap();
        assert!(!g.trigger().is_active());
        assert_eq!(
            sink.0,
            vec![AppEvent::TriggerFired { auto: false }, AppEvent::TriggerReleased]
        );
    }

    #[test]
    fn display_line_renders_and_commits() {
        let mut g = generator();
        let mut d = Frames::default();
        let mut sink = Recorder::default();
        g.feed(b"G12.3\n", 0, &mut d, &mut sink).unwrap();
        assert_eq!(d.1, 1);
        assert_eq!(d.0.len(), 4);
        assert!(matches!(sink.0[0], AppEvent::DisplayShown(_)));
        assert_eq!(g.targets(), (0, 0));
    }

    #[test]
    fn bad_display_line_leaves_display_untouched() {
        let mut g = generator();
        let mut d = Frames::default();
        let mut sink = Recorder::default();
        g.feed(b"Lxyz\n", 0, &mut d, &mut sink).unwrap();
        assert_eq!(d.1, 0);
        assert!(matches!(sink.0[0], AppEvent::DisplayRejected(_)));
    }

    #[test]
    fn auto_toggle_fires_periodically() {
        let cfg = SimConfig::default();
        let interval = cfg.auto_toggle_interval_ms;
        let mut g = SignalGenerator::new(&cfg, Pin::default(), Pin::default(), Pin::default());
        let mut sink = Recorder::default();
        g.tick(0, interval, &mut sink).unwrap();
        assert!(sink.0.is_empty());
        g.tick(0, interval + 1, &mut sink).unwrap();
        assert_eq!(sink.0, vec![AppEvent::TriggerFired { auto: true }]);
    }
}
