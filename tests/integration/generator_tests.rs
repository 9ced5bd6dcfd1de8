//! SignalGenerator integration tests: serial bytes in, pin activity and
//! echoes out.

use fuelmeter::app::events::AppEvent;
use fuelmeter::app::generator::SignalGenerator;
use fuelmeter::config::SimConfig;

use crate::mock_hw::{MockDisplay, MockPin, RecordingSink};

struct Rig {
    generator: SignalGenerator<MockPin>,
    speed: MockPin,
    flow: MockPin,
    trigger: MockPin,
    display: MockDisplay,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: &SimConfig) -> Self {
        let (speed, flow, trigger) = (MockPin::new(), MockPin::new(), MockPin::new());
        Self {
            generator: SignalGenerator::new(config, speed.clone(), flow.clone(), trigger.clone()),
            speed,
            flow,
            trigger,
            display: MockDisplay::default(),
            sink: RecordingSink::new(),
        }
    }

    /// Generator with the automatic press turned off.
    fn manual() -> Self {
        Self::new(&SimConfig {
            auto_toggle_interval_ms: 0,
            ..SimConfig::default()
        })
    }

    fn send(&mut self, bytes: &[u8], now_ms: u32) {
        self.generator
            .feed(bytes, now_ms, &mut self.display, &mut self.sink)
            .unwrap();
    }

    /// Tick every `step_us` from `from_us` up to (excluding) `to_us`.
    fn run_us(&mut self, from_us: u32, to_us: u32, step_us: u32) {
        let mut t = from_us;
        while t < to_us {
            self.generator.tick(t, t / 1000, &mut self.sink).unwrap();
            t += step_us;
        }
    }
}

// ── Pulse output ──────────────────────────────────────────────

#[test]
fn one_second_of_output_matches_targets() {
    let mut rig = Rig::manual();
    rig.send(b"S500F100\n", 0);
    rig.run_us(0, 1_000_000, 10);

    let speed = rig.speed.rises();
    let flow = rig.flow.rises();
    assert!((499..=501).contains(&speed), "speed rises {speed}");
    assert!((99..=101).contains(&flow), "flow rises {flow}");
}

#[test]
fn zero_target_parks_channel_low() {
    let mut rig = Rig::manual();
    rig.send(b"S1000F1000\n", 0);
    rig.run_us(0, 10_000, 10);
    assert!(rig.speed.rises() > 0);

    rig.send(b"S0F1000\n", 10);
    rig.run_us(10_000, 20_000, 10);
    assert!(!rig.speed.is_high());
    let parked_rises = rig.speed.rises();
    rig.run_us(20_000, 30_000, 10);
    assert_eq!(rig.speed.rises(), parked_rises);
    assert_eq!(rig.generator.targets(), (0, 1000));
}

// ── Command handling ──────────────────────────────────────────

#[test]
fn echo_follows_every_pulse_command() {
    let mut rig = Rig::manual();
    rig.send(b"S1500F600\nhello\nF1S2\n", 0);
    assert_eq!(
        rig.sink.echoes(),
        vec![
            "Set -> Speed: 1500 Hz | Flow: 600 Hz",
            "Set -> Speed: 1500 Hz | Flow: 600 Hz",
            "Set -> Speed: 1500 Hz | Flow: 600 Hz",
        ]
    );
}

#[test]
fn negative_value_only_affects_its_channel() {
    let mut rig = Rig::manual();
    rig.send(b"S100F200\nS-5F300\n", 0);
    assert_eq!(rig.generator.targets(), (100, 300));
}

#[test]
fn command_split_across_reads() {
    let mut rig = Rig::manual();
    rig.send(b"S12", 0);
    assert_eq!(rig.generator.targets(), (0, 0));
    rig.send(b"0F3\r\n", 1);
    assert_eq!(rig.generator.targets(), (120, 3));
}

#[test]
fn overlong_line_is_dropped_and_next_line_works() {
    let mut rig = Rig::manual();
    let mut junk = vec![b'S'; 200];
    junk.extend_from_slice(b"F9\nS1F2\n");
    rig.send(&junk, 0);
    assert_eq!(rig.generator.targets(), (1, 2));
    assert_eq!(rig.sink.echoes().len(), 1);
}

// ── Trigger ───────────────────────────────────────────────────

#[test]
fn trigger_holds_for_hold_time() {
    let mut rig = Rig::manual();
    rig.send(b"T\n", 5_000);
    assert!(rig.trigger.is_high());
    assert_eq!(rig.sink.echoes(), vec!["Trigger fired"]);

    rig.generator.tick(0, 5_200, &mut rig.sink).unwrap();
    assert!(rig.trigger.is_high());
    rig.generator.tick(0, 5_201, &mut rig.sink).unwrap();
    assert!(!rig.trigger.is_high());
}

#[test]
fn trigger_inside_frequency_line_does_not_change_targets() {
    let mut rig = Rig::manual();
    rig.send(b"S10F20\nS99TF99\n", 0);
    assert_eq!(rig.generator.targets(), (10, 20));
    assert!(rig.trigger.is_high());
}

#[test]
fn automatic_press_repeats_on_interval() {
    let config = SimConfig::default();
    let interval = config.auto_toggle_interval_ms;
    let mut rig = Rig::new(&config);

    let mut presses = 0;
    for ms in 0..=(3 * interval + 10) {
        rig.generator.tick(0, ms, &mut rig.sink).unwrap();
    }
    for e in &rig.sink.events {
        if *e == (AppEvent::TriggerFired { auto: true }) {
            presses += 1;
        }
    }
    assert_eq!(presses, 3);
    assert_eq!(rig.trigger.rises(), 3);
}

// ── Display ───────────────────────────────────────────────────

#[test]
fn display_line_draws_reading() {
    let mut rig = Rig::manual();
    rig.send(b"L07.5\n", 0);
    assert_eq!(rig.display.commits, 1);
    assert_eq!(rig.display.last_frame(), "L07.5");

    rig.send(b"G26.4\n", 0);
    assert_eq!(rig.display.commits, 2);
    assert_eq!(rig.display.last_frame(), "G26.4");
}

#[test]
fn invalid_display_line_keeps_previous_frame() {
    let mut rig = Rig::manual();
    rig.send(b"L07.5\nL120.0\nGabc\n", 0);
    assert_eq!(rig.display.commits, 1);
    assert_eq!(rig.display.last_frame(), "L07.5");
    let rejected = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::DisplayRejected(_)))
        .count();
    assert_eq!(rejected, 2);
    assert_eq!(rig.generator.targets(), (0, 0));
}
