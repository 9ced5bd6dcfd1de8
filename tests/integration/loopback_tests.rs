//! Both nodes wired together in virtual time: the meter's drive command
//! sets the generator, the generator's pulses are counted back, and the
//! meter's report lands on the generator's display.

use fuelmeter::adapters::sim_pin::SimPin;
use fuelmeter::app::generator::SignalGenerator;
use fuelmeter::app::meter::FuelMeter;
use fuelmeter::app::ports::SerialLink;
use fuelmeter::config::{MeterConfig, SimConfig};
use fuelmeter::control::frequency;
use fuelmeter::link::report::format_report_line;
use fuelmeter::sensors::PulseSampler;

use crate::mock_hw::{LoopbackLink, MockDisplay, RecordingSink};

const STEP_US: u32 = 10;

#[test]
fn driven_consumption_is_measured_back() {
    let meter_cfg = MeterConfig::default();
    let sim_cfg = SimConfig {
        auto_toggle_interval_ms: 0,
        ..SimConfig::default()
    };

    // 80 km/h burning 20 L/h is 25 L/100 km.
    let plan = frequency::plan(
        80.0,
        20.0,
        &meter_cfg.sensor,
        meter_cfg.sample_window_secs(),
        meter_cfg.min_pulses_per_sample,
    );

    let speed_pin = SimPin::new("speed");
    let flow_pin = SimPin::new("flow");
    let sampler = PulseSampler::new(speed_pin.rises(), flow_pin.rises());
    let mut generator = SignalGenerator::new(&sim_cfg, speed_pin, flow_pin, SimPin::new("trigger"));
    let mut meter = FuelMeter::new(&meter_cfg);

    let mut link = LoopbackLink::default();
    let mut display = MockDisplay::default();
    let mut sink = RecordingSink::new();

    let mut cmd = plan.command();
    cmd.push('\n').unwrap();
    link.push(cmd.as_bytes());

    let mut rx = [0u8; 16];
    let window_us = meter_cfg.sample_window_ms * 1000;
    let mut last_raw = Vec::new();
    let mut smoothed = 0.0;

    for window in 0..5u32 {
        let start = window * window_us;
        let mut t = start;
        while t < start + window_us {
            let n = link.read(&mut rx).unwrap();
            generator.feed(&rx[..n], t / 1000, &mut display, &mut sink).unwrap();
            generator.tick(t, t / 1000, &mut sink).unwrap();
            t += STEP_US;
        }

        let text = meter.cycle(false, sampler.sample_and_reset(), &mut sink);
        let report = sink
            .events
            .iter()
            .rev()
            .find_map(|e| match e {
                fuelmeter::app::events::AppEvent::Report(r) => Some(r.clone()),
                _ => None,
            })
            .unwrap();
        last_raw.push(report.raw);
        smoothed = report.smoothed;

        // Meter report goes back to the generator's display.
        link.push(format_report_line(meter.mode(), report.smoothed).as_bytes());
        assert_eq!(text, fuelmeter::link::report::format_report(meter.mode(), smoothed));
    }
    // Drain the final report.
    let n = link.read(&mut rx).unwrap();
    generator.feed(&rx[..n], 1_000, &mut display, &mut sink).unwrap();

    assert_eq!(generator.targets(), (plan.speed_hz, plan.flow_hz));
    for raw in &last_raw {
        assert!((23.5..=25.6).contains(raw), "window consumption {raw}");
    }
    assert!((smoothed - 24.9).abs() < 1.0, "smoothed {smoothed}");
    assert_eq!(display.commits, 5);
    assert!(display.last_frame().starts_with("L2"));
}
