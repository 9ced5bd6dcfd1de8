//! Measuring-node integration tests: edge sources through the sampler and
//! meter to report text.

use std::sync::Arc;

use embedded_hal::digital::InputPin;
use fuelmeter::app::events::AppEvent;
use fuelmeter::app::meter::FuelMeter;
use fuelmeter::config::MeterConfig;
use fuelmeter::control::consumption::UnitMode;
use fuelmeter::link::display::parse_display;
use fuelmeter::sensors::edge_counter::{EdgeCounter, count_edges, spawn_edge_thread};
use fuelmeter::sensors::{PulseCounts, PulseSampler};

use crate::mock_hw::{RecordingSink, ScriptedButton, ScriptedEdges};

fn sampler() -> (Arc<EdgeCounter>, Arc<EdgeCounter>, PulseSampler) {
    let speed = Arc::new(EdgeCounter::new());
    let flow = Arc::new(EdgeCounter::new());
    let s = PulseSampler::new(Arc::clone(&speed), Arc::clone(&flow));
    (speed, flow, s)
}

#[test]
fn scripted_edges_reach_the_report() {
    let (speed, flow, sampler) = sampler();
    count_edges(&mut ScriptedEdges::new("speed_sensor", &[40, 60]), &speed);
    count_edges(&mut ScriptedEdges::new("flow_sensor", &[5, 5, 10]), &flow);

    let mut meter = FuelMeter::new(&MeterConfig::default());
    let mut sink = RecordingSink::new();
    let text = meter.cycle(false, sampler.sample_and_reset(), &mut sink);
    assert_eq!(text.as_str(), "L06.2");
    assert_eq!(sampler.sample_and_reset(), PulseCounts::default());
}

#[test]
fn edge_threads_finish_when_sources_close() {
    let (speed, flow, sampler) = sampler();
    let a = spawn_edge_thread(ScriptedEdges::new("speed_sensor", &[1; 250]), speed).unwrap();
    let b = spawn_edge_thread(ScriptedEdges::new("flow_sensor", &[2; 25]), flow).unwrap();
    a.join().unwrap();
    b.join().unwrap();
    assert_eq!(sampler.sample_and_reset(), PulseCounts { speed: 250, flow: 50 });
}

#[test]
fn button_sequence_toggles_on_rising_edges_only() {
    let mut button = ScriptedButton::new(&[false, false, true, true, false, true]);
    let mut meter = FuelMeter::new(&MeterConfig::default());
    let mut sink = RecordingSink::new();

    let mut modes = Vec::new();
    for _ in 0..6 {
        let level = button.is_high().unwrap();
        meter.cycle(level, PulseCounts { speed: 100, flow: 20 }, &mut sink);
        modes.push(meter.mode());
    }
    use UnitMode::{Imperial, Metric};
    assert_eq!(modes, [Metric, Metric, Imperial, Imperial, Imperial, Metric]);

    let changes: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ModeChanged(m) => Some(*m),
            _ => None,
        })
        .collect();
    assert_eq!(changes, [Imperial, Metric]);
}

#[test]
fn mode_switch_never_mixes_units_in_average() {
    let mut meter = FuelMeter::new(&MeterConfig::default());
    let mut sink = RecordingSink::new();
    for _ in 0..5 {
        meter.cycle(false, PulseCounts { speed: 100, flow: 20 }, &mut sink);
    }
    let text = meter.cycle(true, PulseCounts { speed: 100, flow: 20 }, &mut sink);
    // A single imperial sample; stale metric values would pull this up.
    assert_eq!(text.as_str(), "G02.6");
}

#[test]
fn every_report_is_accepted_by_the_display() {
    let mut meter = FuelMeter::new(&MeterConfig::default());
    let mut sink = RecordingSink::new();
    let samples = [(0, 0), (1, 1000), (100, 20), (5000, 1), (3, 0), (u32::MAX, u32::MAX)];
    for (speed, flow) in samples {
        let text = meter.cycle(false, PulseCounts { speed, flow }, &mut sink);
        assert_eq!(text.len(), 5, "{text}");
        parse_display(&text).unwrap();
    }
}

#[test]
fn saturated_consumption_reports_display_max() {
    let mut meter = FuelMeter::new(&MeterConfig::default());
    let mut sink = RecordingSink::new();
    let text = meter.cycle(false, PulseCounts { speed: 1, flow: 1000 }, &mut sink);
    assert_eq!(text.as_str(), "L99.9");
}

#[test]
fn json_config_changes_window_for_rates() {
    let config = MeterConfig::from_json(r#"{ "sample_window_ms": 1000 }"#).unwrap();
    let mut meter = FuelMeter::new(&config);
    let mut sink = RecordingSink::new();
    meter.cycle(false, PulseCounts { speed: 0, flow: 200 }, &mut sink);
    let AppEvent::Report(r) = &sink.events[0] else {
        panic!("expected report");
    };
    // 200 pulses/s → 16.67 cm³/s → 60 L/h
    assert!((r.flow_lph - 60.0).abs() < 1e-9);
    assert_eq!(r.raw, 0.0);
}
