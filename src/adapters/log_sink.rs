//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (ESP-IDF logger on the device, `env_logger` on hosts).

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Targets { speed_hz, flow_hz } => {
                info!("SET | speed={}Hz flow={}Hz", speed_hz, flow_hz);
            }
            AppEvent::TriggerFired { auto } => {
                info!("TRIG | fired{}", if *auto { " (auto)" } else { "" });
            }
            AppEvent::TriggerReleased => {
                debug!("TRIG | released");
            }
            AppEvent::DisplayShown(r) => {
                info!("DISP | {}{:04.1}", r.mode.marker(), r.value);
            }
            AppEvent::DisplayRejected(e) => {
                warn!("DISP | rejected: {}", e);
            }
            AppEvent::ModeChanged(mode) => {
                info!("MODE | {:?}", mode);
            }
            AppEvent::Report(r) => {
                info!(
                    "REPORT | {} | pulses speed={} flow={} | raw={:.3} avg={:.3} | \
                     {:.1}km/h {:.2}L/h",
                    r.text,
                    r.counts.speed,
                    r.counts.flow,
                    r.raw,
                    r.smoothed,
                    r.speed_kmh,
                    r.flow_lph,
                );
            }
        }
    }
}
