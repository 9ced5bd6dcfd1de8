//! Outbound application events.
//!
//! Both services emit these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide where they go.

use core::fmt::Write as _;

use crate::control::consumption::UnitMode;
use crate::link::display::{DisplayError, DisplayReading};
use crate::link::report::ReportText;
use crate::sensors::PulseCounts;

/// Longest echo line the generator sends back.
pub type EchoText = heapless::String<64>;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    // ── Generator node ────────────────────────────────────
    /// A pulse command was processed; carries the resulting targets.
    Targets { speed_hz: u32, flow_hz: u32 },
    /// The mode-button trigger was asserted.
    TriggerFired { auto: bool },
    /// The trigger hold time elapsed and the line went low.
    TriggerReleased,
    /// A display reading was drawn and committed.
    DisplayShown(DisplayReading),
    /// A display line was rejected; the display is unchanged.
    DisplayRejected(DisplayError),

    // ── Measuring node ────────────────────────────────────
    /// The unit mode flipped and the smoothing filter was reset.
    ModeChanged(UnitMode),
    /// One sampling window was processed.
    Report(ReportData),
}

/// Everything computed for one sampling window.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportData {
    pub counts: PulseCounts,
    pub mode: UnitMode,
    /// Unfiltered consumption for this window.
    pub raw: f64,
    /// Moving average sent on the wire.
    pub smoothed: f64,
    /// Equivalent vehicle speed over the window (km/h).
    pub speed_kmh: f64,
    /// Equivalent fuel flow over the window (L/h).
    pub flow_lph: f64,
    pub text: ReportText,
}

impl AppEvent {
    /// Diagnostic line the generator echoes to its peer, if any.
    pub fn echo(&self) -> Option<EchoText> {
        let mut s = EchoText::new();
        match self {
            Self::Targets { speed_hz, flow_hz } => {
                let _ = write!(s, "Set -> Speed: {} Hz | Flow: {} Hz", speed_hz, flow_hz);
            }
            Self::TriggerFired { auto: false } => {
                let _ = s.push_str("Trigger fired");
            }
            Self::DisplayRejected(e) => {
                let _ = write!(s, "Display rejected: {}", e);
            }
            _ => return None,
        }
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_echo_text() {
        let e = AppEvent::Targets {
            speed_hz: 1500,
            flow_hz: 600,
        };
        assert_eq!(e.echo().unwrap().as_str(), "Set -> Speed: 1500 Hz | Flow: 600 Hz");
    }

    #[test]
    fn auto_trigger_is_not_echoed() {
        assert!(AppEvent::TriggerFired { auto: true }.echo().is_none());
        assert!(AppEvent::TriggerFired { auto: false }.echo().is_some());
        assert!(AppEvent::TriggerReleased.echo().is_none());
    }

    #[test]
    fn max_targets_fit_echo_buffer() {
        let e = AppEvent::Targets {
            speed_hz: u32::MAX,
            flow_hz: u32::MAX,
        };
        assert!(e.echo().unwrap().ends_with("4294967295 Hz"));
    }
}
