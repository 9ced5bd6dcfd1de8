//! System configuration parameters
//!
//! All tunable parameters for both nodes.  The measuring node can load a
//! JSON override file; the generator node runs on defaults.

use serde::{Deserialize, Serialize};

use crate::pins;

/// Fixed sensor calibration and unit-conversion constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConstants {
    /// Flow sensor output (pulses per cm³ of fuel).
    pub flow_pulses_per_cm3: f64,
    /// Speed sensor output (pulses per mile travelled).
    pub speed_pulses_per_mile: f64,
    pub km_per_mile: f64,
    pub cm3_per_liter: f64,
    pub cm3_per_gallon: f64,
    /// Largest value the 4-digit display can show.
    pub max_consumption: f64,
}

impl Default for SensorConstants {
    fn default() -> Self {
        Self {
            flow_pulses_per_cm3: 12.0,
            speed_pulses_per_mile: 6000.0,
            km_per_mile: 1.609_344,
            cm3_per_liter: 1000.0,
            cm3_per_gallon: 3785.41,
            max_consumption: 99.9,
        }
    }
}

impl SensorConstants {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            self.flow_pulses_per_cm3,
            self.speed_pulses_per_mile,
            self.km_per_mile,
            self.cm3_per_liter,
            self.cm3_per_gallon,
            self.max_consumption,
        ];
        if positive.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ConfigError::ValidationFailed(
                "sensor constants must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Measuring-node configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    // --- Hardware ---
    /// GPIO character device path.
    pub gpio_chip: String,
    pub speed_line: u32,
    pub flow_line: u32,
    pub button_line: u32,

    // --- Serial ---
    pub serial_port: String,
    pub baud_rate: u32,
    /// Delay between attempts to (re)open the serial port (milliseconds).
    pub serial_retry_ms: u32,

    // --- Timing ---
    /// Pulse sampling window (milliseconds).  Pulse-to-rate conversions
    /// assume exactly this window.
    pub sample_window_ms: u32,

    // --- Emulator drive ---
    /// Minimum pulses the slower channel must deliver per window when the
    /// meter drives the generator with target values.
    pub min_pulses_per_sample: u32,

    pub sensor: SensorConstants,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            gpio_chip: pins::METER_GPIO_CHIP.into(),
            speed_line: pins::METER_SPEED_LINE,
            flow_line: pins::METER_FLOW_LINE,
            button_line: pins::METER_BUTTON_LINE,

            serial_port: pins::METER_SERIAL_PORT.into(),
            baud_rate: pins::LINK_BAUD_RATE,
            serial_retry_ms: 2000,

            sample_window_ms: 200,

            min_pulses_per_sample: 20,

            sensor: SensorConstants::default(),
        }
    }
}

impl MeterConfig {
    /// Reject values that would make the meter misbehave.  Invalid ranges
    /// are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_window_ms == 0 {
            return Err(ConfigError::ValidationFailed("sample_window_ms must be > 0"));
        }
        if self.serial_retry_ms == 0 {
            return Err(ConfigError::ValidationFailed("serial_retry_ms must be > 0"));
        }
        if self.baud_rate == 0 {
            return Err(ConfigError::ValidationFailed("baud_rate must be > 0"));
        }
        let lines = [self.speed_line, self.flow_line, self.button_line];
        if lines[0] == lines[1] || lines[0] == lines[2] || lines[1] == lines[2] {
            return Err(ConfigError::ValidationFailed("sensor lines must be distinct"));
        }
        self.sensor.validate()
    }

    /// Parse and validate a JSON document.  Missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn sample_window_secs(&self) -> f64 {
        f64::from(self.sample_window_ms) / 1000.0
    }
}

/// Generator-node configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// How long a fired trigger holds the button line high (milliseconds).
    pub trigger_hold_ms: u32,
    /// Period of the automatic mode-button press (milliseconds).  0 turns
    /// the automatic press off.
    pub auto_toggle_interval_ms: u32,
    pub baud_rate: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trigger_hold_ms: 200,
            auto_toggle_interval_ms: 10_000,
            baud_rate: pins::LINK_BAUD_RATE,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger_hold_ms == 0 {
            return Err(ConfigError::ValidationFailed("trigger_hold_ms must be > 0"));
        }
        if self.auto_toggle_interval_ms != 0 && self.auto_toggle_interval_ms <= self.trigger_hold_ms {
            return Err(ConfigError::ValidationFailed(
                "auto_toggle_interval_ms must exceed trigger_hold_ms",
            ));
        }
        Ok(())
    }
}

/// Errors from loading or validating configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document could not be deserialised.  Carries the parser's
    /// message, including line and column.
    Parse(String),
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid JSON: {}", msg),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
