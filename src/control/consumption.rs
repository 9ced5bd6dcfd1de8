//! Fuel-consumption calculation from raw pulse counts.
//!
//! Both sensors are sampled over the same window, so the window length
//! cancels out: consumption is a fixed constant times `flow / speed`.
//!
//! - Metric:   litres per 100 km
//! - Imperial: gallons per 100 miles

use serde::{Deserialize, Serialize};

use crate::config::SensorConstants;

/// Display unit system, toggled by the mode button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitMode {
    #[default]
    Metric,
    Imperial,
}

impl UnitMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Metric => Self::Imperial,
            Self::Imperial => Self::Metric,
        }
    }

    /// Single-character unit marker used on the wire and the display.
    pub fn marker(self) -> char {
        match self {
            Self::Metric => 'L',
            Self::Imperial => 'G',
        }
    }

    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            'L' => Some(Self::Metric),
            'G' => Some(Self::Imperial),
            _ => None,
        }
    }
}

/// Scale factors derived once at startup from the sensor constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsumptionConstants {
    pub metric_k: f64,
    pub imperial_k: f64,
    pub max: f64,
}

impl ConsumptionConstants {
    pub fn derive(c: &SensorConstants) -> Self {
        let pulses_per_km = c.speed_pulses_per_mile / c.km_per_mile;
        let pulses_per_liter = c.flow_pulses_per_cm3 * c.cm3_per_liter;

        let pulses_per_mile = c.speed_pulses_per_mile;
        let pulses_per_gallon = c.flow_pulses_per_cm3 * c.cm3_per_gallon;

        Self {
            metric_k: pulses_per_km / pulses_per_liter * 100.0,
            imperial_k: pulses_per_mile / pulses_per_gallon * 100.0,
            max: c.max_consumption,
        }
    }

    pub fn k(&self, mode: UnitMode) -> f64 {
        match mode {
            UnitMode::Metric => self.metric_k,
            UnitMode::Imperial => self.imperial_k,
        }
    }

    /// Consumption for one window of pulse counts, clamped to the display
    /// maximum.  Zero speed pulses (vehicle stopped) reports 0.
    pub fn consumption(&self, speed_pulses: u32, flow_pulses: u32, mode: UnitMode) -> f64 {
        if speed_pulses == 0 {
            return 0.0;
        }
        let value = self.k(mode) * f64::from(flow_pulses) / f64::from(speed_pulses);
        value.min(self.max)
    }
}

impl Default for ConsumptionConstants {
    fn default() -> Self {
        Self::derive(&SensorConstants::default())
    }
}
