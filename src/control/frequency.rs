//! Conversions between physical driving values and sensor pulse rates.
//!
//! [`plan`] turns a target speed (km/h) and fuel flow (L/h) into the pair
//! of frequencies the generator node should emit.  Realistic rates can be
//! too low to give a stable count in one sampling window, so both rates
//! are multiplied by the same integer scale until the slower one reaches
//! the stability floor.  Consumption depends only on the flow:speed
//! ratio, which scaling preserves.
//!
//! [`speed_kmh`] / [`flow_lph`] are the inverse, used for diagnostics on
//! the measuring node.

use core::fmt::Write as _;

use crate::config::SensorConstants;

const SECS_PER_HOUR: f64 = 3600.0;

/// Frequencies to command on the generator node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyPlan {
    /// Unscaled speed-sensor rate for the target speed.
    pub calc_speed_hz: f64,
    /// Unscaled flow-sensor rate for the target fuel flow.
    pub calc_flow_hz: f64,
    /// Integer multiplier applied to both rates.
    pub scale: u32,
    pub speed_hz: u32,
    pub flow_hz: u32,
}

impl FrequencyPlan {
    /// Render as a generator command, e.g. `S166F133`.
    pub fn command(&self) -> heapless::String<24> {
        let mut s = heapless::String::new();
        // 1 + 10 + 1 + 10 digits always fits.
        let _ = write!(s, "S{}F{}", self.speed_hz, self.flow_hz);
        s
    }
}

/// Speed-sensor frequency for `kmh`.
pub fn speed_hz_for(kmh: f64, c: &SensorConstants) -> f64 {
    kmh / c.km_per_mile * c.speed_pulses_per_mile / SECS_PER_HOUR
}

/// Flow-sensor frequency for `lph`.
pub fn flow_hz_for(lph: f64, c: &SensorConstants) -> f64 {
    lph * c.cm3_per_liter * c.flow_pulses_per_cm3 / SECS_PER_HOUR
}

/// Lowest frequency that yields `min_pulses` in a window of `window_secs`.
pub fn stability_floor_hz(min_pulses: u32, window_secs: f64) -> f64 {
    if window_secs <= 0.0 {
        return 0.0;
    }
    f64::from(min_pulses) / window_secs
}

/// Smallest integer scale lifting the slower of two rates to `floor_hz`.
pub fn scale_factor(calc_speed_hz: f64, calc_flow_hz: f64, floor_hz: f64) -> u32 {
    let slowest = calc_speed_hz.min(calc_flow_hz);
    if slowest <= 0.0 || floor_hz <= slowest {
        return 1;
    }
    (floor_hz / slowest).ceil().min(f64::from(u32::MAX)) as u32
}

/// Compute the scaled frequency pair for a target speed and fuel flow.
pub fn plan(
    target_kmh: f64,
    target_lph: f64,
    c: &SensorConstants,
    window_secs: f64,
    min_pulses_per_sample: u32,
) -> FrequencyPlan {
    let calc_speed_hz = speed_hz_for(target_kmh.max(0.0), c);
    let calc_flow_hz = flow_hz_for(target_lph.max(0.0), c);
    let floor = stability_floor_hz(min_pulses_per_sample, window_secs);
    let scale = scale_factor(calc_speed_hz, calc_flow_hz, floor);

    FrequencyPlan {
        calc_speed_hz,
        calc_flow_hz,
        scale,
        speed_hz: to_hz(calc_speed_hz * f64::from(scale)),
        flow_hz: to_hz(calc_flow_hz * f64::from(scale)),
    }
}

fn to_hz(v: f64) -> u32 {
    v.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Vehicle speed implied by `pulses` counted over `window_secs`.
pub fn speed_kmh(pulses: u32, window_secs: f64, c: &SensorConstants) -> f64 {
    if window_secs <= 0.0 {
        return 0.0;
    }
    let hz = f64::from(pulses) / window_secs;
    hz * SECS_PER_HOUR / c.speed_pulses_per_mile * c.km_per_mile
}

/// Fuel flow implied by `pulses` counted over `window_secs`.
pub fn flow_lph(pulses: u32, window_secs: f64, c: &SensorConstants) -> f64 {
    if window_secs <= 0.0 {
        return 0.0;
    }
    let hz = f64::from(pulses) / window_secs;
    hz * SECS_PER_HOUR / c.flow_pulses_per_cm3 / c.cm3_per_liter
}
