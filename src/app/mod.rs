//! Application core: pure domain logic, zero I/O.
//!
//! Two services, one per node:
//!
//! - [`generator::SignalGenerator`] drives the pulse outputs and the
//!   trigger from serial commands.
//! - [`meter::FuelMeter`] turns sampled pulse counts into smoothed
//!   consumption reports.
//!
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`] (plus the `embedded-hal` pin traits), keeping this layer
//! testable without real peripherals.

pub mod commands;
pub mod events;
pub mod generator;
pub mod meter;
pub mod ports;
