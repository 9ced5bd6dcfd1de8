//! Fuel meter library.
//!
//! Shared by both binaries: `fuel-sim` (the signal generator node) and
//! `fuel-meter` (the measuring node).  ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod link;
pub mod pins;
pub mod sensors;

pub mod adapters;
pub mod drivers;
