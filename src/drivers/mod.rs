//! Output drivers for the signal generator node.

pub mod pulse;
pub mod trigger;

#[cfg(target_os = "espidf")]
pub mod watchdog;
