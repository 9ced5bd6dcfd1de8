//! Numeric core: consumption math, smoothing and frequency planning.

pub mod consumption;
pub mod frequency;
pub mod smoothing;
