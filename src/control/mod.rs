//! Pump modulation.

pub mod duty;
