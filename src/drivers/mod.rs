//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod actuator;
pub mod hw_init;
pub mod pump;
pub mod relay;
pub mod watchdog;
