//! Application core: pure domain logic, zero I/O.
//!
//! The control rules for the heat pump: temperature acquisition,
//! thermostat, pump modulation, and actuation.  All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
