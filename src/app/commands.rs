//! Inbound commands to the application service.
//!
//! Manual overrides requested from outside the control loop (serial
//! console, a future remote link).  The
//! [`AppService`](super::service::AppService) routes every one of them
//! through the actuator driver, never straight to hardware.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// Raise the pump duty by the given fraction (clamped to bounds).
    IncreaseDuty(f64),

    /// Lower the pump duty by the given fraction (clamped to bounds).
    DecreaseDuty(f64),

    /// Switch the backup immersion heater.  The thermostat never does.
    SetBackupHeater(bool),
}
