//! Unified error types for the heat pump firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level control loop's error handling uniform.  All variants are
//! `Copy` so they travel through the service and the event stream without
//! allocation.
//!
//! | Kind                | Handling                                          |
//! |---------------------|---------------------------------------------------|
//! | [`SensorError`]     | retried per batch; after the bound, fail safe     |
//! | [`ConfigError`]     | fatal at startup, before any actuation            |
//! | [`ActuatorError`]   | fatal; the loop shuts outputs down and halts      |

use core::fmt;

use serde::Serialize;

use crate::app::ports::Relay;
use crate::sensors::Channel;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Temperature acquisition failed.
    Sensor(SensorError),
    /// An actuator write failed.
    Actuator(ActuatorError),
    /// Configuration is invalid or could not be parsed.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SensorError {
    /// The bus or ADC read for a channel failed.
    ReadFailed(Channel),
    /// A channel returned a value outside the sanity range.
    OutOfRange(Channel),
    /// Too many batches were rejected before enough good ones arrived.
    RetriesExhausted { attempts: u32 },
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed(ch) => write!(f, "{ch:?} read failed"),
            Self::OutOfRange(ch) => write!(f, "{ch:?} reading out of range"),
            Self::RetriesExhausted { attempts } => {
                write!(f, "no stable reading after {attempts} batches")
            }
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO write to a relay coil failed.
    RelayWriteFailed(Relay),
    /// The pump SSR output could not be driven.
    PumpWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RelayWriteFailed(relay) => write!(f, "{relay:?} relay write failed"),
            Self::PumpWriteFailed => write!(f, "pump write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration source could not be deserialised.
    Malformed,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed configuration"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
