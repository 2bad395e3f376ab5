//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (temperature probes, relays, pump, event sinks, clock)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use serde::Serialize;

use crate::error::{ActuatorError, SensorError};
use crate::sensors::Channel;

// ───────────────────────────────────────────────────────────────
// Temperature source (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw per-channel temperature access.
///
/// A batch is one `request_conversion` followed by a `read_raw` for every
/// channel, so the four values of a batch are time-aligned.
pub trait TemperatureSource {
    /// Start a conversion on all probes at once.
    fn request_conversion(&mut self);

    /// Read the latest converted value for `channel`, in °C.  Values are
    /// returned unfiltered; range checking is the reader's job.
    fn read_raw(&mut self, channel: Channel) -> Result<f64, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator sink (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Relay outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Relay {
    Compressor,
    /// Backup resistive heater.  Manual control only.
    Heater,
}

/// Write-side port.  Only the
/// [`ActuatorDriver`](crate::drivers::actuator::ActuatorDriver) calls this.
pub trait ActuatorSink {
    /// Energise or release a relay coil.
    fn set_relay(&mut self, relay: Relay, energized: bool) -> Result<(), ActuatorError>;

    /// Set the pump duty cycle as a fraction of the PWM period.
    fn set_pump_duty(&mut self, fraction: f64) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / diagnostics)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Events arrive in tick order with non-decreasing
/// timestamps.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}
