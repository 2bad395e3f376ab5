//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) and the components it
//! owns emit these through the [`EventSink`](super::ports::EventSink)
//! port.  Every event carries the uptime at which it happened, so the
//! stream doubles as the diagnostic log.

use serde::Serialize;

use crate::error::SensorError;
use crate::fsm::ControlState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AppEvent {
    /// The service has started (carries initial state).
    Started { at_ms: u64, state: ControlState },

    /// The thermostat moved between states.
    StateChanged {
        at_ms: u64,
        from: ControlState,
        to: ControlState,
    },

    /// A duty-cycle call on the pump controller.
    DutyChanged(DutyRecord),

    /// Per-tick temperature and output snapshot.
    Telemetry(TelemetryData),

    /// Some sample batches were discarded on the way to a good reading.
    BatchesRejected {
        at_ms: u64,
        count: u32,
        first: Option<SensorError>,
    },

    /// No stable reading this tick; the thermostat failed safe.
    SensorFault { at_ms: u64, error: SensorError },

    /// The backup heater relay was switched by hand.
    BackupHeater { at_ms: u64, energized: bool },

    /// All outputs forced off on the fatal path.
    Shutdown { at_ms: u64 },
}

impl AppEvent {
    /// Uptime at which the event happened.
    pub fn timestamp_ms(&self) -> u64 {
        match self {
            Self::Started { at_ms, .. }
            | Self::StateChanged { at_ms, .. }
            | Self::BatchesRejected { at_ms, .. }
            | Self::SensorFault { at_ms, .. }
            | Self::BackupHeater { at_ms, .. }
            | Self::Shutdown { at_ms } => *at_ms,
            Self::DutyChanged(r) => r.at_ms,
            Self::Telemetry(t) => t.at_ms,
        }
    }
}

/// One duty-cycle call: what was asked for and what the pump got.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DutyRecord {
    pub at_ms: u64,
    /// Fraction as requested, before clamping.
    pub requested: f64,
    /// Fraction after clamping.
    pub duty: f64,
    pub pulse_ms: u32,
    pub period_ms: u32,
}

/// A point-in-time snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryData {
    pub at_ms: u64,
    pub state: ControlState,
    pub hex_in_c: f64,
    pub hex_out_c: f64,
    pub hwc_top_c: f64,
    pub hwc_bottom_c: f64,
    /// Duty actually applied to the pump this tick.
    pub pump_duty: f64,
    pub compressor_on: bool,
    /// Lockout time left while Recycling.
    pub recycle_remaining_ms: Option<u64>,
}
