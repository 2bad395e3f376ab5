//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the latest averaged temperatures, the clock, the thresholds,
//! and the recycle timer origin.

use crate::config::SystemConfig;
use crate::sensors::AveragedTemperatures;

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Uptime of the current tick (milliseconds).
    pub now_ms: u64,

    // -- Sensor data --
    /// Readings for this tick.  `None` when acquisition failed; handlers
    /// must not start heating without them.
    pub temps: Option<AveragedTemperatures>,

    // -- Configuration --
    pub config: SystemConfig,

    // -- Recycle lockout --
    /// Uptime at which the compressor last stopped.  Only written by
    /// `recycling_enter`.
    pub recycle_started_ms: u64,
}

impl FsmContext {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            now_ms: 0,
            temps: None,
            config,
            recycle_started_ms: 0,
        }
    }

    /// Milliseconds since the compressor last stopped.
    pub fn recycle_elapsed_ms(&self) -> u64 {
        self.now_ms.saturating_sub(self.recycle_started_ms)
    }

    /// Lockout time still to run (zero once expired).
    pub fn recycle_remaining_ms(&self) -> u64 {
        self.config
            .recycle_time_ms
            .saturating_sub(self.recycle_elapsed_ms())
    }
}
