//! System configuration parameters
//!
//! All tunable parameters for the heat pump controller, gathered in one
//! struct.  The defaults are the reference tuning.  A configuration is
//! loaded once at boot, validated, and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sensors::{MAX_SAMPLES_PER_READING, SANE_MAX_C, SANE_MIN_C};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Pump duty cycle ---
    /// Lowest duty the pump may ever run at.  Never zero: the heat
    /// exchanger sensors only read true with water flowing.
    pub duty_minimum: f64,
    /// Highest duty.  Kept below 1.0, the SSR misbehaves at full on.
    pub duty_maximum: f64,
    /// Duty commanded when heating starts.
    pub duty_initial: f64,
    /// Step applied per tick when modulating around the outlet target.
    pub duty_step: f64,
    /// Software PWM period, also the control tick period (milliseconds).
    pub period_ms: u32,

    // --- Duty modulation ---
    /// Heat exchanger outlet temperature the pump modulates towards (°C).
    pub hex_out_target_c: f64,
    /// Half-width of the no-adjust band around `hex_out_target_c` (°C).
    pub duty_deadband_c: f64,

    // --- Thermostat ---
    /// Cylinder top temperature at which heating stops (°C).
    pub target_temperature_c: f64,
    /// Cylinder bottom temperature below which heating starts (°C).
    pub hwc_bottom_temp_min_c: f64,
    /// Cylinder bottom temperature at which heating stops (°C).
    pub hwc_bottom_temp_max_c: f64,
    /// Exchanger inlet ceiling; heating may not start at or above it (°C).
    pub hex_in_temp_max_c: f64,
    /// Exchanger outlet ceiling; trips heating and blocks restart (°C).
    pub hex_out_temp_max_c: f64,
    /// Compressor lockout after heating stops (milliseconds).
    pub recycle_time_ms: u64,

    // --- Sampling ---
    /// Accepted sample batches averaged into one reading.
    pub samples_per_reading: usize,
    /// Total batches tried per reading before reporting a sensor fault.
    pub max_batch_attempts: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Pump
            duty_minimum: 0.2,
            duty_maximum: 0.99,
            duty_initial: 0.5,
            duty_step: 0.05,
            period_ms: 1000, // 1 Hz

            // Modulation
            hex_out_target_c: 50.0,
            duty_deadband_c: 2.0,

            // Thermostat
            target_temperature_c: 55.0,
            hwc_bottom_temp_min_c: 45.0,
            hwc_bottom_temp_max_c: 52.0,
            hex_in_temp_max_c: 60.0,
            hex_out_temp_max_c: 65.0,
            recycle_time_ms: 5 * 60 * 1000, // 5 min

            // Sampling
            samples_per_reading: 5,
            max_batch_attempts: 20,
        }
    }
}

impl SystemConfig {
    /// Parse a JSON override and validate it.  Missing fields take their
    /// reference defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the control loop cannot run safely with.
    ///
    /// Called once at startup; an error here must halt the firmware before
    /// any actuator is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        use ConfigError::ValidationFailed as Invalid;

        if !(self.duty_minimum > 0.0 && self.duty_minimum < 1.0) {
            return Err(Invalid("duty_minimum must be in (0, 1)"));
        }
        if !(self.duty_maximum > 0.0 && self.duty_maximum < 1.0) {
            return Err(Invalid("duty_maximum must be in (0, 1)"));
        }
        if self.duty_minimum >= self.duty_maximum {
            return Err(Invalid("duty_minimum must be below duty_maximum"));
        }
        if !(self.duty_initial >= self.duty_minimum && self.duty_initial <= self.duty_maximum) {
            return Err(Invalid("duty_initial outside duty bounds"));
        }
        if !(self.duty_step > 0.0 && self.duty_step <= 1.0) {
            return Err(Invalid("duty_step must be in (0, 1]"));
        }
        if self.period_ms == 0 {
            return Err(Invalid("period_ms must be non-zero"));
        }
        // Both duty bounds must survive rounding to whole milliseconds.
        let period = f64::from(self.period_ms);
        if (period * self.duty_minimum).round() < 1.0 {
            return Err(Invalid("period_ms too short: duty_minimum rounds to no pulse"));
        }
        if (period * self.duty_maximum).round() >= period {
            return Err(Invalid("period_ms too short: duty_maximum rounds to a full period"));
        }
        if !(self.duty_deadband_c >= 0.0) {
            return Err(Invalid("duty_deadband_c must be non-negative"));
        }

        for (value, msg) in [
            (self.target_temperature_c, "target_temperature_c outside sensor range"),
            (self.hwc_bottom_temp_min_c, "hwc_bottom_temp_min_c outside sensor range"),
            (self.hwc_bottom_temp_max_c, "hwc_bottom_temp_max_c outside sensor range"),
            (self.hex_in_temp_max_c, "hex_in_temp_max_c outside sensor range"),
            (self.hex_out_temp_max_c, "hex_out_temp_max_c outside sensor range"),
            (self.hex_out_target_c, "hex_out_target_c outside sensor range"),
        ] {
            if !(value > SANE_MIN_C && value < SANE_MAX_C) {
                return Err(Invalid(msg));
            }
        }

        if self.hwc_bottom_temp_min_c >= self.hwc_bottom_temp_max_c {
            return Err(Invalid("hwc_bottom_temp_min_c must be below hwc_bottom_temp_max_c"));
        }
        if self.hwc_bottom_temp_min_c >= self.target_temperature_c {
            return Err(Invalid("hwc_bottom_temp_min_c must be below target_temperature_c"));
        }
        if self.hex_out_target_c >= self.hex_out_temp_max_c {
            return Err(Invalid("hex_out_target_c must be below hex_out_temp_max_c"));
        }
        if self.recycle_time_ms == 0 {
            return Err(Invalid("recycle_time_ms must be non-zero"));
        }

        if self.samples_per_reading == 0 || self.samples_per_reading > MAX_SAMPLES_PER_READING {
            return Err(Invalid("samples_per_reading out of range"));
        }
        if (self.max_batch_attempts as usize) < self.samples_per_reading {
            return Err(Invalid("max_batch_attempts below samples_per_reading"));
        }

        Ok(())
    }

    /// Control tick period in seconds.
    pub fn tick_secs(&self) -> f64 {
        f64::from(self.period_ms) / 1000.0
    }
}
