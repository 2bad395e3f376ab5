//! Actuator driver: the only code allowed to write actuator state.
//!
//! Maps a [`ControlState`] and the commanded [`DutyCycle`] onto the
//! compressor relay and the pump, remembering what was last written so
//! that re-applying the same outputs issues no hardware writes (no relay
//! chatter).  The backup heater relay is never driven by the thermostat;
//! it only moves on an explicit manual command.
//!
//! A failed write leaves the remembered state untouched and is returned
//! to the caller.  There is no retry here: the service treats it as fatal.

use log::{debug, info, warn};

use crate::app::ports::{ActuatorSink, Relay};
use crate::control::duty::DutyCycle;
use crate::error::ActuatorError;
use crate::fsm::ControlState;

/// What the outputs should look like after an `apply`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputState {
    pub compressor: bool,
    pub pump_duty: f64,
}

pub struct ActuatorDriver {
    duty_minimum: f64,
    compressor: Option<bool>,
    pump_duty: Option<f64>,
    heater: Option<bool>,
}

impl ActuatorDriver {
    /// `floor` is the duty the pump keeps outside of heating.
    pub fn new(floor: DutyCycle) -> Self {
        Self {
            duty_minimum: floor.fraction(),
            compressor: None,
            pump_duty: None,
            heater: None,
        }
    }

    /// Outputs for `state`: compressor and commanded duty while heating,
    /// compressor off and minimum flow otherwise.
    pub fn outputs_for(&self, state: ControlState, duty: DutyCycle) -> OutputState {
        match state {
            ControlState::Heating => OutputState {
                compressor: true,
                pump_duty: duty.fraction(),
            },
            ControlState::Idle | ControlState::Recycling => OutputState {
                compressor: false,
                pump_duty: self.duty_minimum,
            },
        }
    }

    /// Drive the hardware to match `state`.  Returns the number of
    /// hardware writes issued (zero when nothing changed).
    pub fn apply(
        &mut self,
        state: ControlState,
        duty: DutyCycle,
        hw: &mut impl ActuatorSink,
    ) -> Result<u32, ActuatorError> {
        let want = self.outputs_for(state, duty);
        let mut issued = 0;

        if self.compressor != Some(want.compressor) {
            hw.set_relay(Relay::Compressor, want.compressor)?;
            self.compressor = Some(want.compressor);
            issued += 1;
            info!(
                "Actuators: compressor {}",
                if want.compressor { "ON" } else { "OFF" }
            );
        }

        if self.pump_duty != Some(want.pump_duty) {
            hw.set_pump_duty(want.pump_duty)?;
            self.pump_duty = Some(want.pump_duty);
            issued += 1;
            debug!("Actuators: pump duty {:.3}", want.pump_duty);
        }

        Ok(issued)
    }

    /// Manual control of the backup heater.  Idempotent like `apply`.
    pub fn set_backup_heater(
        &mut self,
        energized: bool,
        hw: &mut impl ActuatorSink,
    ) -> Result<bool, ActuatorError> {
        if self.heater == Some(energized) {
            return Ok(false);
        }
        hw.set_relay(Relay::Heater, energized)?;
        self.heater = Some(energized);
        info!("Actuators: backup heater {}", if energized { "ON" } else { "OFF" });
        Ok(true)
    }

    /// Force every relay off and the pump to minimum flow, regardless of
    /// what was last written.  Tries every output even if one fails and
    /// reports the first failure.
    pub fn shutdown(&mut self, hw: &mut impl ActuatorSink) -> Result<(), ActuatorError> {
        warn!("Actuators: shutdown, forcing all relays off");
        let compressor = hw.set_relay(Relay::Compressor, false);
        let heater = hw.set_relay(Relay::Heater, false);
        let pump = hw.set_pump_duty(self.duty_minimum);

        self.compressor = compressor.is_ok().then_some(false);
        self.heater = heater.is_ok().then_some(false);
        self.pump_duty = pump.is_ok().then_some(self.duty_minimum);

        compressor.and(heater).and(pump)
    }

    /// Last compressor state written, if any.
    pub fn compressor_on(&self) -> Option<bool> {
        self.compressor
    }

    /// Last pump duty written, if any.
    pub fn pump_duty(&self) -> Option<f64> {
        self.pump_duty
    }

    pub fn heater_on(&self) -> Option<bool> {
        self.heater
    }
}
