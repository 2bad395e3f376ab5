//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`ThermistorBank`], both relays, and the pump SSR, exposing
//! them through [`TemperatureSource`] and [`ActuatorSink`].  This is the
//! only module in the system that touches actual hardware.  On
//! non-espidf targets, the underlying drivers use cfg-gated simulation.

use embedded_hal::delay::DelayNs;
use log::error;

use crate::app::ports::{ActuatorSink, Relay, TemperatureSource};
use crate::drivers::pump::PumpDriver;
use crate::drivers::relay::RelayDriver;
use crate::error::{ActuatorError, SensorError};
use crate::pins;
use crate::sensors::thermistor::ThermistorBank;
use crate::sensors::Channel;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    probes: ThermistorBank,
    compressor: RelayDriver,
    heater: RelayDriver,
    pump: PumpDriver,
}

impl HardwareAdapter {
    /// Board wiring from [`pins`]; `period_ms` is the software-PWM period.
    pub fn new(period_ms: u32) -> Self {
        Self {
            probes: ThermistorBank::new(),
            compressor: RelayDriver::new(pins::COMPRESSOR_RELAY_GPIO),
            heater: RelayDriver::new(pins::HEATER_RELAY_GPIO),
            pump: PumpDriver::new(pins::PUMP_SSR_GPIO, period_ms),
        }
    }

    /// Run one pump PWM period.  Blocks for the whole period, so the
    /// control loop uses it as its tick pacing.
    pub fn run_pump_period(&mut self, delay: &mut impl DelayNs) -> Result<(), ActuatorError> {
        self.pump.run_period(delay).map_err(|rc| {
            error!("hardware: pump SSR write failed (rc={})", rc);
            ActuatorError::PumpWriteFailed
        })
    }

    pub fn compressor_energized(&self) -> bool {
        self.compressor.is_energized()
    }

    pub fn heater_energized(&self) -> bool {
        self.heater.is_energized()
    }

    pub fn pump_pulse_ms(&self) -> u32 {
        self.pump.pulse_ms()
    }
}

// ── TemperatureSource implementation ──────────────────────────

impl TemperatureSource for HardwareAdapter {
    fn request_conversion(&mut self) {
        self.probes.request_conversion();
    }

    fn read_raw(&mut self, channel: Channel) -> Result<f64, SensorError> {
        self.probes.read_raw(channel)
    }
}

// ── ActuatorSink implementation ───────────────────────────────

impl ActuatorSink for HardwareAdapter {
    fn set_relay(&mut self, relay: Relay, energized: bool) -> Result<(), ActuatorError> {
        let driver = match relay {
            Relay::Compressor => &mut self.compressor,
            Relay::Heater => &mut self.heater,
        };
        driver.set(energized).map_err(|rc| {
            error!("hardware: {:?} relay write failed (pin {}, rc={})", relay, driver.pin(), rc);
            ActuatorError::RelayWriteFailed(relay)
        })
    }

    fn set_pump_duty(&mut self, fraction: f64) -> Result<(), ActuatorError> {
        self.pump.set_duty(fraction);
        Ok(())
    }
}
