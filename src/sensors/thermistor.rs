//! NTC thermistor bank (10 kOhm @ 25 C, B = 3950), one probe per channel.
//!
//! Each probe sits in a voltage divider with a fixed 10 kOhm resistor and
//! is read through the ESP32-S3 ADC1.  The simplified Beta (Steinhart-Hart)
//! equation converts resistance to temperature.
//!
//! `request_conversion` samples all four ADC channels back to back and
//! latches the raw counts; `read_raw` converts the latched value.  An open
//! or shorted probe pins the divider to a rail and reads as -40 °C, which
//! the sanity filter rejects.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from static `AtomicU16`s for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

use crate::app::ports::TemperatureSource;
use crate::error::SensorError;

use super::Channel;

/// Raw count 2048 is mid-scale: about 25 °C.
#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_ADC: [AtomicU16; Channel::COUNT] = [const { AtomicU16::new(2048) }; Channel::COUNT];

#[cfg(not(target_os = "espidf"))]
static SIM_ADC_FAULTS: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temp_adc(channel: Channel, raw: u16) {
    SIM_TEMP_ADC[channel.index()].store(raw, Ordering::Relaxed);
}

/// Make the simulated ADC report a driver error for `channel`.
#[cfg(not(target_os = "espidf"))]
pub fn sim_fail_adc(channel: Channel, fail: bool) {
    let bit = 1u16 << channel.index();
    if fail {
        SIM_ADC_FAULTS.fetch_or(bit, Ordering::Relaxed);
    } else {
        SIM_ADC_FAULTS.fetch_and(!bit, Ordering::Relaxed);
    }
}

const R25: f64 = 10_000.0;
const BETA: f64 = 3950.0;
const T25_K: f64 = 298.15;
const R_DIVIDER: f64 = 10_000.0;
const ADC_MAX: f64 = 4095.0;
const V_REF: f64 = 3.3;

/// Reported for a probe whose divider sits on a rail.
pub const RAIL_CELSIUS: f64 = -40.0;

pub struct ThermistorBank {
    latched: [Option<u16>; Channel::COUNT],
}

impl Default for ThermistorBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ThermistorBank {
    pub fn new() -> Self {
        Self {
            latched: [None; Channel::COUNT],
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(channel: Channel) -> Option<u16> {
        hw_init::adc1_read(pins::TEMP_ADC_CHANNELS[channel.index()])
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(channel: Channel) -> Option<u16> {
        if SIM_ADC_FAULTS.load(Ordering::Relaxed) & (1u16 << channel.index()) != 0 {
            return None;
        }
        Some(SIM_TEMP_ADC[channel.index()].load(Ordering::Relaxed))
    }
}

impl TemperatureSource for ThermistorBank {
    fn request_conversion(&mut self) {
        for ch in Channel::ALL {
            self.latched[ch.index()] = Self::read_adc(ch);
        }
    }

    fn read_raw(&mut self, channel: Channel) -> Result<f64, SensorError> {
        self.latched[channel.index()]
            .map(adc_to_celsius)
            .ok_or(SensorError::ReadFailed(channel))
    }
}

/// Convert a 12-bit ADC count to °C.
pub fn adc_to_celsius(raw: u16) -> f64 {
    let voltage = (f64::from(raw) / ADC_MAX) * V_REF;
    if voltage <= 0.01 || voltage >= (V_REF - 0.01) {
        return RAIL_CELSIUS;
    }
    let r_ntc = R_DIVIDER * voltage / (V_REF - voltage);
    let inv_t = (1.0 / T25_K) + (1.0 / BETA) * (r_ntc / R25).ln();
    if inv_t <= 0.0 {
        return RAIL_CELSIUS;
    }
    (1.0 / inv_t) - 273.15
}
