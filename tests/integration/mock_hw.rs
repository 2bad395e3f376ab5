//! Mock hardware adapter for integration tests.
//!
//! Serves scripted probe temperatures and records every actuator call so
//! tests can assert on the full command history without touching real
//! GPIO registers.

use hwc_heatpump::app::events::AppEvent;
use hwc_heatpump::app::ports::{ActuatorSink, EventSink, Relay, TemperatureSource};
use hwc_heatpump::error::{ActuatorError, SensorError};
use hwc_heatpump::sensors::Channel;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    Relay { relay: Relay, energized: bool },
    PumpDuty(f64),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    /// Value every batch returns, per channel.
    pub temps: [f64; Channel::COUNT],
    /// Channels whose reads fail outright.
    pub dead: [bool; Channel::COUNT],
    /// Relay whose writes fail.
    pub stuck_relay: Option<Relay>,
    pub calls: Vec<ActuatorCall>,
    pub conversions: u32,
}

#[allow(dead_code)]
impl MockHardware {
    /// hex_in, hex_out, top, bottom.
    pub fn new(temps: [f64; Channel::COUNT]) -> Self {
        Self {
            temps,
            dead: [false; Channel::COUNT],
            stuck_relay: None,
            calls: Vec::new(),
            conversions: 0,
        }
    }

    pub fn set(&mut self, channel: Channel, celsius: f64) {
        self.temps[channel.index()] = celsius;
    }

    pub fn compressor_on(&self) -> bool {
        self.relay_state(Relay::Compressor).unwrap_or(false)
    }

    pub fn relay_state(&self, relay: Relay) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match *c {
            ActuatorCall::Relay { relay: r, energized } if r == relay => Some(energized),
            _ => None,
        })
    }

    pub fn pump_duty(&self) -> Option<f64> {
        self.calls.iter().rev().find_map(|c| match *c {
            ActuatorCall::PumpDuty(d) => Some(d),
            _ => None,
        })
    }
}

impl TemperatureSource for MockHardware {
    fn request_conversion(&mut self) {
        self.conversions += 1;
    }

    fn read_raw(&mut self, channel: Channel) -> Result<f64, SensorError> {
        if self.dead[channel.index()] {
            return Err(SensorError::ReadFailed(channel));
        }
        Ok(self.temps[channel.index()])
    }
}

impl ActuatorSink for MockHardware {
    fn set_relay(&mut self, relay: Relay, energized: bool) -> Result<(), ActuatorError> {
        if self.stuck_relay == Some(relay) {
            return Err(ActuatorError::RelayWriteFailed(relay));
        }
        self.calls.push(ActuatorCall::Relay { relay, energized });
        Ok(())
    }

    fn set_pump_duty(&mut self, fraction: f64) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::PumpDuty(fraction));
        Ok(())
    }
}

// ── Recording event sink ──────────────────────────────────────

#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_changes(&self) -> Vec<(u64, hwc_heatpump::fsm::ControlState)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { at_ms, to, .. } => Some((*at_ms, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
