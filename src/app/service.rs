//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the four control components and runs one control
//! tick start to finish.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  TemperatureSource ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                        │          AppService          │
//!      ActuatorSink ◀──  │ Reader · Thermostat · Duty · │
//!                        │        ActuatorDriver        │
//!                        └──────────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::SystemConfig;
use crate::control::duty::{DutyController, DutyCycle};
use crate::drivers::actuator::ActuatorDriver;
use crate::error::Result;
use crate::fsm::{ControlState, Thermostat};
use crate::sensors::reader::SensorReader;
use crate::sensors::AveragedTemperatures;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorSink, EventSink, TemperatureSource};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    reader: SensorReader,
    thermostat: Thermostat,
    duty: DutyController,
    actuators: ActuatorDriver,
    /// Readings from the last tick, `None` after a sensor fault.
    last_temps: Option<AveragedTemperatures>,
}

impl AppService {
    /// Validate `config` and build the service.  Nothing is actuated
    /// until [`start`](Self::start).
    pub fn new(config: SystemConfig) -> Result<Self> {
        config.validate()?;

        let duty = DutyController::new(&config);
        let actuators = ActuatorDriver::new(duty.floor());

        Ok(Self {
            reader: SensorReader::new(&config),
            thermostat: Thermostat::new(config.clone()),
            duty,
            actuators,
            config,
            last_temps: None,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter Idle and drive every output to its Idle level.
    pub fn start(
        &mut self,
        hw: &mut impl ActuatorSink,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.thermostat.start(now_ms);
        let state = self.thermostat.state();
        self.actuators.apply(state, self.duty.current(), hw)?;
        sink.emit(&AppEvent::Started { at_ms: now_ms, state });
        info!("AppService started in {:?}", state);
        Ok(())
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: read → thermostat → modulate → actuate.
    ///
    /// The `hw` parameter satisfies **both** [`TemperatureSource`] and
    /// [`ActuatorSink`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    ///
    /// A sensor fault is handled here (fail safe, keep running).  An
    /// actuator failure is returned and must be treated as fatal.
    pub fn tick(
        &mut self,
        hw: &mut (impl TemperatureSource + ActuatorSink),
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let prev = self.thermostat.state();

        // 1. Acquire
        let reading = self.reader.read_averaged(hw);
        if self.reader.last_rejected() > 0 {
            sink.emit(&AppEvent::BatchesRejected {
                at_ms: now_ms,
                count: self.reader.last_rejected(),
                first: self.reader.last_fault(),
            });
        }

        // 2. Decide
        let state = match reading {
            Ok(temps) => {
                self.last_temps = Some(temps);
                self.thermostat.evaluate(&temps, now_ms)
            }
            Err(error) => {
                warn!("AppService: sensor fault ({}), failing safe", error);
                self.last_temps = None;
                sink.emit(&AppEvent::SensorFault { at_ms: now_ms, error });
                self.thermostat.fail_safe(now_ms)
            }
        };

        // 3. Modulate
        if state == ControlState::Heating {
            if prev == ControlState::Heating {
                if let Some(temps) = self.last_temps {
                    self.modulate(temps.hex_out(), now_ms, sink);
                }
            } else {
                self.duty.set_duty_cycle(self.config.duty_initial, now_ms, sink);
            }
        }

        if state != prev {
            sink.emit(&AppEvent::StateChanged {
                at_ms: now_ms,
                from: prev,
                to: state,
            });
        }

        // 4. Actuate
        self.actuators.apply(state, self.duty.current(), hw)?;

        if let Some(telemetry) = self.build_telemetry(now_ms) {
            sink.emit(&AppEvent::Telemetry(telemetry));
        }
        Ok(())
    }

    /// Nudge the pump towards the outlet target.  Nothing inside the
    /// deadband.
    fn modulate(&mut self, hex_out: f64, now_ms: u64, sink: &mut impl EventSink) {
        let target = self.config.hex_out_target_c;
        let band = self.config.duty_deadband_c;
        let step = self.config.duty_step;

        if hex_out > target + band {
            self.duty.increment_duty_cycle(step, now_ms, sink);
        } else if hex_out < target - band {
            self.duty.decrement_duty_cycle(step, now_ms, sink);
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a manual override.  Duty changes are only accepted while
    /// Heating and reach the pump immediately.  Outside Heating they are
    /// dropped with a warning; the next heating cycle starts from
    /// `duty_initial`.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl ActuatorSink,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd {
            AppCommand::IncreaseDuty(_) | AppCommand::DecreaseDuty(_)
                if self.thermostat.state() != ControlState::Heating =>
            {
                warn!(
                    "AppService: {:?} ignored in {:?}, duty only adjustable while Heating",
                    cmd,
                    self.thermostat.state()
                );
            }
            AppCommand::IncreaseDuty(step) => {
                self.duty.increment_duty_cycle(step, now_ms, sink);
                self.actuators.apply(self.thermostat.state(), self.duty.current(), hw)?;
            }
            AppCommand::DecreaseDuty(step) => {
                self.duty.decrement_duty_cycle(step, now_ms, sink);
                self.actuators.apply(self.thermostat.state(), self.duty.current(), hw)?;
            }
            AppCommand::SetBackupHeater(energized) => {
                if self.actuators.set_backup_heater(energized, hw)? {
                    sink.emit(&AppEvent::BackupHeater { at_ms: now_ms, energized });
                }
            }
        }
        Ok(())
    }

    /// Force every output off.  Used on the fatal path.
    pub fn shutdown(
        &mut self,
        hw: &mut impl ActuatorSink,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        sink.emit(&AppEvent::Shutdown { at_ms: now_ms });
        self.actuators.shutdown(hw)?;
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Snapshot of the last tick.  `None` if it had no readings.
    pub fn build_telemetry(&self, now_ms: u64) -> Option<TelemetryData> {
        let t = self.last_temps?;
        Some(TelemetryData {
            at_ms: now_ms,
            state: self.thermostat.state(),
            hex_in_c: t.hex_in(),
            hex_out_c: t.hex_out(),
            hwc_top_c: t.hwc_top(),
            hwc_bottom_c: t.hwc_bottom(),
            pump_duty: self
                .actuators
                .pump_duty()
                .unwrap_or(self.duty.floor().fraction()),
            compressor_on: self.actuators.compressor_on().unwrap_or(false),
            recycle_remaining_ms: self.thermostat.recycle_remaining_ms(),
        })
    }

    pub fn state(&self) -> ControlState {
        self.thermostat.state()
    }

    /// Commanded duty (what the pump gets while Heating).
    pub fn duty(&self) -> DutyCycle {
        self.duty.current()
    }

    pub fn last_temperatures(&self) -> Option<AveragedTemperatures> {
        self.last_temps
    }
}
