//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each application event to the
//! ESP-IDF logger (UART / USB-CDC in production) as one structured line,
//! and keeping it in a [`DiagnosticLog`] for later dumps.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::diagnostics::DiagnosticLog;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink {
    diagnostics: DiagnosticLog,
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventSink {
    pub fn new() -> Self {
        Self {
            diagnostics: DiagnosticLog::new(),
        }
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    /// Print the retained history as JSON lines.
    pub fn dump(&self) {
        info!("DIAG | {} events retained, {} dropped", self.diagnostics.len(), self.diagnostics.dropped());
        for line in self.diagnostics.dump_json_lines().lines() {
            info!("DIAG | {}", line);
        }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TEMP | t={}ms state={:?} | hex_in={:.2} hex_out={:.2} \
                     hwc_top={:.2} hwc_bottom={:.2} \u{00b0}C | pump={:.3} comp={} | lockout={}",
                    t.at_ms,
                    t.state,
                    t.hex_in_c,
                    t.hex_out_c,
                    t.hwc_top_c,
                    t.hwc_bottom_c,
                    t.pump_duty,
                    if t.compressor_on { "ON" } else { "OFF" },
                    match t.recycle_remaining_ms {
                        Some(ms) => ms / 1000,
                        None => 0,
                    },
                );
            }
            AppEvent::DutyChanged(d) => {
                info!(
                    "DUTY | t={}ms req={:.3} duty={:.3} pulse={}ms period={}ms",
                    d.at_ms, d.requested, d.duty, d.pulse_ms, d.period_ms
                );
            }
            AppEvent::StateChanged { at_ms, from, to } => {
                info!("STATE | t={}ms {:?} -> {:?}", at_ms, from, to);
            }
            AppEvent::BatchesRejected { at_ms, count, first } => {
                warn!(
                    "SENSOR | t={}ms {} batch(es) rejected, first: {:?}",
                    at_ms, count, first
                );
            }
            AppEvent::SensorFault { at_ms, error } => {
                error!("FAULT | t={}ms sensor: {}", at_ms, error);
            }
            AppEvent::BackupHeater { at_ms, energized } => {
                info!(
                    "HEATER | t={}ms backup heater {}",
                    at_ms,
                    if *energized { "ON" } else { "OFF" }
                );
            }
            AppEvent::Started { at_ms, state } => {
                info!("START | t={}ms initial_state={:?}", at_ms, state);
            }
            AppEvent::Shutdown { at_ms } => {
                error!("SHUTDOWN | t={}ms all outputs forced off", at_ms);
            }
        }
        self.diagnostics.record(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsm::ControlState;

    #[test]
    fn every_event_lands_in_diagnostics() {
        let mut sink = LogEventSink::new();
        sink.emit(&AppEvent::Started {
            at_ms: 0,
            state: ControlState::Idle,
        });
        sink.emit(&AppEvent::BackupHeater {
            at_ms: 5,
            energized: true,
        });
        assert_eq!(sink.diagnostics().len(), 2);
        assert_eq!(sink.diagnostics().last_ms(), 5);
        sink.dump();
    }
}
