//! Pump duty-cycle controller.
//!
//! Holds the commanded duty as a fraction of a fixed software-PWM period
//! and converts it to a pulse width.  The duty never leaves
//! `[duty_minimum, duty_maximum]`: zero flow would blind the heat
//! exchanger probes, and a full-on SSR misbehaves.
//!
//! Every call emits an [`AppEvent::DutyChanged`] record; it is the only
//! trace of pump modulation on the console.

use serde::Serialize;

use crate::app::events::{AppEvent, DutyRecord};
use crate::app::ports::EventSink;
use crate::config::SystemConfig;

/// A clamped duty cycle and its pulse width.
///
/// Only [`DutyController`] constructs these, so a `DutyCycle` in hand is
/// always within the configured bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DutyCycle {
    fraction: f64,
    pulse_ms: u32,
}

impl DutyCycle {
    fn new(fraction: f64, period_ms: u32) -> Self {
        Self {
            fraction,
            pulse_ms: (f64::from(period_ms) * fraction).round() as u32,
        }
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// On-time per period (milliseconds).
    pub fn pulse_ms(&self) -> u32 {
        self.pulse_ms
    }
}

pub struct DutyController {
    minimum: f64,
    maximum: f64,
    period_ms: u32,
    current: DutyCycle,
}

impl DutyController {
    /// Start at `duty_initial`.  Construction does not emit a record.
    pub fn new(config: &SystemConfig) -> Self {
        let initial = config.duty_initial.clamp(config.duty_minimum, config.duty_maximum);
        Self {
            minimum: config.duty_minimum,
            maximum: config.duty_maximum,
            period_ms: config.period_ms,
            current: DutyCycle::new(initial, config.period_ms),
        }
    }

    /// Set the duty, clamped to the configured bounds.  NaN falls back to
    /// the minimum.
    pub fn set_duty_cycle(
        &mut self,
        fraction: f64,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> DutyCycle {
        let clamped = if fraction.is_nan() {
            self.minimum
        } else {
            fraction.clamp(self.minimum, self.maximum)
        };
        self.current = DutyCycle::new(clamped, self.period_ms);

        sink.emit(&AppEvent::DutyChanged(DutyRecord {
            at_ms: now_ms,
            requested: fraction,
            duty: self.current.fraction,
            pulse_ms: self.current.pulse_ms,
            period_ms: self.period_ms,
        }));

        self.current
    }

    /// Raise the duty by `step` (itself clamped to `[0, 1]`).
    pub fn increment_duty_cycle(
        &mut self,
        step: f64,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> DutyCycle {
        let target = self.current.fraction + clamp_step(step);
        self.set_duty_cycle(target, now_ms, sink)
    }

    /// Lower the duty by `step` (itself clamped to `[0, 1]`).
    pub fn decrement_duty_cycle(
        &mut self,
        step: f64,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> DutyCycle {
        let target = self.current.fraction - clamp_step(step);
        self.set_duty_cycle(target, now_ms, sink)
    }

    pub fn current(&self) -> DutyCycle {
        self.current
    }

    /// Duty the pump falls back to outside of heating.
    pub fn floor(&self) -> DutyCycle {
        DutyCycle::new(self.minimum, self.period_ms)
    }
}

fn clamp_step(step: f64) -> f64 {
    if step.is_nan() { 0.0 } else { step.clamp(0.0, 1.0) }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    struct Discard;

    impl EventSink for Discard {
        fn emit(&mut self, _event: &AppEvent) {}
    }

    proptest! {
        #[test]
        fn set_duty_always_within_bounds(f in prop_oneof![-10.0f64..10.0, Just(f64::INFINITY), Just(f64::NEG_INFINITY)]) {
            let config = SystemConfig::default();
            let mut c = DutyController::new(&config);
            let d = c.set_duty_cycle(f, 0, &mut Discard);
            prop_assert!(d.fraction() >= config.duty_minimum);
            prop_assert!(d.fraction() <= config.duty_maximum);
            if f > config.duty_minimum && f < config.duty_maximum {
                prop_assert_eq!(d.fraction(), f);
            }
            if d.fraction() == config.duty_minimum {
                prop_assert!(f <= config.duty_minimum);
            }
            if d.fraction() == config.duty_maximum {
                prop_assert!(f >= config.duty_maximum);
            }
        }

        #[test]
        fn increment_then_decrement_restores_duty(start in 0.0f64..1.0, step in 0.0f64..0.3) {
            let config = SystemConfig::default();
            let mut c = DutyController::new(&config);
            let before = c.set_duty_cycle(start, 0, &mut Discard).fraction();
            c.increment_duty_cycle(step, 0, &mut Discard);
            let after = c.decrement_duty_cycle(step, 0, &mut Discard).fraction();

            if before + step <= config.duty_maximum {
                prop_assert!((after - before).abs() < 1e-9, "{} -> {}", before, after);
            } else {
                // Saturated at the top: the round trip lands step below max.
                let expected = (config.duty_maximum - step).max(config.duty_minimum);
                prop_assert!((after - expected).abs() < 1e-9);
            }
        }
    }
}
