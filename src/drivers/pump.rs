//! Circulation pump driver (zero-cross SSR, software PWM).
//!
//! The SSR is switched once per period: high for the pulse, low for the
//! remainder.  `set_duty` only records the new pulse width; the pin moves
//! when the control loop calls [`PumpDriver::run_period`], which also
//! paces the loop.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real GPIO via hw_init, timed by FreeRTOS delays.
//! On host/test: hw_init records the level; any `DelayNs` works.

use embedded_hal::delay::DelayNs;

use crate::drivers::hw_init;

pub struct PumpDriver {
    pin: i32,
    period_ms: u32,
    pulse_ms: u32,
}

impl PumpDriver {
    /// Starts stopped (zero pulse) until the first `set_duty`.
    pub fn new(pin: i32, period_ms: u32) -> Self {
        Self {
            pin,
            period_ms,
            pulse_ms: 0,
        }
    }

    /// Record a new duty fraction; takes effect on the next period.
    pub fn set_duty(&mut self, fraction: f64) {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        self.pulse_ms = ((f64::from(self.period_ms) * fraction).round() as u32).min(self.period_ms);
    }

    /// Run one full PWM period, blocking for `period_ms`.  The pin is
    /// always left low, even when the high write fails.
    pub fn run_period(&mut self, delay: &mut impl DelayNs) -> Result<(), i32> {
        let mut result = Ok(());
        if self.pulse_ms > 0 {
            result = hw_init::gpio_write(self.pin, true);
            delay.delay_ms(self.pulse_ms);
        }
        let low = hw_init::gpio_write(self.pin, false);
        delay.delay_ms(self.period_ms - self.pulse_ms);
        result.and(low)
    }

    pub fn pulse_ms(&self) -> u32 {
        self.pulse_ms
    }
}
