//! Relay output (compressor contactor, backup heater).
//!
//! A dumb actuator: one GPIO, polarity from
//! [`RELAY_ACTIVE_LOW`](crate::pins::RELAY_ACTIVE_LOW).
//! Deciding *when* to switch is the actuator driver's job.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real GPIO via hw_init.
//! On host/test: hw_init records the level in its simulation mask.

use crate::drivers::hw_init;

pub struct RelayDriver {
    pin: i32,
    energized: bool,
}

impl RelayDriver {
    /// Wraps an output already configured de-energized by `hw_init`.
    pub fn new(pin: i32) -> Self {
        Self {
            pin,
            energized: false,
        }
    }

    /// Drive the coil.  On error the remembered state is unchanged and the
    /// ESP-IDF return code is passed back.
    pub fn set(&mut self, energized: bool) -> Result<(), i32> {
        hw_init::gpio_write(self.pin, hw_init::relay_level(energized))?;
        self.energized = energized;
        Ok(())
    }

    pub fn is_energized(&self) -> bool {
        self.energized
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }
}
