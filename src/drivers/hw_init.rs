//! One-shot hardware peripheral initialization and raw pin access.
//!
//! Configures the ADC1 thermistor channels and the relay/SSR outputs
//! using raw ESP-IDF sys calls.  Called once from `main()` before the
//! control loop starts.  Every output comes up de-energized.
//!
//! On host builds the GPIO helpers record levels in an atomic bitmask so
//! adapters can be tested without a board.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU64, Ordering};

use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

/// Pin level that puts a relay coil in the requested state.
pub const fn relay_level(energized: bool) -> bool {
    energized != pins::RELAY_ACTIVE_LOW
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_outputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    sim_reset();
    log::info!("hw_init(sim): peripheral init skipped, outputs de-energized");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  `init_adc()` completes before the control
/// loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    for &ch in &pins::TEMP_ADC_CHANNELS {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), ch, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::AdcInitFailed(ret));
        }
    }

    info!("hw_init: ADC1 configured (CH{:?} = thermistors)", pins::TEMP_ADC_CHANNELS);
    Ok(())
}

/// One oneshot conversion.  `None` when the driver reports an error.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Option<u16> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract: single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return None;
    }
    Some(raw.max(0) as u16)
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let outputs = [
        (pins::COMPRESSOR_RELAY_GPIO, relay_level(false)),
        (pins::HEATER_RELAY_GPIO, relay_level(false)),
        (pins::PUMP_SSR_GPIO, false),
    ];

    for &(pin, idle_high) in &outputs {
        // Latch the safe level before the pin becomes an output so the
        // relay never glitches on at boot.
        unsafe { gpio_set_level(pin, u32::from(idle_high)) };
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    info!("hw_init: relay and SSR outputs configured (all off)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), i32> {
    // SAFETY: gpio_set_level writes to an output configured in
    // init_gpio_outputs().  Main-loop only.
    let ret = unsafe { gpio_set_level(pin, u32::from(high)) };
    if ret != ESP_OK as i32 {
        return Err(ret);
    }
    Ok(())
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_GPIO_LEVELS: AtomicU64 = AtomicU64::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_GPIO_FAULTS: AtomicU64 = AtomicU64::new(0);

/// ESP_FAIL, as returned by the real driver.
#[cfg(not(target_os = "espidf"))]
const SIM_ESP_FAIL: i32 = -1;

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), i32> {
    let bit = 1u64 << pin;
    if SIM_GPIO_FAULTS.load(Ordering::Relaxed) & bit != 0 {
        return Err(SIM_ESP_FAIL);
    }
    if high {
        SIM_GPIO_LEVELS.fetch_or(bit, Ordering::Relaxed);
    } else {
        SIM_GPIO_LEVELS.fetch_and(!bit, Ordering::Relaxed);
    }
    Ok(())
}

/// Last level written to `pin`.
#[cfg(not(target_os = "espidf"))]
pub fn sim_gpio_level(pin: i32) -> bool {
    SIM_GPIO_LEVELS.load(Ordering::Relaxed) & (1u64 << pin) != 0
}

/// Make every subsequent write to `pin` fail (or succeed again).
#[cfg(not(target_os = "espidf"))]
pub fn sim_fail_gpio(pin: i32, fail: bool) {
    let bit = 1u64 << pin;
    if fail {
        SIM_GPIO_FAULTS.fetch_or(bit, Ordering::Relaxed);
    } else {
        SIM_GPIO_FAULTS.fetch_and(!bit, Ordering::Relaxed);
    }
}

/// Put the board's simulated outputs back at their de-energized level.
/// Other pins are left alone.
#[cfg(not(target_os = "espidf"))]
pub fn sim_reset() {
    for pin in [pins::COMPRESSOR_RELAY_GPIO, pins::HEATER_RELAY_GPIO, pins::PUMP_SSR_GPIO] {
        sim_fail_gpio(pin, false);
    }
    for pin in [pins::COMPRESSOR_RELAY_GPIO, pins::HEATER_RELAY_GPIO] {
        let _ = gpio_write(pin, relay_level(false));
    }
    let _ = gpio_write(pins::PUMP_SSR_GPIO, false);
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn relay_level_honours_active_low_board() {
        assert_eq!(relay_level(true), !pins::RELAY_ACTIVE_LOW);
        assert_eq!(relay_level(false), pins::RELAY_ACTIVE_LOW);
    }

    // Uses a pin no other test touches; the mask is process-wide.
    #[test]
    fn sim_gpio_records_levels_and_injected_faults() {
        const PIN: i32 = 40;
        gpio_write(PIN, true).unwrap();
        assert!(sim_gpio_level(PIN));
        gpio_write(PIN, false).unwrap();
        assert!(!sim_gpio_level(PIN));

        sim_fail_gpio(PIN, true);
        assert_eq!(gpio_write(PIN, true), Err(SIM_ESP_FAIL));
        assert!(!sim_gpio_level(PIN));
        sim_fail_gpio(PIN, false);
        assert_eq!(gpio_write(PIN, true), Ok(()));
    }
}
