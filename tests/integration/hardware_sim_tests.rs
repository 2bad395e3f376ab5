//! End-to-end test through the real `HardwareAdapter` on the host
//! simulation: thermistor ADC injection in, simulated GPIO levels out.
//!
//! The simulation state is process-wide, so the whole scenario lives in
//! a single test.

use crate::mock_hw::LogSink;

use embedded_hal::delay::DelayNs;
use hwc_heatpump::adapters::hardware::HardwareAdapter;
use hwc_heatpump::app::events::AppEvent;
use hwc_heatpump::app::service::AppService;
use hwc_heatpump::config::SystemConfig;
use hwc_heatpump::drivers::hw_init;
use hwc_heatpump::fsm::ControlState;
use hwc_heatpump::pins;
use hwc_heatpump::sensors::thermistor::{adc_to_celsius, sim_fail_adc, sim_set_temp_adc};
use hwc_heatpump::sensors::Channel;

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// ADC count the divider produces at `celsius`.
fn raw_for(celsius: f64) -> u16 {
    let t = celsius + 273.15;
    let r = 10_000.0 * (3950.0 * (1.0 / t - 1.0 / 298.15)).exp();
    (4095.0 * r / (10_000.0 + r)).round() as u16
}

fn set_temps(temps: [f64; 4]) {
    for (ch, c) in Channel::ALL.into_iter().zip(temps) {
        sim_set_temp_adc(ch, raw_for(c));
    }
}

#[test]
fn simulated_board_runs_a_heating_cycle() {
    // Sanity-check the inverse used to drive the ADC.
    assert!((adc_to_celsius(raw_for(45.0)) - 45.0).abs() < 0.2);

    hw_init::init_peripherals().unwrap();
    let config = SystemConfig::default();
    let mut hw = HardwareAdapter::new(config.period_ms);
    let mut app = AppService::new(config).unwrap();
    let mut sink = LogSink::new();

    let compressor_pin = || hw_init::sim_gpio_level(pins::COMPRESSOR_RELAY_GPIO);

    set_temps([30.0, 40.0, 35.0, 25.0]);
    app.start(&mut hw, 0, &mut sink).unwrap();
    assert_eq!(compressor_pin(), hw_init::relay_level(false));

    app.tick(&mut hw, 1_000, &mut sink).unwrap();
    hw.run_pump_period(&mut NoDelay).unwrap();
    assert_eq!(app.state(), ControlState::Heating);
    assert_eq!(compressor_pin(), hw_init::relay_level(true));
    assert_eq!(hw.pump_pulse_ms(), 500);

    let top = app.last_temperatures().unwrap().hwc_top();
    assert!((top - 35.0).abs() < 0.2, "top read back as {top}");

    // A probe whose ADC read fails spoils every batch: fail safe.
    sim_fail_adc(Channel::HwcTop, true);
    app.tick(&mut hw, 2_000, &mut sink).unwrap();
    assert_eq!(app.state(), ControlState::Recycling);
    assert_eq!(compressor_pin(), hw_init::relay_level(false));
    assert_eq!(hw.pump_pulse_ms(), 200);
    assert!(sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::SensorFault { at_ms: 2_000, .. })));
    sim_fail_adc(Channel::HwcTop, false);

    // Fatal path: a dead relay output.
    hw_init::sim_fail_gpio(pins::HEATER_RELAY_GPIO, true);
    assert!(app.shutdown(&mut hw, 3_000, &mut sink).is_err());
    assert!(!hw.compressor_energized());
    hw_init::sim_reset();
}
