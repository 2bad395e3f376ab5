//! HWC heat-pump controller firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter           LogEventSink        Esp32TimeAdapter│
//! │  (TemperatureSource +      (EventSink +        (Clock)         │
//! │   ActuatorSink)             DiagnosticLog)                     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  SensorReader · Thermostat · DutyController ·          │    │
//! │  │  ActuatorDriver                                        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop is paced by the pump's software PWM: every iteration runs one
//! control tick, then one full pump period, then feeds the watchdog.
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use log::{error, info, warn};

use hwc_heatpump::adapters::hardware::HardwareAdapter;
use hwc_heatpump::adapters::log_sink::LogEventSink;
use hwc_heatpump::adapters::time::Esp32TimeAdapter;
use hwc_heatpump::app::ports::Clock;
use hwc_heatpump::app::service::AppService;
use hwc_heatpump::config::SystemConfig;
use hwc_heatpump::diagnostics;
use hwc_heatpump::drivers::hw_init;
use hwc_heatpump::drivers::watchdog::Watchdog;

/// Optional JSON override baked in at build time, e.g.
/// `HWC_CONFIG_JSON='{"target_temperature_c":58}' cargo build`.
const CONFIG_OVERRIDE: Option<&str> = option_env!("HWC_CONFIG_JSON");

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    diagnostics::install_panic_handler();

    info!("╔══════════════════════════════════════╗");
    info!("║  HWC heat pump v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (validated before any actuation) ─────
    let config = match CONFIG_OVERRIDE {
        Some(json) => match SystemConfig::from_json(json) {
            Ok(cfg) => {
                info!("Config: build-time override applied");
                cfg
            }
            Err(e) => halt(&format!("config override rejected: {e}")),
        },
        None => SystemConfig::default(),
    };
    let mut service = match AppService::new(config.clone()) {
        Ok(svc) => svc,
        Err(e) => halt(&format!("configuration invalid: {e}")),
    };
    info!("Config: {:?}", config);
    info!("Control period {:.1}s", config.tick_secs());

    // ── 3. Hardware ───────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        halt(&format!("HAL init failed: {e}"));
    }
    let mut hw = HardwareAdapter::new(config.period_ms);
    let mut watchdog = Watchdog::new(Watchdog::timeout_for_period(config.period_ms));
    let clock = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();
    let mut delay = FreeRtos;

    // ── 4. Start ──────────────────────────────────────────────
    if let Err(e) = service.start(&mut hw, clock.now_ms(), &mut sink) {
        fatal(&mut service, &mut hw, &clock, &mut sink, &e.to_string());
    }
    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        if let Err(e) = service.tick(&mut hw, clock.now_ms(), &mut sink) {
            fatal(&mut service, &mut hw, &clock, &mut sink, &e.to_string());
        }
        if let Err(e) = hw.run_pump_period(&mut delay) {
            fatal(&mut service, &mut hw, &clock, &mut sink, &e.to_string());
        }
        watchdog.feed();
    }
}

/// Startup failure before any output was touched: log and park.  The
/// watchdog is not yet subscribed, so the board stays halted.
fn halt(reason: &str) -> ! {
    error!("{}, halting", reason);
    loop {
        FreeRtos::delay_ms(1_000);
    }
}

/// Actuator failure: force every output off, dump history, and stop
/// feeding the watchdog so it resets the board.
fn fatal(
    service: &mut AppService,
    hw: &mut HardwareAdapter,
    clock: &Esp32TimeAdapter,
    sink: &mut LogEventSink,
    reason: &str,
) -> ! {
    error!("FATAL: {}", reason);
    if let Err(e) = service.shutdown(hw, clock.now_ms(), sink) {
        warn!("shutdown incomplete: {}", e);
    }
    sink.dump();
    loop {
        FreeRtos::delay_ms(1_000);
    }
}
