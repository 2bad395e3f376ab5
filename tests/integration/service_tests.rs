//! Integration tests for the AppService → Thermostat → actuators pipeline.
//!
//! These run on the host (x86_64) and drive the service tick by tick
//! against the mock hardware, checking the full control behaviour
//! (heating cycle, recycle lockout, fail-safe, fatal actuation).

use crate::mock_hw::{ActuatorCall, LogSink, MockHardware};

use hwc_heatpump::app::commands::AppCommand;
use hwc_heatpump::app::events::AppEvent;
use hwc_heatpump::app::ports::Relay;
use hwc_heatpump::app::service::AppService;
use hwc_heatpump::config::SystemConfig;
use hwc_heatpump::error::{ActuatorError, Error, SensorError};
use hwc_heatpump::fsm::ControlState;
use hwc_heatpump::sensors::Channel;

const TICK_MS: u64 = 1_000;
const RECYCLE_MS: u64 = 300_000;
/// hex_in, hex_out, top, bottom: a cylinder that wants heat.
const COLD: [f64; 4] = [30.0, 40.0, 35.0, 25.0];

fn make_app(temps: [f64; 4]) -> (AppService, MockHardware, LogSink) {
    let mut app = AppService::new(SystemConfig::default()).unwrap();
    let mut hw = MockHardware::new(temps);
    let mut sink = LogSink::new();
    app.start(&mut hw, 0, &mut sink).unwrap();
    (app, hw, sink)
}

// ── Heating cycle ─────────────────────────────────────────────

#[test]
fn full_cycle_honours_recycle_lockout() {
    let (mut app, mut hw, mut sink) = make_app(COLD);

    app.tick(&mut hw, TICK_MS, &mut sink).unwrap();
    assert_eq!(app.state(), ControlState::Heating);
    assert!(hw.compressor_on());

    // Top of cylinder reaches target.
    hw.set(Channel::HwcTop, 56.0);
    app.tick(&mut hw, 10 * TICK_MS, &mut sink).unwrap();
    assert_eq!(app.state(), ControlState::Recycling);
    assert!(!hw.compressor_on());
    assert_eq!(hw.pump_duty(), Some(0.2));

    // Hot water drawn off: the bottom goes cold again, but the
    // compressor must stay locked out.
    hw.set(Channel::HwcTop, 40.0);
    hw.set(Channel::HwcBottom, 20.0);
    let stop = 10 * TICK_MS;
    let mut t = stop + TICK_MS;
    while t < stop + RECYCLE_MS {
        app.tick(&mut hw, t, &mut sink).unwrap();
        assert_eq!(app.state(), ControlState::Recycling, "restarted at t={t}");
        assert!(!hw.compressor_on());
        t += TICK_MS;
    }

    app.tick(&mut hw, stop + RECYCLE_MS, &mut sink).unwrap();
    assert_eq!(app.state(), ControlState::Idle);
    app.tick(&mut hw, stop + RECYCLE_MS + TICK_MS, &mut sink).unwrap();
    assert_eq!(app.state(), ControlState::Heating);
    assert!(hw.compressor_on());

    assert_eq!(
        sink.state_changes(),
        vec![
            (TICK_MS, ControlState::Heating),
            (stop, ControlState::Recycling),
            (stop + RECYCLE_MS, ControlState::Idle),
            (stop + RECYCLE_MS + TICK_MS, ControlState::Heating),
        ]
    );
}

#[test]
fn outlet_overtemperature_trips_heating() {
    let (mut app, mut hw, mut sink) = make_app(COLD);
    app.tick(&mut hw, TICK_MS, &mut sink).unwrap();

    hw.set(Channel::HeatExOut, 65.0);
    app.tick(&mut hw, 2 * TICK_MS, &mut sink).unwrap();
    assert_eq!(app.state(), ControlState::Recycling);
    assert!(!hw.compressor_on());
}

#[test]
fn hot_exchanger_inlet_blocks_start() {
    let (mut app, mut hw, mut sink) = make_app([61.0, 40.0, 35.0, 25.0]);
    for i in 1..=10 {
        app.tick(&mut hw, i * TICK_MS, &mut sink).unwrap();
    }
    assert_eq!(app.state(), ControlState::Idle);
    assert_eq!(hw.relay_state(Relay::Compressor), Some(false));
}

// ── Pump modulation ───────────────────────────────────────────

#[test]
fn sustained_hot_outlet_saturates_at_maximum_duty() {
    let (mut app, mut hw, mut sink) = make_app(COLD);
    app.tick(&mut hw, TICK_MS, &mut sink).unwrap();

    hw.set(Channel::HeatExOut, 60.0);
    for i in 2..=30 {
        app.tick(&mut hw, i * TICK_MS, &mut sink).unwrap();
        let duty = app.duty().fraction();
        assert!((0.2..=0.99).contains(&duty));
    }
    assert!((app.duty().fraction() - 0.99).abs() < 1e-9);
    assert_eq!(app.duty().pulse_ms(), 990);
    assert_eq!(hw.pump_duty(), Some(app.duty().fraction()));
}

#[test]
fn every_duty_call_is_recorded() {
    let (mut app, mut hw, mut sink) = make_app(COLD);
    app.tick(&mut hw, TICK_MS, &mut sink).unwrap();
    hw.set(Channel::HeatExOut, 55.0);
    app.tick(&mut hw, 2 * TICK_MS, &mut sink).unwrap();
    app.handle_command(AppCommand::DecreaseDuty(0.3), &mut hw, 2_500, &mut sink)
        .unwrap();

    let records: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::DutyChanged(r) => Some(*r),
            _ => None,
        })
        .collect();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].requested, 0.5);
    assert_eq!(records[0].pulse_ms, 500);
    assert_eq!(records[2].at_ms, 2_500);
    assert!((records[2].duty - 0.25).abs() < 1e-9);
    assert!(records.iter().all(|r| r.period_ms == 1000));
}

// ── Sensor faults ─────────────────────────────────────────────

#[test]
fn dead_probe_fails_safe_and_keeps_running() {
    let (mut app, mut hw, mut sink) = make_app(COLD);
    app.tick(&mut hw, TICK_MS, &mut sink).unwrap();
    assert!(hw.compressor_on());

    hw.dead[Channel::HwcBottom.index()] = true;
    let conversions_before = hw.conversions;
    app.tick(&mut hw, 2 * TICK_MS, &mut sink).unwrap();

    assert_eq!(hw.conversions - conversions_before, 20);
    assert_eq!(app.state(), ControlState::Recycling);
    assert!(!hw.compressor_on());
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::SensorFault {
                error: SensorError::RetriesExhausted { attempts: 20 },
                ..
            }
        )),
        1
    );

    // Probe comes back mid-lockout: telemetry resumes, heating does not.
    hw.dead[Channel::HwcBottom.index()] = false;
    app.tick(&mut hw, 3 * TICK_MS, &mut sink).unwrap();
    assert_eq!(app.state(), ControlState::Recycling);
    assert!(matches!(sink.events.last(), Some(AppEvent::Telemetry(_))));
}

#[test]
fn fault_while_idle_changes_nothing() {
    let (mut app, mut hw, mut sink) = make_app([30.0, 40.0, 50.0, 48.0]);
    app.tick(&mut hw, TICK_MS, &mut sink).unwrap();
    let calls = hw.calls.len();

    hw.set(Channel::HeatExIn, 0.0);
    app.tick(&mut hw, 2 * TICK_MS, &mut sink).unwrap();
    assert_eq!(app.state(), ControlState::Idle);
    assert_eq!(hw.calls.len(), calls);
}

// ── Actuation ─────────────────────────────────────────────────

#[test]
fn stuck_compressor_relay_is_fatal() {
    let (mut app, mut hw, mut sink) = make_app(COLD);
    hw.stuck_relay = Some(Relay::Compressor);

    assert_eq!(
        app.tick(&mut hw, TICK_MS, &mut sink),
        Err(Error::Actuator(ActuatorError::RelayWriteFailed(Relay::Compressor)))
    );

    // Shutdown still releases everything it can.
    hw.calls.clear();
    assert!(app.shutdown(&mut hw, 1_100, &mut sink).is_err());
    assert_eq!(
        hw.calls,
        vec![
            ActuatorCall::Relay {
                relay: Relay::Heater,
                energized: false
            },
            ActuatorCall::PumpDuty(0.2),
        ]
    );
}

#[test]
fn heater_command_is_idempotent() {
    let (mut app, mut hw, mut sink) = make_app(COLD);
    for _ in 0..3 {
        app.handle_command(AppCommand::SetBackupHeater(true), &mut hw, 500, &mut sink)
            .unwrap();
    }
    let heater_writes = hw
        .calls
        .iter()
        .filter(|c| matches!(c, ActuatorCall::Relay { relay: Relay::Heater, .. }))
        .count();
    assert_eq!(heater_writes, 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::BackupHeater { .. })), 1);
}

// ── Configuration ─────────────────────────────────────────────

#[test]
fn json_override_shortens_lockout() {
    let cfg = SystemConfig::from_json(r#"{"recycle_time_ms": 5000}"#).unwrap();
    let mut app = AppService::new(cfg).unwrap();
    let mut hw = MockHardware::new(COLD);
    let mut sink = LogSink::new();
    app.start(&mut hw, 0, &mut sink).unwrap();

    app.tick(&mut hw, 1_000, &mut sink).unwrap();
    hw.set(Channel::HwcBottom, 52.0);
    app.tick(&mut hw, 2_000, &mut sink).unwrap();
    assert_eq!(app.state(), ControlState::Recycling);

    hw.set(Channel::HwcBottom, 25.0);
    app.tick(&mut hw, 6_999, &mut sink).unwrap();
    assert_eq!(app.state(), ControlState::Recycling);
    app.tick(&mut hw, 7_000, &mut sink).unwrap();
    assert_eq!(app.state(), ControlState::Idle);
}

#[test]
fn event_timestamps_never_decrease() {
    let (mut app, mut hw, mut sink) = make_app(COLD);
    for i in 1..=20 {
        if i == 8 {
            hw.set(Channel::HwcTop, 60.0);
        }
        app.tick(&mut hw, i * TICK_MS, &mut sink).unwrap();
    }
    let stamps: Vec<u64> = sink.events.iter().map(AppEvent::timestamp_ms).collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
}
