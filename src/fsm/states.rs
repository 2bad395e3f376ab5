//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!  IDLE ──[bottom < min, HEX below ceilings]──▶ HEATING
//!    ▲                                             │
//!    │                     [bottom >= max | top >= target | hex_out trip]
//!    │                                             ▼
//!    └──────────[recycle_time elapsed]──────── RECYCLING
//! ```

use super::context::FsmContext;
use super::{ControlState, StateDescriptor};
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; ControlState::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: ControlState::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Heating
        StateDescriptor {
            id: ControlState::Heating,
            name: "Heating",
            on_enter: Some(heating_enter),
            on_exit: Some(heating_exit),
            on_update: heating_update,
        },
        // Index 2: Recycling
        StateDescriptor {
            id: ControlState::Recycling,
            name: "Recycling",
            on_enter: Some(recycling_enter),
            on_exit: Some(recycling_exit),
            on_update: recycling_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state: compressor off, waiting for the cylinder to cool
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(_ctx: &mut FsmContext) {
    info!("IDLE: compressor off, monitoring cylinder");
}

fn idle_update(ctx: &mut FsmContext) -> Option<ControlState> {
    let t = ctx.temps?;
    let c = &ctx.config;

    if t.hwc_bottom() < c.hwc_bottom_temp_min_c
        && t.hex_in() < c.hex_in_temp_max_c
        && t.hex_out() < c.hex_out_temp_max_c
    {
        info!(
            "IDLE: cylinder bottom {:.2} < {:.2} → heating",
            t.hwc_bottom(),
            c.hwc_bottom_temp_min_c
        );
        return Some(ControlState::Heating);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  HEATING state: compressor running, pump modulating
// ═══════════════════════════════════════════════════════════════════════════

fn heating_enter(ctx: &mut FsmContext) {
    if let Some(t) = ctx.temps {
        info!(
            "HEATING: compressor on (HEX {:.2}/{:.2}, HWC {:.2}/{:.2})",
            t.hex_in(),
            t.hex_out(),
            t.hwc_top(),
            t.hwc_bottom()
        );
    }
}

fn heating_exit(_ctx: &mut FsmContext) {
    info!("HEATING: compressor stopping");
}

fn heating_update(ctx: &mut FsmContext) -> Option<ControlState> {
    let t = ctx.temps?;
    let c = &ctx.config;

    if t.hex_out() >= c.hex_out_temp_max_c {
        warn!(
            "HEATING: exchanger outlet {:.2} >= {:.2} ceiling, tripping",
            t.hex_out(),
            c.hex_out_temp_max_c
        );
        return Some(ControlState::Recycling);
    }
    if t.hwc_bottom() >= c.hwc_bottom_temp_max_c {
        info!("HEATING: cylinder bottom {:.2} reached {:.2}", t.hwc_bottom(), c.hwc_bottom_temp_max_c);
        return Some(ControlState::Recycling);
    }
    if t.hwc_top() >= c.target_temperature_c {
        info!("HEATING: cylinder top {:.2} reached target {:.2}", t.hwc_top(), c.target_temperature_c);
        return Some(ControlState::Recycling);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  RECYCLING state: compressor lockout after a stop
// ═══════════════════════════════════════════════════════════════════════════

fn recycling_enter(ctx: &mut FsmContext) {
    ctx.recycle_started_ms = ctx.now_ms;
    info!(
        "RECYCLING: compressor locked out for {}s",
        ctx.config.recycle_time_ms / 1000
    );
}

fn recycling_exit(ctx: &mut FsmContext) {
    info!(
        "RECYCLING: lockout over after {}s",
        ctx.recycle_elapsed_ms() / 1000
    );
}

fn recycling_update(ctx: &mut FsmContext) -> Option<ControlState> {
    // Temperatures are deliberately ignored: nothing restarts the
    // compressor before the lockout runs out.
    if ctx.recycle_elapsed_ms() >= ctx.config.recycle_time_ms {
        return Some(ControlState::Idle);
    }

    None
}
