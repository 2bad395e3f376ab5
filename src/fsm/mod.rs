//! Thermostat state machine.
//!
//! Function-pointer FSM engine plus the [`Thermostat`] wrapper the
//! service drives once per tick:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌───────────┬───────────┬──────────┬───────────────────┐    │
//! │  │ State     │ on_enter  │ on_exit  │ on_update         │    │
//! │  ├───────────┼───────────┼──────────┼───────────────────┤    │
//! │  │ Idle      │ fn(ctx)   │ -        │ fn(ctx)->Option<> │    │
//! │  │ Heating   │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │    │
//! │  │ Recycling │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │    │
//! │  └───────────┴───────────┴──────────┴───────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer.

pub mod context;
pub mod states;

use context::FsmContext;
use log::{info, warn};
use serde::Serialize;

use crate::config::SystemConfig;
use crate::sensors::AveragedTemperatures;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// The thermostat's control state.  Exactly one is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum ControlState {
    /// Compressor off, heating allowed.
    Idle = 0,
    /// Compressor on.
    Heating = 1,
    /// Compressor off, restart locked out until the recycle timer runs out.
    Recycling = 2,
}

impl ControlState {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 3;

    /// Convert an index back to `ControlState`.  Out-of-range indices fall
    /// back to `Recycling`, which keeps the compressor off.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Heating,
            2 => Self::Recycling,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Recycling
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<ControlState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: ControlState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `ControlState as usize`.
    table: [StateDescriptor; ControlState::COUNT],
    /// Index of the currently active state.
    current: usize,
    tick_count: u64,
    /// Tick at which the current state was entered.
    state_entry_tick: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; ControlState::COUNT], initial: ControlState) -> Self {
        debug_assert!(table.iter().enumerate().all(|(i, d)| d.id as usize == i));
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut FsmContext) {
        self.tick_count += 1;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Force an immediate transition, bypassing `on_update`.
    pub fn force_transition(&mut self, next: ControlState, ctx: &mut FsmContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> ControlState {
        ControlState::from_index(self.current)
    }

    /// How many ticks the FSM has been in the current state.
    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    fn transition(&mut self, next_id: ControlState, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

// ---------------------------------------------------------------------------
// Thermostat
// ---------------------------------------------------------------------------

/// Thermostatic decision core: owns the FSM and its context.
pub struct Thermostat {
    fsm: Fsm,
    ctx: FsmContext,
}

impl Thermostat {
    /// Build a thermostat in `Idle`.  Call [`start`](Self::start) before
    /// the first evaluation.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            fsm: Fsm::new(states::build_state_table(), ControlState::Idle),
            ctx: FsmContext::new(config),
        }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.ctx.now_ms = now_ms;
        self.fsm.start(&mut self.ctx);
    }

    /// Feed one tick's readings and return the resulting state.
    pub fn evaluate(&mut self, temps: &AveragedTemperatures, now_ms: u64) -> ControlState {
        self.ctx.now_ms = now_ms;
        self.ctx.temps = Some(*temps);
        self.fsm.tick(&mut self.ctx);
        self.fsm.current_state()
    }

    /// Tick without readings.  A running compressor is stopped and the
    /// recycle lockout starts; otherwise the lockout keeps counting and
    /// Idle stays Idle.
    pub fn fail_safe(&mut self, now_ms: u64) -> ControlState {
        self.ctx.now_ms = now_ms;
        self.ctx.temps = None;

        if self.fsm.current_state() == ControlState::Heating {
            warn!("Thermostat: no readings while heating, stopping compressor");
            self.fsm.force_transition(ControlState::Recycling, &mut self.ctx);
        } else {
            self.fsm.tick(&mut self.ctx);
        }
        self.fsm.current_state()
    }

    pub fn state(&self) -> ControlState {
        self.fsm.current_state()
    }

    /// Elapsed lockout time; `None` unless Recycling.
    pub fn recycle_elapsed_ms(&self) -> Option<u64> {
        (self.state() == ControlState::Recycling).then(|| self.ctx.recycle_elapsed_ms())
    }

    /// Lockout time left; `None` unless Recycling.
    pub fn recycle_remaining_ms(&self) -> Option<u64> {
        (self.state() == ControlState::Recycling).then(|| self.ctx.recycle_remaining_ms())
    }

    /// Ticks spent in the current state.
    pub fn ticks_in_state(&self) -> u64 {
        self.fsm.ticks_in_current_state()
    }
}
