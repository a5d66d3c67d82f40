//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  StateTable                                                   │
//! │  ┌──────────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ DeviceState  │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├──────────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ Safe         │ fn(ctx)   │    -     │ fn(ctx)->Option<> │  │
//! │  │ SafeReady    │ fn(ctx)   │    -     │ fn(ctx)->Option<> │  │
//! │  │ ArmedFly     │ fn(ctx)   │    -     │ fn(ctx)->Option<> │  │
//! │  │ ArmedSensing │ fn(ctx)   │    -     │ fn(ctx)->Option<> │  │
//! │  │ ArmedIrFlash │ fn(ctx)   │    -     │ fn(ctx)->Option<> │  │
//! │  │ Expended     │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  └──────────────┴───────────┴──────────┴───────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer.  At most one transition happens per tick.  All
//! functions receive `&mut DeviceContext`, which holds inputs,
//! selectors, timers, and configuration.

pub mod context;
pub mod states;

use context::DeviceContext;
use log::info;
use serde::Serialize;

use crate::time::{Millis, elapsed};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all device modes.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum DeviceState {
    Safe = 0,
    SafeReady = 1,
    ArmedFly = 2,
    ArmedSensing = 3,
    ArmedIrFlash = 4,
    Expended = 5,
}

impl DeviceState {
    /// Total number of states; sizes the table array.
    pub const COUNT: usize = 6;

    /// Every state, in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Safe,
        Self::SafeReady,
        Self::ArmedFly,
        Self::ArmedSensing,
        Self::ArmedIrFlash,
        Self::Expended,
    ];

    /// Convert a table index back to `DeviceState`.  Panics on out-of-range
    /// in debug builds; returns `Safe` in release.
    pub fn from_index(idx: usize) -> Self {
        if let Some(&state) = Self::ALL.get(idx) {
            state
        } else {
            debug_assert!(false, "invalid state index: {idx}");
            Self::Safe
        }
    }

    /// Label shown on the device display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::SafeReady => "SAFE READY",
            Self::ArmedFly => "ARMED FLY",
            Self::ArmedSensing => "ARMED SENSE",
            Self::ArmedIrFlash => "IR FLASH",
            Self::Expended => "EXPENDED",
        }
    }

    /// Whether the amber "armed" indicator covers this state.
    pub fn is_armed(self) -> bool {
        matches!(
            self,
            Self::SafeReady | Self::ArmedFly | Self::ArmedSensing | Self::ArmedIrFlash
        )
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut DeviceContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut DeviceContext) -> Option<DeviceState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: DeviceState,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `DeviceState as usize`.
    table: [StateDescriptor; DeviceState::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Number of ticks evaluated.
    tick_count: u64,
    /// Timestamp at which the current state was entered.
    entered_at: Millis,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; DeviceState::COUNT], initial: DeviceState) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            entered_at: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut DeviceContext) {
        info!("FSM starting in state: {}", self.table[self.current].id.label());
        self.entered_at = ctx.now;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut DeviceContext) {
        self.tick_count += 1;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Force an immediate transition (event-driven paths such as power
    /// hold, manual fire, and reset).  Re-entering the current state is a
    /// no-op.
    pub fn force_transition(&mut self, next: DeviceState, ctx: &mut DeviceContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> DeviceState {
        DeviceState::from_index(self.current)
    }

    /// Milliseconds spent in the current state as of `now`.
    pub fn time_in_state(&self, now: Millis) -> Millis {
        elapsed(now, self.entered_at)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: DeviceState, ctx: &mut DeviceContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].id.label(),
            self.table[next_idx].id.label()
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.entered_at = ctx.now;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
