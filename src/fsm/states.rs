//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers, so the table needs no
//! closures or heap.
//!
//! ```text
//!  SAFE ──[power hold]──▶ SAFE READY ──[limit pressed]──▶ ARMED FLY
//!    ▲                                                        │
//!    │                                               [limit released]
//!    │                                                        ▼
//!    │                     IR FLASH ◀──[altitude ok]── ARMED SENSE
//!    │                        │       ◀──[manual fire]──┘
//!    │                  [fire sequence]
//!    │                        ▼
//!    └──[cooldown done]── EXPENDED
//!
//!  Any state ──[reset / power hold]──▶ SAFE
//! ```

use super::context::DeviceContext;
use super::{DeviceState, StateDescriptor};
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; DeviceState::COUNT] {
    [
        // Index 0: Safe
        StateDescriptor {
            id: DeviceState::Safe,
            on_enter: Some(safe_enter),
            on_exit: None,
            on_update: safe_update,
        },
        // Index 1: SafeReady
        StateDescriptor {
            id: DeviceState::SafeReady,
            on_enter: Some(safe_ready_enter),
            on_exit: None,
            on_update: safe_ready_update,
        },
        // Index 2: ArmedFly
        StateDescriptor {
            id: DeviceState::ArmedFly,
            on_enter: Some(armed_fly_enter),
            on_exit: None,
            on_update: armed_fly_update,
        },
        // Index 3: ArmedSensing
        StateDescriptor {
            id: DeviceState::ArmedSensing,
            on_enter: Some(armed_sensing_enter),
            on_exit: None,
            on_update: armed_sensing_update,
        },
        // Index 4: ArmedIrFlash
        StateDescriptor {
            id: DeviceState::ArmedIrFlash,
            on_enter: Some(ir_flash_enter),
            on_exit: None,
            on_update: ir_flash_update,
        },
        // Index 5: Expended
        StateDescriptor {
            id: DeviceState::Expended,
            on_enter: Some(expended_enter),
            on_exit: Some(expended_exit),
            on_update: expended_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  SAFE: outputs inhibited until the operator holds power
// ═══════════════════════════════════════════════════════════════════════════

fn safe_enter(ctx: &mut DeviceContext) {
    ctx.clear_arming_inputs();
    info!("SAFE: inputs cleared, shots fired so far: {}", ctx.shot_count);
}

fn safe_update(_ctx: &mut DeviceContext) -> Option<DeviceState> {
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  SAFE READY: waiting for the device to be seated on the limit switch
// ═══════════════════════════════════════════════════════════════════════════

fn safe_ready_enter(_ctx: &mut DeviceContext) {
    info!("SAFE READY: waiting for limit switch");
}

fn safe_ready_update(ctx: &mut DeviceContext) -> Option<DeviceState> {
    if ctx.inputs.limit_pressed {
        return Some(DeviceState::ArmedFly);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ARMED FLY: seated; release from the carrier arms the sensor stage
// ═══════════════════════════════════════════════════════════════════════════

fn armed_fly_enter(_ctx: &mut DeviceContext) {
    info!("ARMED FLY: seated, waiting for release");
}

fn armed_fly_update(ctx: &mut DeviceContext) -> Option<DeviceState> {
    if !ctx.inputs.limit_pressed {
        return Some(DeviceState::ArmedSensing);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ARMED SENSE: released; fires once the altitude sensor reports ready
// ═══════════════════════════════════════════════════════════════════════════

fn armed_sensing_enter(_ctx: &mut DeviceContext) {
    info!("ARMED SENSE: waiting for altitude (or manual fire)");
}

fn armed_sensing_update(ctx: &mut DeviceContext) -> Option<DeviceState> {
    if ctx.inputs.altitude_ok {
        return Some(DeviceState::ArmedIrFlash);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  IR FLASH: one-shot, the first tick that observes it transmits
// ═══════════════════════════════════════════════════════════════════════════

fn ir_flash_enter(ctx: &mut DeviceContext) {
    info!(
        "IR FLASH: transmit armed on '{}'",
        ctx.active_protocol().name
    );
}

fn ir_flash_update(ctx: &mut DeviceContext) -> Option<DeviceState> {
    ctx.fire();
    Some(DeviceState::Expended)
}

// ═══════════════════════════════════════════════════════════════════════════
//  EXPENDED: cooldown after a shot, then back to SAFE
// ═══════════════════════════════════════════════════════════════════════════

fn expended_enter(ctx: &mut DeviceContext) {
    let deadline = ctx.now.saturating_add(ctx.config.expended_duration_ms);
    ctx.expended_deadline = Some(deadline);
    info!(
        "EXPENDED: cooldown {}ms (until t={}ms)",
        ctx.config.expended_duration_ms, deadline
    );
}

fn expended_exit(ctx: &mut DeviceContext) {
    ctx.expended_deadline = None;
}

fn expended_update(ctx: &mut DeviceContext) -> Option<DeviceState> {
    match ctx.expended_deadline {
        Some(deadline) if ctx.now >= deadline => Some(DeviceState::Safe),
        _ => None,
    }
}
