//! Read-only status snapshot for presentation.
//!
//! A [`DeviceSnapshot`] is built fresh after every tick and event.  All
//! transient flags are computed from recorded start timestamps and the
//! snapshot's `taken_at`, so capturing twice at the same time yields the
//! same snapshot.

use core::fmt;

use heapless::String;
use serde::Serialize;

use crate::drivers::status_leds::Indicators;
use crate::fsm::DeviceState;
use crate::fsm::context::{ConfirmMode, DeviceContext};
use crate::protocol::{MAX_NAME_LEN, Side};
use crate::time::Millis;

/// Immutable view of the device at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSnapshot {
    /// Time the snapshot describes.
    pub taken_at: Millis,
    pub state: DeviceState,

    // -- Selectors --
    pub active_protocol_index: usize,
    pub protocol_name: String<MAX_NAME_LEN>,
    pub side: Side,
    pub confirm_mode: ConfirmMode,

    // -- Latched inputs --
    pub limit_pressed: bool,
    pub altitude_ok: bool,

    // -- Counters / transient flags --
    pub shot_count: u32,
    /// "IR FLASHED" toast on display.
    pub flash_toast_active: bool,
    /// A confirmation banner is on display.
    pub confirmed_active: bool,
    /// The latest shot is confirmed (and still on display).
    pub confirmed_value: bool,

    // -- Deadlines --
    pub expended_deadline: Option<Millis>,
    /// Whole seconds left on the cooldown; `Some` only while EXPENDED.
    pub expended_remaining_secs: Option<u64>,
    pub confirm_window_deadline: Option<Millis>,
    pub confirm_window_open: bool,

    pub indicators: Indicators,
}

impl DeviceSnapshot {
    pub fn capture(state: DeviceState, ctx: &DeviceContext, now: Millis) -> Self {
        let protocol = ctx.active_protocol();
        Self {
            taken_at: now,
            state,
            active_protocol_index: ctx.selection.protocol_index,
            protocol_name: protocol.name.clone(),
            side: ctx.selection.side,
            confirm_mode: ctx.selection.confirm_mode,
            limit_pressed: ctx.inputs.limit_pressed,
            altitude_ok: ctx.inputs.altitude_ok,
            shot_count: ctx.shot_count,
            flash_toast_active: ctx.flash_toast_active(now),
            confirmed_active: ctx.confirmed_active(now),
            confirmed_value: ctx.confirmed_value(now),
            expended_deadline: ctx.expended_deadline,
            expended_remaining_secs: ctx.expended_remaining_ms(now).map(|ms| ms / 1000),
            confirm_window_deadline: ctx.confirm_window_deadline(),
            confirm_window_open: ctx.confirm_window_open(now),
            indicators: Indicators::for_state(state),
        }
    }
}

/// One-line status in the layout of the device display.
impl fmt::Display for DeviceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<11} #{} | {} | {} | LIM:{} ALT3m:{} | {:?}",
            self.state.label(),
            self.shot_count,
            self.protocol_name,
            self.side.label(),
            if self.limit_pressed { "ON" } else { "OFF" },
            if self.altitude_ok { "YES" } else { "NO" },
            self.confirm_mode,
        )?;
        if let Some(secs) = self.expended_remaining_secs {
            write!(f, " | T-{secs}s")?;
        }
        if self.flash_toast_active {
            f.write_str(" | IR FLASHED")?;
        }
        if self.confirmed_value {
            f.write_str(" | CONFIRMED")?;
        }
        Ok(())
    }
}
