//! Shared mutable context threaded through every FSM handler.
//!
//! `DeviceContext` is the single struct that state handlers read from and
//! write to: the latched sensor inputs, the operator's selectors, the
//! shot/confirmation record, the expended deadline, the deferred-work
//! queue, and the configuration.  Anything time-dependent is derived from
//! [`DeviceContext::now`] and a recorded start timestamp, so reading it
//! never mutates it.

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::DeviceConfig;
use crate::error::ConfigError;
use crate::protocol::{Frame, ProtocolEntry, ProtocolRegistry, Side};
use crate::scheduler::{DeferredAction, DeferredQueue};
use crate::time::{Millis, elapsed};

// ---------------------------------------------------------------------------
// Inputs and selectors
// ---------------------------------------------------------------------------

/// Latched discrete inputs.  Set by toggle events, cleared on every
/// return to SAFE.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorInputs {
    /// Mechanical limit switch (true = pressed / device seated).
    pub limit_pressed: bool,
    /// Altitude sensor reports the release height has been reached.
    pub altitude_ok: bool,
}

/// How a fired burst gets confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ConfirmMode {
    /// Self-sense hardware confirms after a fixed delay.
    #[default]
    Auto,
    /// The operator must send `ConfirmNow` inside the window.
    Manual,
}

impl ConfirmMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Auto => Self::Manual,
            Self::Manual => Self::Auto,
        }
    }
}

/// Operator selections.  Never touched by the FSM itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub protocol_index: usize,
    pub side: Side,
    pub confirm_mode: ConfirmMode,
}

// ---------------------------------------------------------------------------
// Shot bookkeeping
// ---------------------------------------------------------------------------

/// One completed fire sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotRecord {
    /// 1-based shot number (equals `shot_count` right after firing).
    pub number: u32,
    /// When the burst went out; start of both the toast and the
    /// confirmation window.
    pub fired_at: Millis,
    pub protocol_id: u8,
    /// Transmitted word, side bit applied.
    pub frame: Frame,
}

/// A registered self-sense confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    /// Shot the confirmation was issued for.
    pub shot: u32,
    pub at: Millis,
    /// Came from the deferred auto-confirm rather than `ConfirmNow`.
    pub auto: bool,
}

/// Result of a manual confirmation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    /// The current shot was already confirmed; the display timestamp was
    /// refreshed but no new confirmation is reported.
    Refreshed,
    /// The window closed before the press arrived.
    Late,
    /// Nothing has been fired yet.
    NoShot,
    /// Manual confirmation is disabled in auto mode.
    AutoMode,
}

// ---------------------------------------------------------------------------
// DeviceContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct DeviceContext {
    // -- Timing --
    /// Timestamp of the tick or event currently being processed.
    pub now: Millis,
    /// Set on entering EXPENDED, cleared on leaving it.
    pub expended_deadline: Option<Millis>,
    /// Time-keyed deferred actions (auto-confirm).
    pub deferred: DeferredQueue,

    // -- Inputs / selectors --
    pub inputs: SensorInputs,
    pub selection: Selection,

    // -- Shot record --
    /// Completed fire sequences; only ever increases.
    pub shot_count: u32,
    pub last_shot: Option<ShotRecord>,
    pub confirmation: Option<Confirmation>,

    // -- Outbox (drained by the controller after each step) --
    fired: Option<ShotRecord>,
    confirmed: Option<Confirmation>,

    // -- Configuration --
    pub config: DeviceConfig,
    pub protocols: ProtocolRegistry,
}

impl DeviceContext {
    /// Create a context for `config`.  Fails if the protocol table is
    /// unusable.
    pub fn new(config: DeviceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let protocols = ProtocolRegistry::from_specs(&config.protocols)?;
        Ok(Self {
            now: 0,
            expended_deadline: None,
            deferred: DeferredQueue::new(),
            inputs: SensorInputs::default(),
            selection: Selection::default(),
            shot_count: 0,
            last_shot: None,
            confirmation: None,
            fired: None,
            confirmed: None,
            config,
            protocols,
        })
    }

    /// Clear the latched arming inputs (every return to SAFE).
    pub fn clear_arming_inputs(&mut self) {
        self.inputs = SensorInputs::default();
    }

    pub fn active_protocol(&self) -> &ProtocolEntry {
        self.protocols.get(self.selection.protocol_index)
    }

    // ── Fire sequence ─────────────────────────────────────────

    /// Count the shot, stamp the toast and confirmation window, and queue
    /// the auto-confirm when in auto mode.  The caller moves the FSM to
    /// EXPENDED, whose `on_enter` sets the cooldown deadline.
    pub fn fire(&mut self) {
        self.shot_count += 1;

        let entry = self.active_protocol();
        let frame = entry
            .code
            .with_side(self.selection.side, self.config.frame.side_bit_index);
        let shot = ShotRecord {
            number: self.shot_count,
            fired_at: self.now,
            protocol_id: entry.id,
            frame,
        };
        info!(
            "FIRE: shot #{} protocol={} side={} frame={}",
            shot.number,
            entry.name,
            self.selection.side.label(),
            frame
        );

        self.last_shot = Some(shot);
        self.confirmation = None;
        self.fired = Some(shot);

        if self.selection.confirm_mode == ConfirmMode::Auto {
            let due = self.now.saturating_add(self.config.auto_confirm_delay_ms);
            let action = DeferredAction::AutoConfirm { shot: shot.number };
            if let Err(e) = self.deferred.schedule(due, action) {
                warn!(
                    "FIRE: auto-confirm for shot #{} not deferred ({}), confirming now",
                    shot.number, e
                );
                self.record_confirmation(shot.number, true);
            }
        }
    }

    // ── Confirmation ──────────────────────────────────────────

    /// Register a confirmation for `shot` at the current time.
    pub fn record_confirmation(&mut self, shot: u32, auto: bool) {
        let confirmation = Confirmation {
            shot,
            at: self.now,
            auto,
        };
        self.confirmation = Some(confirmation);
        self.confirmed = Some(confirmation);
    }

    /// Operator-issued confirmation; accepted only in manual mode and
    /// only while the latest shot's window is open.
    pub fn try_manual_confirm(&mut self) -> ConfirmOutcome {
        if self.selection.confirm_mode != ConfirmMode::Manual {
            debug!("CONFIRM: ignored in auto mode");
            return ConfirmOutcome::AutoMode;
        }
        let Some(shot) = self.last_shot else {
            debug!("CONFIRM: ignored, nothing fired yet");
            return ConfirmOutcome::NoShot;
        };
        let since_shot = elapsed(self.now, shot.fired_at);
        if since_shot > self.config.confirm_window_ms {
            warn!(
                "CONFIRM: shot #{} window closed {}ms ago",
                shot.number,
                since_shot - self.config.confirm_window_ms
            );
            return ConfirmOutcome::Late;
        }
        if let Some(c) = self.confirmation.as_mut().filter(|c| c.shot == shot.number) {
            debug!("CONFIRM: shot #{} re-confirmed", shot.number);
            c.at = self.now;
            c.auto = false;
            return ConfirmOutcome::Refreshed;
        }
        self.record_confirmation(shot.number, false);
        ConfirmOutcome::Confirmed
    }

    // ── Outbox ────────────────────────────────────────────────

    /// Shot fired since the last call, if any.
    pub fn take_fired(&mut self) -> Option<ShotRecord> {
        self.fired.take()
    }

    /// Confirmation registered since the last call, if any.
    pub fn take_confirmed(&mut self) -> Option<Confirmation> {
        self.confirmed.take()
    }

    // ── Time-derived views (pure in `now`) ────────────────────

    /// "IR FLASHED" toast visible at `now`.
    pub fn flash_toast_active(&self, now: Millis) -> bool {
        self.last_shot
            .is_some_and(|s| elapsed(now, s.fired_at) < self.config.flash_toast_window_ms)
    }

    /// A confirmation (for any shot) is still on display at `now`.
    pub fn confirmed_active(&self, now: Millis) -> bool {
        self.confirmation
            .is_some_and(|c| elapsed(now, c.at) < self.config.confirm_show_window_ms)
    }

    /// The latest shot is confirmed and the confirmation is on display.
    pub fn confirmed_value(&self, now: Millis) -> bool {
        let current = self.last_shot.map(|s| s.number);
        self.confirmed_active(now) && self.confirmation.map(|c| c.shot) == current
    }

    /// Close of the latest shot's confirmation window.
    pub fn confirm_window_deadline(&self) -> Option<Millis> {
        self.last_shot
            .map(|s| s.fired_at.saturating_add(self.config.confirm_window_ms))
    }

    /// Whether a manual `ConfirmNow` would still be inside the window.
    pub fn confirm_window_open(&self, now: Millis) -> bool {
        self.last_shot
            .is_some_and(|s| elapsed(now, s.fired_at) <= self.config.confirm_window_ms)
    }

    /// Milliseconds left on the expended cooldown.
    pub fn expended_remaining_ms(&self, now: Millis) -> Option<Millis> {
        self.expended_deadline.map(|d| d.saturating_sub(now))
    }
}
