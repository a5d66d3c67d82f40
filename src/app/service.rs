//! Device controller, the hexagonal core.
//!
//! [`DeviceController`] owns the FSM, the shared context, and an event
//! sink.  It exposes two entry points, both synchronous and O(1):
//!
//! ```text
//!   tick(now) ──────────┐      ┌──────────────────────┐
//!                       ├────▶ │   DeviceController   │ ──▶ EventSink
//!   handle_event(e, now)┘      │  deferred · FSM      │
//!                              └──────────┬───────────┘
//!                                         ▼
//!                                  DeviceSnapshot
//! ```
//!
//! The controller does no internal locking; a host that drives it from
//! several threads must serialise calls.

use log::{debug, info, warn};

use crate::config::DeviceConfig;
use crate::error::Result;
use crate::fsm::context::{ConfirmOutcome, DeviceContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{DeviceState, Fsm};
use crate::scheduler::DeferredAction;
use crate::time::Millis;

use super::commands::InputEvent;
use super::events::DeviceEvent;
use super::ports::{EventSink, NullSink};
use super::snapshot::DeviceSnapshot;

// ───────────────────────────────────────────────────────────────
// DeviceController
// ───────────────────────────────────────────────────────────────

/// Owns all device state and advances it on ticks and events.
pub struct DeviceController<S: EventSink = NullSink> {
    fsm: Fsm,
    ctx: DeviceContext,
    sink: S,
    /// Latest timestamp seen; earlier timestamps are clamped up to it.
    last_now: Millis,
}

impl DeviceController<NullSink> {
    /// Build a controller that discards outbound events.
    pub fn new(config: DeviceConfig) -> Result<Self> {
        Self::with_sink(config, NullSink)
    }
}

impl<S: EventSink> DeviceController<S> {
    /// Build a controller in SAFE with all flags cleared.
    ///
    /// Fails if the configuration is invalid (empty protocol list
    /// included).
    pub fn with_sink(config: DeviceConfig, mut sink: S) -> Result<Self> {
        let mut ctx = DeviceContext::new(config)?;
        let mut fsm = Fsm::new(build_state_table(), DeviceState::Safe);
        fsm.start(&mut ctx);
        sink.emit(&DeviceEvent::Started(fsm.current_state()));
        info!(
            "DeviceController started in {:?} with {} protocols",
            fsm.current_state(),
            ctx.protocols.len()
        );

        Ok(Self {
            fsm,
            ctx,
            sink,
            last_now: 0,
        })
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Advance time-based behaviour to `now` and return the new snapshot.
    ///
    /// 1. Release deferred actions that have come due (auto-confirm).
    /// 2. Evaluate at most one time-based FSM transition.
    /// 3. Report the fired shot and any state change.
    pub fn tick(&mut self, now: Millis) -> DeviceSnapshot {
        self.advance_clock(now);
        self.run_deferred();

        let prev = self.fsm.current_state();
        let prev_time = self.fsm.time_in_state(self.ctx.now);
        self.fsm.tick(&mut self.ctx);

        if let Some(shot) = self.ctx.take_fired() {
            let timing = &self.ctx.config.frame;
            self.sink.emit(&DeviceEvent::ShotFired {
                shot: shot.number,
                protocol_id: shot.protocol_id,
                frame: shot.frame,
                pulses: shot.frame.pulse_train(timing.bin_us, timing.pulse_us),
            });
        }
        self.flush_confirmation();
        self.report_transition(prev, prev_time);

        self.snapshot(self.ctx.now)
    }

    // ── Event handling ────────────────────────────────────────

    /// Apply one discrete input event at `now` and return the new snapshot.
    pub fn handle_event(&mut self, event: InputEvent, now: Millis) -> DeviceSnapshot {
        self.advance_clock(now);
        self.run_deferred();

        let prev = self.fsm.current_state();
        let prev_time = self.fsm.time_in_state(self.ctx.now);

        match event {
            InputEvent::PowerHold => {
                if prev == DeviceState::Safe {
                    self.fsm.force_transition(DeviceState::SafeReady, &mut self.ctx);
                } else {
                    self.fsm.force_transition(DeviceState::Safe, &mut self.ctx);
                }
            }
            InputEvent::ManualFire => {
                if prev == DeviceState::ArmedSensing {
                    self.fsm.force_transition(DeviceState::ArmedIrFlash, &mut self.ctx);
                } else {
                    debug!("ManualFire ignored in {}", prev.label());
                }
            }
            InputEvent::Reset => {
                self.fsm.force_transition(DeviceState::Safe, &mut self.ctx);
                // Already SAFE: no transition ran, clear explicitly.
                self.ctx.clear_arming_inputs();
            }
            InputEvent::NextProtocol => {
                let next = self.ctx.protocols.next_index(self.ctx.selection.protocol_index);
                self.ctx.selection.protocol_index = next;
                self.report_selection();
            }
            InputEvent::ToggleSide => {
                self.ctx.selection.side = self.ctx.selection.side.toggled();
                self.report_selection();
            }
            InputEvent::ToggleLimit => {
                self.ctx.inputs.limit_pressed = !self.ctx.inputs.limit_pressed;
                debug!("Limit switch -> {}", self.ctx.inputs.limit_pressed);
            }
            InputEvent::ToggleAltitude => {
                self.ctx.inputs.altitude_ok = !self.ctx.inputs.altitude_ok;
                debug!("Altitude ok -> {}", self.ctx.inputs.altitude_ok);
            }
            InputEvent::ToggleConfirmMode => {
                self.ctx.selection.confirm_mode = self.ctx.selection.confirm_mode.toggled();
                info!("Confirm mode -> {:?}", self.ctx.selection.confirm_mode);
            }
            InputEvent::ConfirmNow => {
                if self.ctx.try_manual_confirm() == ConfirmOutcome::Late {
                    if let Some(shot) = self.ctx.last_shot {
                        self.sink.emit(&DeviceEvent::ConfirmMissed { shot: shot.number });
                    }
                }
            }
        }

        self.flush_confirmation();
        self.report_transition(prev, prev_time);

        self.snapshot(self.ctx.now)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Snapshot as of `now` without advancing anything.
    pub fn snapshot(&self, now: Millis) -> DeviceSnapshot {
        DeviceSnapshot::capture(self.fsm.current_state(), &self.ctx, now.max(self.last_now))
    }

    /// Current FSM state.
    pub fn state(&self) -> DeviceState {
        self.fsm.current_state()
    }

    /// Total ticks evaluated since construction.
    pub fn tick_count(&self) -> u64 {
        self.fsm.tick_count()
    }

    /// Deferred actions still waiting to come due.
    pub fn pending_deferred(&self) -> usize {
        self.ctx.deferred.len()
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.ctx.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    // ── Internal ──────────────────────────────────────────────

    fn advance_clock(&mut self, now: Millis) {
        if now < self.last_now {
            warn!(
                "Timestamp went backwards ({}ms < {}ms), clamping",
                now, self.last_now
            );
        }
        self.last_now = self.last_now.max(now);
        self.ctx.now = self.last_now;
    }

    fn run_deferred(&mut self) {
        for action in self.ctx.deferred.take_due(self.ctx.now) {
            match action {
                DeferredAction::AutoConfirm { shot } => {
                    if self.ctx.last_shot.map(|s| s.number) != Some(shot) {
                        debug!("CONFIRM: auto-confirm for superseded shot #{} dropped", shot);
                        continue;
                    }
                    info!("CONFIRM: auto-confirm for shot #{}", shot);
                    self.ctx.record_confirmation(shot, true);
                    self.flush_confirmation();
                }
            }
        }
    }

    fn flush_confirmation(&mut self) {
        if let Some(c) = self.ctx.take_confirmed() {
            self.sink.emit(&DeviceEvent::Confirmed {
                shot: c.shot,
                auto: c.auto,
            });
        }
    }

    fn report_selection(&mut self) {
        self.sink.emit(&DeviceEvent::SelectionChanged {
            protocol_index: self.ctx.selection.protocol_index,
            side: self.ctx.selection.side,
        });
    }

    fn report_transition(&mut self, from: DeviceState, after_ms: Millis) {
        let to = self.fsm.current_state();
        if to != from {
            self.sink.emit(&DeviceEvent::StateChanged { from, to, after_ms });
        }
    }
}
