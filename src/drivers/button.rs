//! Button gesture drivers.
//!
//! The host samples each button's raw level (pressed / released) together
//! with a millisecond timestamp and feeds it to `update()` at control-tick
//! rate.  The driver runs a small gesture state machine and reports at most
//! one event per sample.
//!
//! | Driver            | Condition                                | Fires            |
//! |-------------------|------------------------------------------|------------------|
//! | `HoldButton`      | Held continuously for `hold_ms`          | once per press   |
//! | `DebouncedButton` | Pressed, more than `debounce_ms` since last | repeats if held |

use crate::time::{Millis, elapsed};

// ───────────────────────────────────────────────────────────────
// Long-press (power) button
// ───────────────────────────────────────────────────────────────

/// Internal state machine for long-press detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldState {
    Idle,
    Holding { since_ms: Millis },
    /// Already fired for this press; wait for release.
    Latched,
}

/// Reports a single gesture once the button has been held for `hold_ms`.
#[derive(Debug, Clone)]
pub struct HoldButton {
    hold_ms: Millis,
    state: HoldState,
}

impl HoldButton {
    pub fn new(hold_ms: Millis) -> Self {
        Self {
            hold_ms,
            state: HoldState::Idle,
        }
    }

    /// Feed one sample.  Returns `true` on the sample that completes the hold.
    pub fn update(&mut self, pressed: bool, now_ms: Millis) -> bool {
        if !pressed {
            self.state = HoldState::Idle;
            return false;
        }

        match self.state {
            HoldState::Idle => {
                self.state = HoldState::Holding { since_ms: now_ms };
                self.hold_ms == 0
            }
            HoldState::Holding { since_ms } => {
                if elapsed(now_ms, since_ms) >= self.hold_ms {
                    self.state = HoldState::Latched;
                    true
                } else {
                    false
                }
            }
            HoldState::Latched => false,
        }
    }

    /// `true` while the button is down and has not fired yet.
    pub fn is_holding(&self) -> bool {
        matches!(self.state, HoldState::Holding { .. })
    }
}

// ───────────────────────────────────────────────────────────────
// Debounced momentary button
// ───────────────────────────────────────────────────────────────

/// Rate-limits a momentary button: a press is reported only once more than
/// `debounce_ms` has passed since the last reported one.
///
/// Holding the button down keeps repeating the event at that rate, which is
/// how the selector buttons on the device step through protocols.
#[derive(Debug, Clone)]
pub struct DebouncedButton {
    debounce_ms: Millis,
    last_fire_ms: Option<Millis>,
}

impl DebouncedButton {
    pub fn new(debounce_ms: Millis) -> Self {
        Self {
            debounce_ms,
            last_fire_ms: None,
        }
    }

    /// Feed one sample.  Returns `true` when the press should be reported.
    pub fn update(&mut self, pressed: bool, now_ms: Millis) -> bool {
        if !pressed {
            return false;
        }
        let ready = match self.last_fire_ms {
            None => true,
            Some(last) => elapsed(now_ms, last) > self.debounce_ms,
        };
        if ready {
            self.last_fire_ms = Some(now_ms);
        }
        ready
    }
}
