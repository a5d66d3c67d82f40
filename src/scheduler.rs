//! Deferred-work queue.
//!
//! Delayed actions (today: the automatic self-sense confirmation) are
//! stored as entries keyed by an absolute due time and released on the
//! same single timeline as ticks and events.  Nothing runs on another
//! thread; the controller polls [`DeferredQueue::take_due`] with the
//! current `now` and applies whatever has come due.
//!
//! ```text
//!   fire @ t0 ──▶ schedule(t0 + delay, AutoConfirm)
//!                          │
//!   tick(now) ─▶ take_due(now) ─▶ [AutoConfirm] ─▶ controller applies
//! ```
//!
//! Entries are never cancelled; once queued they always come due.

use log::debug;

use heapless::Vec;

use crate::error::SchedulerError;
use crate::time::Millis;

/// Maximum number of outstanding deferred entries (stack-allocated).
pub const MAX_DEFERRED: usize = 8;

/// Work the controller performs when an entry comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Register a confirmation for shot number `shot` as if the
    /// self-sense receiver had seen the burst.
    AutoConfirm { shot: u32 },
}

#[derive(Debug, Clone, Copy)]
struct DeferredEntry {
    due: Millis,
    action: DeferredAction,
}

/// Fixed-capacity queue of timestamp-keyed actions.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    entries: Vec<DeferredEntry, MAX_DEFERRED>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Queue `action` to come due at `due`.
    pub fn schedule(&mut self, due: Millis, action: DeferredAction) -> Result<(), SchedulerError> {
        self.entries
            .push(DeferredEntry { due, action })
            .map_err(|_| SchedulerError::QueueFull)?;
        debug!("Deferred: {:?} queued for t={}ms", action, due);
        Ok(())
    }

    /// Remove and return every action with `due <= now`, earliest first.
    /// Entries that share a due time keep their scheduling order.
    pub fn take_due(&mut self, now: Millis) -> Vec<DeferredAction, MAX_DEFERRED> {
        let mut due: Vec<DeferredEntry, MAX_DEFERRED> = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].due <= now {
                // `due` has the same capacity as `entries`; push cannot fail.
                let _ = due.push(self.entries.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|e| e.due);

        due.iter().map(|e| e.action).collect()
    }

    /// Earliest pending due time, if any.
    pub fn next_due(&self) -> Option<Millis> {
        self.entries.iter().map(|e| e.due).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
