//! Host time adapter.
//!
//! Provides the monotonic millisecond [`Clock`] the simulator uses to
//! stamp ticks and input events, backed by `std::time::Instant`.

use std::time::Instant;

use crate::app::ports::Clock;
use crate::time::Millis;

/// Milliseconds since the adapter was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Millis {
        Millis::try_from(self.start.elapsed().as_millis()).unwrap_or(Millis::MAX)
    }
}
