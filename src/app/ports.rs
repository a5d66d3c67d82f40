//! Port traits: the hexagonal boundary between the controller and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DeviceController (domain)
//! ```
//!
//! The controller never reads a clock or writes to a console itself: the
//! host supplies `now` (usually from a [`Clock`]) and receives
//! [`DeviceEvent`]s through an [`EventSink`].

use super::events::DeviceEvent;
use crate::time::Millis;

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / emitter)
// ───────────────────────────────────────────────────────────────

/// The controller emits structured [`DeviceEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &DeviceEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &DeviceEvent) {}
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: &DeviceEvent) {
        (**self).emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: platform timer → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond time source used by drivers to stamp ticks and
/// events.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}
