//! Outbound device events.
//!
//! The [`DeviceController`](super::service::DeviceController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: log to the console, pulse
//! an emitter, update a display.

use heapless::Vec;

use crate::fsm::DeviceState;
use crate::protocol::{Frame, MAX_PULSES, Pulse, Side};
use crate::time::Millis;

/// Structured events emitted by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// The controller was created (carries initial state).
    Started(DeviceState),

    /// The FSM moved between states.
    StateChanged {
        from: DeviceState,
        to: DeviceState,
        /// Milliseconds spent in `from`.
        after_ms: Millis,
    },

    /// A fire sequence completed; `frame` is the word to transmit and
    /// `pulses` its emitter timing under the configured bin/pulse widths.
    ShotFired {
        shot: u32,
        protocol_id: u8,
        frame: Frame,
        pulses: Vec<Pulse, MAX_PULSES>,
    },

    /// A confirmation was registered for `shot`.
    Confirmed { shot: u32, auto: bool },

    /// A manual confirmation arrived after the window closed.
    ConfirmMissed { shot: u32 },

    /// Protocol or side selection changed.
    SelectionChanged { protocol_index: usize, side: Side },
}
