//! Inbound input events.
//!
//! These are the discrete inputs the outside world (buttons, sensors,
//! the simulator keyboard) feeds into the
//! [`DeviceController`](super::service::DeviceController).

/// Discrete input events accepted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// Power button long-press: SAFE → SAFE READY, anything else → SAFE.
    PowerHold,
    /// Advance to the next protocol (wraps).
    NextProtocol,
    /// Flip BLUFOR/OPFOR.
    ToggleSide,
    /// Flip the latched limit switch input.
    ToggleLimit,
    /// Flip the latched altitude-ok input.
    ToggleAltitude,
    /// Fire immediately; only honoured in ARMED SENSE.
    ManualFire,
    /// Flip between auto and manual confirmation.
    ToggleConfirmMode,
    /// Operator confirmation of the latest shot (manual mode).
    ConfirmNow,
    /// Return to SAFE from anywhere.
    Reset,
}

impl InputEvent {
    /// Every event, in key-map order.
    pub const ALL: [Self; 9] = [
        Self::PowerHold,
        Self::NextProtocol,
        Self::ToggleSide,
        Self::ToggleLimit,
        Self::ToggleAltitude,
        Self::ManualFire,
        Self::ToggleConfirmMode,
        Self::ConfirmNow,
        Self::Reset,
    ];

    /// Simulator key binding (case-insensitive).
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'p' => Some(Self::PowerHold),
            'n' => Some(Self::NextProtocol),
            's' => Some(Self::ToggleSide),
            'l' => Some(Self::ToggleLimit),
            'a' => Some(Self::ToggleAltitude),
            'f' => Some(Self::ManualFire),
            'c' => Some(Self::ToggleConfirmMode),
            'k' => Some(Self::ConfirmNow),
            'r' => Some(Self::Reset),
            _ => None,
        }
    }

    /// Inverse of [`from_key`](Self::from_key).
    pub fn key(self) -> char {
        match self {
            Self::PowerHold => 'p',
            Self::NextProtocol => 'n',
            Self::ToggleSide => 's',
            Self::ToggleLimit => 'l',
            Self::ToggleAltitude => 'a',
            Self::ManualFire => 'f',
            Self::ToggleConfirmMode => 'c',
            Self::ConfirmNow => 'k',
            Self::Reset => 'r',
        }
    }
}
