//! Three discrete state LEDs.
//!
//! | LED      | Colour | Lit in                                         |
//! |----------|--------|------------------------------------------------|
//! | SAFE     | green  | SAFE                                           |
//! | ARMED    | orange | SAFE READY, ARMED FLY, ARMED SENSE, IR FLASH   |
//! | EXPENDED | red    | EXPENDED                                       |
//!
//! Exactly one LED is lit at any time.  Drivers on the other side of the
//! snapshot decide how to light them; this module only decides which.

use serde::Serialize;

use crate::fsm::DeviceState;

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

pub const COLOUR_SAFE: Rgb = (0x2e, 0xcc, 0x71); // Green
pub const COLOUR_ARMED: Rgb = (0xf3, 0x9c, 0x12); // Orange
pub const COLOUR_EXPENDED: Rgb = (0xe7, 0x4c, 0x3c); // Red
pub const COLOUR_DARK: Rgb = (0x22, 0x22, 0x22);

/// On/off state of the three indicator LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Indicators {
    pub safe: bool,
    pub armed: bool,
    pub expended: bool,
}

impl Indicators {
    pub fn for_state(state: DeviceState) -> Self {
        Self {
            safe: state == DeviceState::Safe,
            armed: state.is_armed(),
            expended: state == DeviceState::Expended,
        }
    }

    /// Display colours in SAFE, ARMED, EXPENDED order; unlit LEDs are dark.
    pub fn colours(self) -> [Rgb; 3] {
        let pick = |on: bool, colour: Rgb| if on { colour } else { COLOUR_DARK };
        [
            pick(self.safe, COLOUR_SAFE),
            pick(self.armed, COLOUR_ARMED),
            pick(self.expended, COLOUR_EXPENDED),
        ]
    }
}
