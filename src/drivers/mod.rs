//! Input gesture drivers and status indicator mapping.

pub mod button;
pub mod status_leds;
