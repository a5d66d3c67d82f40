//! Protocol registry and 11-bit MILES frames.
//!
//! Each registry entry pairs a display name with an 11-bit code word.
//! When the device fires, the active entry's code is copied into a
//! [`Frame`], the team bit is patched for the selected [`Side`], and the
//! frame is expanded into an on/off [`Pulse`] train for the emitter.
//!
//! ```text
//!  bit:    0   1   2   3   4   5   6   7   8   9   10
//!        ┌───┬───┬───┬───┬───┬───┬───┬───┬───┬───┬───┐
//!        │ 1 │ 1 │ 0 │ 0 │ 0 │ S │ 0 │ 1 │ 1 │ 0 │ 1 │   S = side bit
//!        └───┴───┴───┴───┴───┴───┴───┴───┴───┴───┴───┘
//!  bin:  |<-- bin_us -->|
//!   '1': ▔▔▔▔▔▔▁▁▁▁▁▁   pulse_us high, rest low
//!   '0': ▁▁▁▁▁▁▁▁▁▁▁▁   low for the whole bin
//! ```

use core::fmt;

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of bins in a MILES code word.
pub const FRAME_BITS: usize = 11;

/// Fixed registry capacity.
pub const MAX_PROTOCOLS: usize = 8;

/// Longest protocol name (bytes) the registry stores inline.
pub const MAX_NAME_LEN: usize = 32;

/// Upper bound on segments in a pulse train (one high + one low per bin).
pub const MAX_PULSES: usize = FRAME_BITS * 2;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Team selector encoded into the frame's side bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Blufor,
    Opfor,
}

impl Side {
    pub fn toggled(self) -> Self {
        match self {
            Self::Blufor => Self::Opfor,
            Self::Opfor => Self::Blufor,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Blufor => "BLUFOR",
            Self::Opfor => "OPFOR",
        }
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// An 11-bit MILES word.  Bit `i` of the inner value is bin `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame(u16);

impl Frame {
    const MASK: u16 = (1 << FRAME_BITS) - 1;

    /// Build a frame from a per-bin pattern.  Any non-zero entry is a `1`.
    pub fn from_pattern(pattern: &[u8; FRAME_BITS]) -> Self {
        let bits = pattern
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b != 0)
            .fold(0u16, |acc, (i, _)| acc | (1 << i));
        Self(bits)
    }

    /// Raw bits, bin 0 in the least significant position.
    pub fn bits(self) -> u16 {
        self.0 & Self::MASK
    }

    pub fn bit(self, index: usize) -> bool {
        index < FRAME_BITS && self.0 & (1 << index) != 0
    }

    /// Return a copy with bin `index` forced to `value`.  Indices past the
    /// end of the frame leave it untouched.
    pub fn with_bit(self, index: usize, value: bool) -> Self {
        if index >= FRAME_BITS {
            return self;
        }
        if value {
            Self(self.0 | (1 << index))
        } else {
            Self(self.0 & !(1 << index))
        }
    }

    /// Patch the team bit: set for OPFOR, cleared for BLUFOR.
    pub fn with_side(self, side: Side, side_bit_index: usize) -> Self {
        self.with_bit(side_bit_index, side == Side::Opfor)
    }

    /// Expand the frame into emitter segments.  Consecutive low segments
    /// are merged so the train alternates levels.
    pub fn pulse_train(self, bin_us: u32, pulse_us: u32) -> Vec<Pulse, MAX_PULSES> {
        let mut train: Vec<Pulse, MAX_PULSES> = Vec::new();
        let pulse_us = pulse_us.min(bin_us);

        for i in 0..FRAME_BITS {
            if self.bit(i) {
                push_segment(&mut train, true, pulse_us);
                push_segment(&mut train, false, bin_us - pulse_us);
            } else {
                push_segment(&mut train, false, bin_us);
            }
        }
        train
    }
}

fn push_segment(train: &mut Vec<Pulse, MAX_PULSES>, high: bool, duration_us: u32) {
    if duration_us == 0 {
        return;
    }
    if let Some(last) = train.last_mut() {
        if last.high == high {
            last.duration_us += duration_us;
            return;
        }
    }
    // Segments alternate, so at most two per bin: capacity cannot overflow.
    let _ = train.push(Pulse { high, duration_us });
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..FRAME_BITS {
            f.write_str(if self.bit(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// One emitter segment: drive the output `high` or low for `duration_us`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub high: bool,
    pub duration_us: u32,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Serialisable protocol definition, as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolSpec {
    pub id: u8,
    pub name: std::string::String,
    pub code: [u8; FRAME_BITS],
}

impl ProtocolSpec {
    pub fn new(id: u8, name: &str, code: [u8; FRAME_BITS]) -> Self {
        Self {
            id,
            name: name.into(),
            code,
        }
    }
}

/// The stock code table shipped with the device.
pub fn stock_protocols() -> std::vec::Vec<ProtocolSpec> {
    vec![
        ProtocolSpec::new(0, "Universal Kill (Basic)", [1, 1, 0, 0, 0, 1, 0, 1, 1, 0, 1]),
        ProtocolSpec::new(1, "Player ID 001", [1, 0, 0, 1, 0, 0, 1, 1, 0, 1, 0]),
        ProtocolSpec::new(2, "Player ID 002", [1, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0]),
        ProtocolSpec::new(3, "Pause/Reset", [1, 1, 0, 0, 0, 1, 0, 1, 0, 1, 1]),
        ProtocolSpec::new(4, "End Exercise", [1, 1, 0, 0, 0, 1, 1, 1, 1, 1, 0]),
    ]
}

/// A registry row with its name and code stored inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolEntry {
    pub id: u8,
    pub name: String<MAX_NAME_LEN>,
    pub code: Frame,
}

/// Ordered, non-empty, fixed-capacity list of protocols.
#[derive(Debug, Clone)]
pub struct ProtocolRegistry {
    entries: Vec<ProtocolEntry, MAX_PROTOCOLS>,
}

impl ProtocolRegistry {
    /// Build the registry.  An empty list is a fatal configuration error.
    pub fn from_specs(specs: &[ProtocolSpec]) -> Result<Self, ConfigError> {
        if specs.is_empty() {
            return Err(ConfigError::NoProtocols);
        }
        if specs.len() > MAX_PROTOCOLS {
            return Err(ConfigError::TooManyProtocols {
                count: specs.len(),
                max: MAX_PROTOCOLS,
            });
        }

        let mut entries = Vec::new();
        for spec in specs {
            let name = String::try_from(spec.name.as_str())
                .map_err(|()| ConfigError::ValidationFailed("protocol name longer than 32 bytes"))?;
            let entry = ProtocolEntry {
                id: spec.id,
                name,
                code: Frame::from_pattern(&spec.code),
            };
            entries
                .push(entry)
                .map_err(|_| ConfigError::TooManyProtocols {
                    count: specs.len(),
                    max: MAX_PROTOCOLS,
                })?;
        }
        Ok(Self { entries })
    }

    /// Number of entries (always at least one).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, wrapping into range.
    pub fn get(&self, index: usize) -> &ProtocolEntry {
        &self.entries[index % self.entries.len()]
    }

    /// Index following `index`, wrapping to the start.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProtocolEntry> {
        self.entries.iter()
    }
}
