//! Device configuration parameters
//!
//! All tunable timing for the drop device plus its protocol table.
//! Values are fixed once a controller is built; they can be loaded from
//! JSON for the simulator.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::protocol::{FRAME_BITS, MAX_NAME_LEN, MAX_PROTOCOLS, ProtocolSpec, stock_protocols};
use crate::time::Millis;

/// IR emitter timing and frame layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTiming {
    /// Duration of one MILES bin (microseconds)
    pub bin_us: u32,
    /// High time of a `1` pulse inside its bin (microseconds)
    pub pulse_us: u32,
    /// Which of the 11 bins carries the BLUFOR/OPFOR bit
    pub side_bit_index: usize,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self {
            bin_us: 500,
            pulse_us: 250,
            side_bit_index: 5,
        }
    }
}

/// Core device configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    // --- FSM timing ---
    /// Cooldown spent in EXPENDED before returning to SAFE (ms)
    pub expended_duration_ms: Millis,
    /// How long the "IR FLASHED" toast stays up after a shot (ms)
    pub flash_toast_window_ms: Millis,
    /// Acceptance window for a self-sense confirmation after a shot (ms)
    pub confirm_window_ms: Millis,
    /// How long a confirmation stays displayed (ms)
    pub confirm_show_window_ms: Millis,
    /// Delay before an automatic confirmation lands (ms, < confirm window)
    pub auto_confirm_delay_ms: Millis,

    // --- Driver cadence ---
    /// Interval between controller ticks (ms)
    pub tick_interval_ms: Millis,
    /// Power button hold time that counts as a long press (ms)
    pub power_hold_ms: Millis,
    /// Minimum spacing between repeated button events (ms)
    pub debounce_ms: Millis,

    // --- Transmit ---
    pub frame: FrameTiming,
    /// Ordered protocol table; at least one entry.
    pub protocols: Vec<ProtocolSpec>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            // FSM timing
            expended_duration_ms: 5000,
            flash_toast_window_ms: 600,
            confirm_window_ms: 1500,
            confirm_show_window_ms: 800,
            auto_confirm_delay_ms: 150,

            // Driver cadence
            tick_interval_ms: 33, // ~30 Hz
            power_hold_ms: 800,
            debounce_ms: 200,

            frame: FrameTiming::default(),
            protocols: stock_protocols(),
        }
    }
}

impl DeviceConfig {
    /// Parse from JSON and validate.  Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocols.is_empty() {
            return Err(ConfigError::NoProtocols);
        }
        if self.protocols.len() > MAX_PROTOCOLS {
            return Err(ConfigError::TooManyProtocols {
                count: self.protocols.len(),
                max: MAX_PROTOCOLS,
            });
        }
        if self.protocols.iter().any(|p| p.name.len() > MAX_NAME_LEN) {
            return Err(ConfigError::ValidationFailed(
                "protocol name longer than 32 bytes",
            ));
        }
        if self.expended_duration_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "expended_duration_ms must be non-zero",
            ));
        }
        if self.confirm_window_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "confirm_window_ms must be non-zero",
            ));
        }
        if self.auto_confirm_delay_ms >= self.confirm_window_ms {
            return Err(ConfigError::ValidationFailed(
                "auto_confirm_delay_ms must be shorter than confirm_window_ms",
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "tick_interval_ms must be non-zero",
            ));
        }
        if self.frame.pulse_us > self.frame.bin_us {
            return Err(ConfigError::ValidationFailed(
                "pulse_us must fit inside bin_us",
            ));
        }
        if self.frame.side_bit_index >= FRAME_BITS {
            return Err(ConfigError::ValidationFailed(
                "side_bit_index outside the 11-bit frame",
            ));
        }
        Ok(())
    }
}
