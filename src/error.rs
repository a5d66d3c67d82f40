//! Unified error types for the MILES controller.
//!
//! The state machine itself is total: every event/state combination is
//! either a transition or a no-op, never an error.  The only fallible
//! paths are building a controller from configuration and queueing
//! deferred work, and both funnel into [`Error`].

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid or could not be parsed.
    Config(ConfigError),
    /// The deferred-work queue rejected an entry.
    Scheduler(SchedulerError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Scheduler(e) => write!(f, "scheduler: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Rejections raised by [`DeviceConfig::validate`](crate::config::DeviceConfig::validate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The protocol list is empty; the device has nothing to transmit.
    NoProtocols,
    /// More protocols than the fixed-capacity registry can hold.
    TooManyProtocols { count: usize, max: usize },
    /// A field failed range validation.
    ValidationFailed(&'static str),
    /// JSON input could not be decoded.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProtocols => write!(f, "protocol list is empty"),
            Self::TooManyProtocols { count, max } => {
                write!(f, "{count} protocols configured, at most {max} supported")
            }
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Scheduler errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// Every deferred slot is occupied.
    QueueFull,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => write!(f, "deferred queue full"),
        }
    }
}

impl From<SchedulerError> for Error {
    fn from(e: SchedulerError) -> Self {
        Self::Scheduler(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
