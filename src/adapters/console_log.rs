//! Console log backend for the host simulator.
//!
//! On the device the `log` facade is backed by the platform logger; on the
//! host `tracing-subscriber` formats records to stderr so that stdout stays
//! free for the status line.  Its `tracing-log` bridge picks up every
//! `log::info!` and friends.  Filtering follows `MILES_LOG`, using the
//! usual directive syntax (`debug`, `miles=trace,warn`, ...).

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Environment variable holding the filter directives.
pub const LOG_LEVEL_ENV: &str = "MILES_LOG";

/// Directive used when `MILES_LOG` is unset, blank, or unparsable.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Build a filter from a directive string, falling back to
/// [`DEFAULT_DIRECTIVE`].
pub fn filter_from(value: Option<&str>) -> EnvFilter {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the stderr subscriber with the filter from [`LOG_LEVEL_ENV`].
/// Returns the active directives for the startup banner.
pub fn install() -> Result<String, TryInitError> {
    let filter = filter_from(std::env::var(LOG_LEVEL_ENV).ok().as_deref());
    let directives = filter.to_string();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish()
        .try_init()?;
    Ok(directives)
}
