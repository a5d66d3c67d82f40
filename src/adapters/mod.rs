//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements    | Connects to                  |
//! |---------------|---------------|------------------------------|
//! | `console_log` | `log` backend | `tracing-subscriber`, stderr |
//! | `log_sink`    | EventSink     | `log` facade                 |
//! | `time`        | Clock         | `std::time::Instant`         |

pub mod console_log;
pub mod log_sink;
pub mod time;
