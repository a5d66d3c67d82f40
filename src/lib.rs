//! MILES drop-device controller library.
//!
//! A tick-driven controller for a single-shot MILES IR drop device: it
//! arms through a sequence of latched sensor inputs, fires one coded IR
//! frame, cools down, and tracks confirmation of the shot.  Every timing
//! decision is a pure function of the caller-supplied `now`, so the whole
//! core runs identically on the device and in host tests.
//!
//! ```text
//!   buttons / keys ─▶ InputEvent ─┐
//!                                 ▼
//!   host clock ──── now ───▶ DeviceController ──▶ EventSink (log, emitter)
//!                                 │
//!                                 ▼
//!                          DeviceSnapshot (display)
//! ```

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod protocol;
pub mod scheduler;
pub mod time;

pub use app::commands::InputEvent;
pub use app::events::DeviceEvent;
pub use app::ports::{Clock, EventSink, NullSink};
pub use app::service::DeviceController;
pub use app::snapshot::DeviceSnapshot;
pub use config::DeviceConfig;
pub use error::{ConfigError, Error, Result};
pub use fsm::DeviceState;
pub use time::Millis;
