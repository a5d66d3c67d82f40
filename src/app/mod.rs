//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the rules of the drop device: FSM orchestration,
//! fire sequencing, and the confirmation subsystem.  All interaction with
//! the outside world happens through the **port traits** defined in
//! [`ports`], keeping this layer testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod snapshot;
