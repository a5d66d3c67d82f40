//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that drives a [`DeviceController`]
//! through its public API against the recording sink and manual clock in
//! `mock_sink`.  Everything runs on the host.
//!
//! [`DeviceController`]: miles::DeviceController

mod controller_tests;
mod mock_sink;
