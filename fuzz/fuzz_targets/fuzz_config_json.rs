//! Fuzz target: `DeviceConfig::from_json`
//!
//! Arbitrary text must either be rejected with a typed error or yield a
//! config that builds a working controller.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use miles::{DeviceConfig, DeviceController};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = DeviceConfig::from_json(text) {
        let mut controller =
            DeviceController::new(config).expect("validated config must build");
        let _ = controller.tick(0);
    }
});
