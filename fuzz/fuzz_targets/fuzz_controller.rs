//! Fuzz target: `DeviceController::{tick, handle_event}`
//!
//! Interprets the input as a stream of two-byte commands.  The first byte
//! selects an input event or a tick; the second is a signed time step, so
//! timestamps may run backwards.  After every step the snapshot invariants
//! must hold and the controller must never panic.
//!
//! cargo fuzz run fuzz_controller

#![no_main]

use libfuzzer_sys::fuzz_target;
use miles::{DeviceConfig, DeviceController, DeviceState, InputEvent};

fuzz_target!(|data: &[u8]| {
    let Ok(mut controller) = DeviceController::new(DeviceConfig::default()) else {
        return;
    };
    let mut now: u64 = 0;
    let mut shots = 0u32;

    for chunk in data.chunks_exact(2) {
        let step = i64::from(chunk[1] as i8) * 40;
        now = now.saturating_add_signed(step);

        let selector = usize::from(chunk[0]) % (InputEvent::ALL.len() + 1);
        let snap = match InputEvent::ALL.get(selector) {
            Some(&event) => controller.handle_event(event, now),
            None => controller.tick(now),
        };

        assert!(snap.shot_count >= shots, "shot count decreased");
        assert!(snap.shot_count <= shots + 1, "more than one shot per step");
        assert_eq!(
            snap.expended_deadline.is_some(),
            snap.state == DeviceState::Expended,
            "deadline outside EXPENDED"
        );
        assert!(!snap.confirmed_value || snap.confirmed_active);
        shots = snap.shot_count;
    }
});
