//! Mock adapters for integration tests.
//!
//! [`RecordingSink`] keeps every emitted event so tests can assert on the
//! full history; [`ManualClock`] is a clock the test advances by hand.

use std::cell::Cell;

use miles::{Clock, DeviceConfig, DeviceController, DeviceEvent, DeviceSnapshot, InputEvent, Millis};

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<DeviceEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shots_fired(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, DeviceEvent::ShotFired { .. }))
            .count()
    }

    pub fn confirmations(&self) -> Vec<(u32, bool)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DeviceEvent::Confirmed { shot, auto } => Some((*shot, *auto)),
                _ => None,
            })
            .collect()
    }

    pub fn transitions(&self) -> Vec<(miles::DeviceState, miles::DeviceState)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DeviceEvent::StateChanged { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl miles::EventSink for RecordingSink {
    fn emit(&mut self, event: &DeviceEvent) {
        self.events.push(event.clone());
    }
}

// ── ManualClock ───────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Millis>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, ms: Millis) -> Millis {
        self.now.set(self.now.get() + ms);
        self.now.get()
    }

    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// Controller, recording sink, and clock wired together.
pub struct Rig {
    pub controller: DeviceController<RecordingSink>,
    pub clock: ManualClock,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::with_config(DeviceConfig::default())
    }

    pub fn with_config(config: DeviceConfig) -> Self {
        Self {
            controller: DeviceController::with_sink(config, RecordingSink::new())
                .expect("valid config"),
            clock: ManualClock::new(0),
        }
    }

    pub fn tick(&mut self) -> DeviceSnapshot {
        self.controller.tick(self.clock.now_ms())
    }

    pub fn tick_at(&mut self, now: Millis) -> DeviceSnapshot {
        self.clock.set(now);
        self.tick()
    }

    pub fn press(&mut self, event: InputEvent) -> DeviceSnapshot {
        self.controller.handle_event(event, self.clock.now_ms())
    }

    pub fn press_at(&mut self, event: InputEvent, now: Millis) -> DeviceSnapshot {
        self.clock.set(now);
        self.press(event)
    }

    pub fn sink(&self) -> &RecordingSink {
        self.controller.sink()
    }

    /// Run the arming sequence; returns the snapshot in ARMED SENSE.
    pub fn arm_to_sensing(&mut self) -> DeviceSnapshot {
        self.press(InputEvent::PowerHold);
        self.press(InputEvent::ToggleLimit);
        self.tick();
        self.press(InputEvent::ToggleLimit);
        self.tick()
    }

    /// Arm and fire one shot; returns the fire time.
    pub fn fire_once(&mut self) -> Millis {
        self.arm_to_sensing();
        self.press(InputEvent::ManualFire);
        let t0 = self.clock.now_ms();
        let snap = self.tick();
        assert_eq!(snap.state, miles::DeviceState::Expended);
        t0
    }
}
