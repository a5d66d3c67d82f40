//! Integration tests for the arming sequence, fire sequence, cooldown and
//! reset paths of the `DeviceController`.

use miles::protocol::Side;
use miles::{Clock, DeviceConfig, DeviceController, DeviceEvent, DeviceState, InputEvent};

use super::mock_sink::Rig;

const ALL_STATES: [DeviceState; 6] = DeviceState::ALL;

/// Drive a fresh rig into `target` using only public events and ticks.
fn rig_in(target: DeviceState) -> Rig {
    let mut rig = Rig::new();
    match target {
        DeviceState::Safe => {}
        DeviceState::SafeReady => {
            rig.press(InputEvent::PowerHold);
        }
        DeviceState::ArmedFly => {
            rig.press(InputEvent::PowerHold);
            rig.press(InputEvent::ToggleLimit);
            rig.tick();
        }
        DeviceState::ArmedSensing => {
            rig.arm_to_sensing();
        }
        DeviceState::ArmedIrFlash => {
            rig.arm_to_sensing();
            rig.press(InputEvent::ManualFire);
        }
        DeviceState::Expended => {
            rig.fire_once();
        }
    }
    assert_eq!(rig.controller.state(), target);
    rig
}

// ── Arming ────────────────────────────────────────────────────

#[test]
fn happy_path_reaches_ir_flash_then_expended() {
    let mut rig = Rig::new();

    assert_eq!(rig.press(InputEvent::PowerHold).state, DeviceState::SafeReady);
    rig.press(InputEvent::ToggleLimit);
    assert_eq!(rig.tick().state, DeviceState::ArmedFly);
    rig.press(InputEvent::ToggleLimit);
    assert_eq!(rig.tick().state, DeviceState::ArmedSensing);
    rig.press(InputEvent::ToggleAltitude);
    assert_eq!(rig.tick().state, DeviceState::ArmedIrFlash);

    let snap = rig.tick();
    assert_eq!(snap.state, DeviceState::Expended);
    assert_eq!(snap.shot_count, 1);
    assert!(snap.flash_toast_active);
    assert!(snap.indicators.expended);

    assert_eq!(
        rig.sink().transitions(),
        vec![
            (DeviceState::Safe, DeviceState::SafeReady),
            (DeviceState::SafeReady, DeviceState::ArmedFly),
            (DeviceState::ArmedFly, DeviceState::ArmedSensing),
            (DeviceState::ArmedSensing, DeviceState::ArmedIrFlash),
            (DeviceState::ArmedIrFlash, DeviceState::Expended),
        ]
    );
}

#[test]
fn one_transition_per_tick() {
    let mut rig = Rig::new();
    rig.press(InputEvent::PowerHold);
    rig.press(InputEvent::ToggleLimit);
    rig.press(InputEvent::ToggleAltitude);

    // Limit latched, altitude ok: still only one step per tick.
    assert_eq!(rig.tick().state, DeviceState::ArmedFly);
    assert_eq!(rig.tick().state, DeviceState::ArmedFly);
    rig.press(InputEvent::ToggleLimit);
    assert_eq!(rig.tick().state, DeviceState::ArmedSensing);
    assert_eq!(rig.tick().state, DeviceState::ArmedIrFlash);
    assert_eq!(rig.tick().state, DeviceState::Expended);
}

#[test]
fn inputs_are_ignored_while_safe() {
    let mut rig = Rig::new();
    rig.press(InputEvent::ToggleLimit);
    rig.press(InputEvent::ToggleAltitude);
    for _ in 0..5 {
        assert_eq!(rig.tick().state, DeviceState::Safe);
    }
}

#[test]
fn power_hold_disarms_from_any_armed_state() {
    for state in [
        DeviceState::SafeReady,
        DeviceState::ArmedFly,
        DeviceState::ArmedSensing,
        DeviceState::ArmedIrFlash,
        DeviceState::Expended,
    ] {
        let mut rig = rig_in(state);
        let snap = rig.press(InputEvent::PowerHold);
        assert_eq!(snap.state, DeviceState::Safe, "from {state:?}");
        assert!(!snap.limit_pressed && !snap.altitude_ok);
        assert_eq!(snap.expended_deadline, None);
    }
}

// ── Manual fire ───────────────────────────────────────────────

#[test]
fn manual_fire_is_noop_outside_sensing() {
    for state in ALL_STATES {
        if state == DeviceState::ArmedSensing {
            continue;
        }
        let mut rig = rig_in(state);
        let before = rig.controller.snapshot(rig.clock.now_ms());
        let after = rig.press(InputEvent::ManualFire);
        assert_eq!(after, before, "ManualFire changed {state:?}");
    }
}

#[test]
fn manual_fire_in_sensing_fires_on_next_tick() {
    let mut rig = rig_in(DeviceState::ArmedSensing);
    assert_eq!(rig.press(InputEvent::ManualFire).state, DeviceState::ArmedIrFlash);
    assert_eq!(rig.sink().shots_fired(), 0);
    rig.clock.advance(33);
    let snap = rig.tick();
    assert_eq!(snap.state, DeviceState::Expended);
    assert_eq!(snap.shot_count, 1);
    assert_eq!(rig.sink().shots_fired(), 1);
}

#[test]
fn fired_frame_carries_protocol_and_side() {
    let mut rig = Rig::new();
    rig.press(InputEvent::NextProtocol); // Player ID 001
    rig.press(InputEvent::ToggleSide); // OPFOR
    rig.fire_once();

    let fired = rig
        .sink()
        .events
        .iter()
        .find_map(|e| match e {
            DeviceEvent::ShotFired {
                shot,
                protocol_id,
                frame,
                ..
            } => Some((*shot, *protocol_id, *frame)),
            _ => None,
        })
        .expect("shot event");
    assert_eq!(fired.0, 1);
    assert_eq!(fired.1, 1);
    assert!(fired.2.bit(5), "OPFOR sets the side bit");
    assert_eq!(fired.2.to_string(), "10010111010");
}

#[test]
fn fired_pulses_follow_configured_timing() {
    let mut config = DeviceConfig::default();
    config.frame.bin_us = 600;
    config.frame.pulse_us = 200;
    let mut rig = Rig::with_config(config);
    rig.fire_once();

    let (frame, pulses) = rig
        .sink()
        .events
        .iter()
        .find_map(|e| match e {
            DeviceEvent::ShotFired { frame, pulses, .. } => Some((*frame, pulses.clone())),
            _ => None,
        })
        .expect("shot event");

    let ones = (0..miles::protocol::FRAME_BITS).filter(|&i| frame.bit(i)).count();
    let highs: Vec<_> = pulses.iter().filter(|p| p.high).collect();
    assert_eq!(highs.len(), ones);
    assert!(highs.iter().all(|p| p.duration_us == 200));
    let total: u32 = pulses.iter().map(|p| p.duration_us).sum();
    assert_eq!(total, 600 * miles::protocol::FRAME_BITS as u32);
}

// ── Cooldown ──────────────────────────────────────────────────

#[test]
fn expended_returns_to_safe_exactly_at_deadline() {
    let mut rig = Rig::new();
    rig.clock.set(10_000);
    let t0 = rig.fire_once();
    let duration = rig.controller.config().expended_duration_ms;

    let snap = rig.controller.snapshot(t0);
    assert_eq!(snap.expended_deadline, Some(t0 + duration));
    assert_eq!(snap.expended_remaining_secs, Some(5));

    let snap = rig.tick_at(t0 + duration - 1);
    assert_eq!(snap.state, DeviceState::Expended);
    assert_eq!(snap.expended_remaining_secs, Some(0));

    let snap = rig.tick_at(t0 + duration);
    assert_eq!(snap.state, DeviceState::Safe);
    assert_eq!(snap.expended_deadline, None);
    assert_eq!(snap.expended_remaining_secs, None);
    assert!(!snap.limit_pressed && !snap.altitude_ok);
    assert_eq!(snap.shot_count, 1);
}

#[test]
fn repeated_tick_is_idempotent() {
    let mut rig = Rig::new();
    let t0 = rig.fire_once();
    let end = t0 + rig.controller.config().expended_duration_ms;

    let first = rig.tick_at(end);
    assert_eq!(first.state, DeviceState::Safe);
    let events_after_first = rig.sink().events.len();

    let second = rig.tick_at(end);
    assert_eq!(second, first);
    assert_eq!(rig.sink().events.len(), events_after_first);
    assert_eq!(second.shot_count, 1);
}

#[test]
fn late_tick_does_not_fire_twice() {
    let mut rig = rig_in(DeviceState::ArmedIrFlash);
    let now = rig.clock.now_ms();
    rig.tick_at(now);
    rig.tick_at(now);
    assert_eq!(rig.controller.snapshot(now).shot_count, 1);
    assert_eq!(rig.sink().shots_fired(), 1);
}

#[test]
fn backwards_time_never_underflows() {
    let mut rig = Rig::new();
    rig.clock.set(50_000);
    let t0 = rig.fire_once();
    let snap = rig.tick_at(0);
    assert_eq!(snap.state, DeviceState::Expended);
    assert_eq!(snap.taken_at, t0);
    assert!(snap.expended_remaining_secs.is_some());
}

#[test]
fn shot_count_grows_one_per_cycle() {
    let mut rig = Rig::new();
    let duration = rig.controller.config().expended_duration_ms;
    for n in 1..=3u32 {
        let t0 = rig.fire_once();
        assert_eq!(rig.controller.snapshot(t0).shot_count, n);
        rig.tick_at(t0 + duration);
        assert_eq!(rig.controller.state(), DeviceState::Safe);
    }
    assert_eq!(rig.sink().shots_fired(), 3);
}

// ── Reset ─────────────────────────────────────────────────────

#[test]
fn reset_from_every_state_yields_clean_safe() {
    for state in ALL_STATES {
        let mut rig = rig_in(state);
        rig.press(InputEvent::ToggleAltitude);
        let count = rig.controller.snapshot(rig.clock.now_ms()).shot_count;

        let snap = rig.press(InputEvent::Reset);
        assert_eq!(snap.state, DeviceState::Safe, "from {state:?}");
        assert!(!snap.limit_pressed, "limit latched after reset from {state:?}");
        assert!(!snap.altitude_ok, "altitude latched after reset from {state:?}");
        assert_eq!(snap.expended_deadline, None);
        assert_eq!(snap.shot_count, count);
        assert!(snap.indicators.safe);
    }
}

#[test]
fn reset_preserves_selection() {
    let mut rig = Rig::new();
    rig.press(InputEvent::NextProtocol);
    rig.press(InputEvent::NextProtocol);
    rig.press(InputEvent::ToggleSide);
    rig.press(InputEvent::ToggleConfirmMode);
    let snap = rig.press(InputEvent::Reset);
    assert_eq!(snap.active_protocol_index, 2);
    assert_eq!(snap.side, Side::Opfor);
    assert_eq!(snap.confirm_mode, miles::fsm::context::ConfirmMode::Manual);
}

// ── Selection + construction ──────────────────────────────────

#[test]
fn selection_changes_are_reported() {
    let mut rig = Rig::new();
    rig.press(InputEvent::NextProtocol);
    rig.press(InputEvent::ToggleSide);
    let selections: Vec<_> = rig
        .sink()
        .events
        .iter()
        .filter_map(|e| match e {
            DeviceEvent::SelectionChanged {
                protocol_index,
                side,
            } => Some((*protocol_index, *side)),
            _ => None,
        })
        .collect();
    assert_eq!(selections, vec![(1, Side::Blufor), (1, Side::Opfor)]);
}

#[test]
fn single_protocol_next_stays_put() {
    let config = DeviceConfig {
        protocols: vec![miles::protocol::ProtocolSpec::new(
            7,
            "Only",
            [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1],
        )],
        ..DeviceConfig::default()
    };
    let mut rig = Rig::with_config(config);
    let snap = rig.press(InputEvent::NextProtocol);
    assert_eq!(snap.active_protocol_index, 0);
    assert_eq!(snap.protocol_name.as_str(), "Only");
}

#[test]
fn construction_reports_started_in_safe() {
    let rig = Rig::new();
    assert_eq!(rig.sink().events, vec![DeviceEvent::Started(DeviceState::Safe)]);
}

#[test]
fn empty_protocol_list_rejected() {
    let config = DeviceConfig {
        protocols: Vec::new(),
        ..DeviceConfig::default()
    };
    let err = DeviceController::new(config).err().expect("must fail");
    assert_eq!(err, miles::Error::Config(miles::ConfigError::NoProtocols));
}
