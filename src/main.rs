//! MILES drop-device simulator host entry point.
//!
//! Drives a [`DeviceController`] from the keyboard:
//!
//! ```text
//!   stdin ──▶ reader thread ──mpsc──▶ event loop ──▶ DeviceController
//!                                        │                │
//!                               tick every N ms      LogEventSink
//! ```
//!
//! Keys (one or more per line, then Enter):
//!
//! | Key | Event              | Key | Event             |
//! |-----|--------------------|-----|-------------------|
//! | `p` | power hold         | `f` | manual fire       |
//! | `n` | next protocol      | `c` | toggle confirm    |
//! | `s` | toggle side        | `k` | confirm now       |
//! | `l` | toggle limit       | `r` | reset             |
//! | `a` | toggle altitude    | `q` | quit              |
//!
//! Usage: `miles-sim [config.json]`.  Log filtering comes from `MILES_LOG`.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};

use miles::adapters::console_log;
use miles::adapters::log_sink::LogEventSink;
use miles::adapters::time::MonotonicClock;
use miles::drivers::button::{DebouncedButton, HoldButton};
use miles::{Clock, DeviceConfig, DeviceController, InputEvent};

/// Messages from the stdin reader thread.
enum KeyInput {
    Key(char),
    Quit,
}

/// Simulated front-panel buttons.  Selector and fire buttons are
/// debounced like the physical ones; the `p` key presses the power button,
/// which stays down until the hold completes.
struct Buttons {
    power: HoldButton,
    power_down: bool,
    next: DebouncedButton,
    side: DebouncedButton,
    fire: DebouncedButton,
}

impl Buttons {
    fn new(power_hold_ms: u64, debounce_ms: u64) -> Self {
        Self {
            power: HoldButton::new(power_hold_ms),
            power_down: false,
            next: DebouncedButton::new(debounce_ms),
            side: DebouncedButton::new(debounce_ms),
            fire: DebouncedButton::new(debounce_ms),
        }
    }

    /// `false` when the press is still pending or lands inside the
    /// debounce interval.
    fn accept(&mut self, event: InputEvent, now_ms: u64) -> bool {
        match event {
            InputEvent::PowerHold => {
                self.power_down = true;
                self.poll_power(now_ms)
            }
            InputEvent::NextProtocol => self.next.update(true, now_ms),
            InputEvent::ToggleSide => self.side.update(true, now_ms),
            InputEvent::ManualFire => self.fire.update(true, now_ms),
            _ => true,
        }
    }

    /// Sample the held power button; `true` once the hold completes, after
    /// which the button is released.
    fn poll_power(&mut self, now_ms: u64) -> bool {
        if !self.power_down {
            return false;
        }
        let fired = self.power.update(true, now_ms);
        if fired {
            self.power_down = false;
            self.power.update(false, now_ms);
        }
        fired
    }
}

fn load_config() -> Result<DeviceConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {path}"))?;
            let config = DeviceConfig::from_json(&text)
                .with_context(|| format!("parsing config file {path}"))?;
            info!("Config loaded from {}", path);
            Ok(config)
        }
        None => {
            info!("No config file given, using stock device defaults");
            Ok(DeviceConfig::default())
        }
    }
}

fn spawn_stdin_reader() -> Receiver<KeyInput> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            for ch in line.chars().filter(|c| !c.is_whitespace()) {
                let msg = if ch.eq_ignore_ascii_case(&'q') {
                    KeyInput::Quit
                } else {
                    KeyInput::Key(ch)
                };
                if tx.send(msg).is_err() {
                    return;
                }
            }
        }
        let _ = tx.send(KeyInput::Quit);
    });
    rx
}

fn main() -> Result<()> {
    // ── 1. Logging + config ───────────────────────────────────
    let filter = console_log::install().context("installing console logger")?;
    info!("MILES simulator v{} (log filter {})", env!("CARGO_PKG_VERSION"), filter);

    let config = load_config()?;
    let tick = Duration::from_millis(config.tick_interval_ms);

    // ── 2. Construct controller + adapters ────────────────────
    let clock = MonotonicClock::new();
    let mut buttons = Buttons::new(config.power_hold_ms, config.debounce_ms);
    let mut controller = DeviceController::with_sink(config, LogEventSink::new())
        .context("building device controller")?;
    let keys = spawn_stdin_reader();

    println!(
        "keys: p n s l a f c k r, q to quit (press Enter after keys; p holds power for {}ms)",
        controller.config().power_hold_ms
    );
    let mut last_line = controller.snapshot(clock.now_ms()).to_string();
    println!("{last_line}");

    // ── 3. Event loop ─────────────────────────────────────────
    loop {
        let received = keys.recv_timeout(tick);
        let now = clock.now_ms();
        let mut snapshot = match received {
            Ok(KeyInput::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(KeyInput::Key(ch)) => match InputEvent::from_key(ch) {
                Some(event) if buttons.accept(event, now) => controller.handle_event(event, now),
                Some(event) => {
                    debug!("{:?} held back by the button driver", event);
                    controller.tick(now)
                }
                None => {
                    debug!("Unmapped key {:?}", ch);
                    controller.tick(now)
                }
            },
            Err(RecvTimeoutError::Timeout) => controller.tick(now),
        };
        if buttons.poll_power(now) {
            snapshot = controller.handle_event(InputEvent::PowerHold, now);
        }

        let line = snapshot.to_string();
        if line != last_line {
            println!("{line}");
            last_line = line;
        }
    }

    info!(
        "Simulator exiting after {} ticks, {} shots",
        controller.tick_count(),
        controller.snapshot(clock.now_ms()).shot_count
    );
    Ok(())
}
