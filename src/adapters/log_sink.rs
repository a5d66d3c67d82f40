//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each outbound [`DeviceEvent`] as a
//! one-line `TAG | key=value` record through the `log` facade.  An IR
//! emitter or display adapter would implement the same trait.

use log::info;

use crate::app::events::DeviceEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`DeviceEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &DeviceEvent) {
        match event {
            DeviceEvent::Started(state) => {
                info!("START | initial_state={}", state.label());
            }
            DeviceEvent::StateChanged { from, to, after_ms } => {
                info!(
                    "STATE | {} -> {} | after={}ms",
                    from.label(),
                    to.label(),
                    after_ms
                );
            }
            DeviceEvent::ShotFired {
                shot,
                protocol_id,
                frame,
                pulses,
            } => {
                let on_us: u32 = pulses.iter().filter(|p| p.high).map(|p| p.duration_us).sum();
                let total_us: u32 = pulses.iter().map(|p| p.duration_us).sum();
                info!(
                    "FIRE  | shot=#{} | protocol={} | frame={} | pulses={} on={}us total={}us",
                    shot,
                    protocol_id,
                    frame,
                    pulses.len(),
                    on_us,
                    total_us
                );
            }
            DeviceEvent::Confirmed { shot, auto } => {
                info!(
                    "CONF  | shot=#{} | mode={}",
                    shot,
                    if *auto { "auto" } else { "manual" }
                );
            }
            DeviceEvent::ConfirmMissed { shot } => {
                info!("CONF  | shot=#{} | missed", shot);
            }
            DeviceEvent::SelectionChanged {
                protocol_index,
                side,
            } => {
                info!(
                    "SELECT | protocol_index={} | side={}",
                    protocol_index,
                    side.label()
                );
            }
        }
    }
}
