//! Deterministic frame simulation of the idle mining economy.
//!
//! No IO, no network. All randomness via the passed-in Rng, all time via the
//! caller's clock.

pub mod collectors;
mod commands;
mod engine;
pub mod factories;
pub mod geometry;
mod ledger;
pub mod metrics;
pub mod planets;
mod state;
mod timers;
mod trade;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use engine::frame;
pub use ledger::scale_up;
pub use metrics::{compute_metrics, MetricsFileWriter, MetricsSnapshot};
pub use types::*;

pub(crate) fn emit(counters: &mut Counters, frame: u64, at_ms: u64, event: Event) -> EventEnvelope {
    let id = EventId(counters.next_event_id);
    counters.next_event_id += 1;
    EventEnvelope {
        id,
        frame,
        at_ms,
        event,
    }
}

/// Stamps `event` with the current frame and clock and appends it.
pub(crate) fn record(state: &mut GameState, events: &mut Vec<EventEnvelope>, event: Event) {
    let envelope = emit(
        &mut state.counters,
        state.meta.frame,
        state.meta.now_ms,
        event,
    );
    events.push(envelope);
}

#[cfg(test)]
mod tests;
