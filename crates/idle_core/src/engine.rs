use crate::commands::apply_commands;
use crate::{collectors, factories, planets, trade};
use crate::{CommandEnvelope, EventEnvelope, EventLevel, GameContent, GameState};
use rand::Rng;

/// Advance the simulation by one display frame.
///
/// `now_ms` is the caller's monotonic clock. The elapsed time since the
/// previous frame drives movement; absolute time drives mining, production
/// and spawn timers.
///
/// Order of operations:
/// 1. Record the clock and compute elapsed time (0 on the first frame).
/// 2. Apply commands.
/// 3. If the viewport is not laid out yet, stop here; the caller retries next frame.
/// 4. Fire a due planet respawn and reassign idle collectors.
/// 5. Collectors.
/// 6. Factories (due production cycles, then progress).
/// 7. Trade post spawn and traders.
/// 8. Increment the frame counter.
pub fn frame(
    state: &mut GameState,
    now_ms: u64,
    commands: &[CommandEnvelope],
    content: &GameContent,
    rng: &mut impl Rng,
    event_level: EventLevel,
) -> Vec<EventEnvelope> {
    let mut events = Vec::new();

    let elapsed_ms = state
        .meta
        .last_frame_ms
        .map_or(0, |last| now_ms.saturating_sub(last));
    state.meta.last_frame_ms = Some(now_ms);
    state.meta.now_ms = now_ms.max(state.meta.now_ms);

    apply_commands(state, commands, content, event_level, &mut events);

    if !state.viewport.is_ready() {
        tracing::trace!(now_ms, "viewport not ready, skipping frame");
        return events;
    }

    #[cfg(feature = "instrumentation")]
    let started = std::time::Instant::now();

    planets::service_respawn(state, content, rng, &mut events);
    collectors::update_collectors(state, content, elapsed_ms, &mut events);
    factories::update_factories(state, content, &mut events);
    trade::update_traders(state, content, elapsed_ms, &mut events);

    #[cfg(feature = "instrumentation")]
    tracing::trace!(
        target: "idle_core::timing",
        frame = state.meta.frame,
        micros = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
        "frame advanced"
    );

    state.meta.frame += 1;
    events
}
