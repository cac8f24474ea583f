use crate::state::{AppState, SimState};
use idle_control::CommandSource;
use idle_core::{EventEnvelope, EventLevel};
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Advances the simulation by one frame of `frame_ms` simulated milliseconds:
/// queued HTTP commands first, then the autopilot's pick.
pub fn step_frame(sim: &mut SimState, frame_ms: u64) -> Vec<EventEnvelope> {
    let mut commands = std::mem::take(&mut sim.pending_commands);
    if let Some(autopilot) = sim.autopilot.as_mut() {
        commands.extend(autopilot.generate_commands(
            &sim.game_state,
            &sim.content,
            &mut sim.next_command_id,
        ));
    }

    let now_ms = match sim.game_state.meta.last_frame_ms {
        Some(_) => sim.game_state.meta.now_ms + frame_ms,
        None => sim.game_state.meta.now_ms,
    };
    let events = idle_core::frame(
        &mut sim.game_state,
        now_ms,
        &commands,
        &sim.content,
        &mut sim.rng,
        EventLevel::Normal,
    );

    let frame = sim.game_state.meta.frame;
    if sim.metrics_every > 0 && frame > 0 && frame % sim.metrics_every == 0 {
        let snapshot = idle_core::compute_metrics(&sim.game_state, &sim.content);
        sim.push_metrics(snapshot);
    }
    events
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub async fn run_frame_loop(app: AppState, max_frames: Option<u64>) {
    let frame_ms = (1_000.0 / app.frames_per_sec).round().max(1.0) as u64;
    let mut interval = tokio::time::interval(Duration::from_millis(frame_ms));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Burst);

    loop {
        interval.tick().await;
        if app.paused.load(Ordering::Relaxed) {
            continue;
        }

        let (events, done) = {
            let mut sim = app.sim.lock();
            let events = step_frame(&mut sim, frame_ms);
            let done = max_frames.is_some_and(|max| sim.game_state.meta.frame >= max);
            (events, done)
        };

        if !events.is_empty() {
            // No subscribers is fine; the batch is dropped.
            let _ = app.event_tx.send(events);
        }

        if done {
            tracing::info!("frame limit reached, stopping simulation");
            break;
        }
    }
}
