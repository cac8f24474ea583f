use super::*;
use crate::test_fixtures::{base_content, base_state, make_rng};
use rand_chacha::ChaCha8Rng;

mod collector_fsm;
mod planet_registry;
mod scheduler;

// --- Shared test helpers ------------------------------------------------

/// Frame step used by most tests. Three reference frames of movement.
const STEP_MS: u64 = 50;

/// A spot just above dock 0, close enough for short trips.
const NEAR_BASE: Vec2 = Vec2::new(6.125, 70.0);

fn test_content() -> GameContent {
    base_content()
}

fn test_state(content: &GameContent) -> GameState {
    base_state(content)
}

fn command(state: &mut GameState, command: Command) -> CommandEnvelope {
    CommandEnvelope {
        id: state.next_command_id(),
        issued_ms: state.meta.now_ms,
        command,
    }
}

/// Runs one frame `ms` after the previous one.
fn advance(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut ChaCha8Rng,
    ms: u64,
    commands: &[CommandEnvelope],
) -> Vec<EventEnvelope> {
    let now_ms = state.meta.now_ms + ms;
    frame(state, now_ms, commands, content, rng, EventLevel::Normal)
}

/// Registers a planet directly, bypassing the random spawn.
fn add_planet(state: &mut GameState, resources: u64, position: Vec2) -> PlanetId {
    let id = PlanetId(state.counters.next_planet_id);
    state.counters.next_planet_id += 1;
    state.planets.push(Planet {
        id,
        position,
        resources,
        size_percent: 8.0,
    });
    id
}

fn add_collector(state: &mut GameState, content: &GameContent) -> usize {
    let mut events = Vec::new();
    crate::collectors::add_collector_ship(state, content, &mut events).unwrap();
    state.collectors.len() - 1
}

/// Parks collector `index` at its dock, ready to deliver `amount` next frame.
fn ready_to_deliver(state: &mut GameState, content: &GameContent, index: usize, amount: u64) {
    let dock = crate::geometry::dock_position(&content.layout, &content.constants, index as u32);
    let ship = &mut state.collectors[index];
    ship.state = CollectorState::Delivering;
    ship.position = dock;
    ship.delivery_amount = amount;
    ship.cargo = amount;
}

fn count_events(events: &[EventEnvelope], pred: impl Fn(&Event) -> bool) -> usize {
    events.iter().filter(|e| pred(&e.event)).count()
}
