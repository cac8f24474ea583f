//! Planet registry: spawning, depletion and the delayed bulk respawn.

use rand::Rng;

use crate::{Event, EventEnvelope, GameContent, GameState, Planet, PlanetId, TimerKind, Vec2};

/// First planet in insertion order that still has resources.
pub fn next_available(planets: &[Planet]) -> Option<PlanetId> {
    planets
        .iter()
        .find(|planet| planet.resources > 0)
        .map(|planet| planet.id)
}

/// True when `planet_id` is still registered and not depleted.
pub fn is_available(planets: &[Planet], planet_id: PlanetId) -> bool {
    planets
        .iter()
        .any(|planet| planet.id == planet_id && planet.resources > 0)
}

pub fn find_planet(planets: &[Planet], planet_id: PlanetId) -> Option<&Planet> {
    planets.iter().find(|planet| planet.id == planet_id)
}

/// Adds one planet at a random spot of the spawn band, avoiding UI panels.
pub fn spawn_planet(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> PlanetId {
    let constants = &content.constants;
    let position = pick_spawn_position(content, rng);

    let resources = if constants.planet_max_resources > constants.planet_min_resources {
        rng.gen_range(constants.planet_min_resources..constants.planet_max_resources)
    } else {
        constants.planet_min_resources
    };

    let id = PlanetId(state.counters.next_planet_id);
    state.counters.next_planet_id += 1;
    state.planets.push(Planet {
        id,
        position,
        resources,
        size_percent: constants.planet_size_percent,
    });

    tracing::debug!(planet = %id, resources, x = position.x, y = position.y, "planet spawned");
    crate::record(
        state,
        events,
        Event::PlanetSpawned {
            planet_id: id,
            position,
            resources,
        },
    );
    id
}

fn pick_spawn_position(content: &GameContent, rng: &mut impl Rng) -> Vec2 {
    let constants = &content.constants;
    let size = constants.planet_size_percent;
    let y_min = constants.planet_spawn_top * 100.0;
    let y_max = constants.planet_spawn_bottom * 100.0;
    let x_span = (100.0 - size).max(0.0);
    let y_span = (y_max - y_min - size).max(0.0);

    let mut candidate = Vec2::default();
    for _ in 0..constants.planet_spawn_max_attempts.max(1) {
        candidate = Vec2::new(
            rng.gen::<f32>() * x_span + size / 2.0,
            rng.gen::<f32>() * y_span + y_min + size / 2.0,
        );
        let blocked = content
            .layout
            .ui_exclusion_zones
            .iter()
            .any(|zone| zone.overlaps_square(candidate, size));
        if !blocked {
            return candidate;
        }
    }

    tracing::warn!(
        attempts = constants.planet_spawn_max_attempts,
        x = candidate.x,
        y = candidate.y,
        "no planet position clear of the UI, using last candidate"
    );
    candidate
}

/// Clears the registry and spawns the configured starting set.
pub fn spawn_initial_set(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    state.planets.clear();
    for _ in 0..content.constants.planet_initial_count {
        spawn_planet(state, content, rng, events);
    }
    tracing::info!(count = state.planets.len(), "planet set spawned");
}

/// Debits mined resources from a planet. Returns the remaining amount, or
/// `None` if the planet is gone.
pub(crate) fn mine_from(state: &mut GameState, planet_id: PlanetId, amount: u64) -> Option<u64> {
    let planet = state
        .planets
        .iter_mut()
        .find(|planet| planet.id == planet_id)?;
    planet.resources = planet.resources.saturating_sub(amount);
    Some(planet.resources)
}

/// Removes a planet. An emptied registry schedules the bulk respawn.
pub(crate) fn remove_planet(
    state: &mut GameState,
    content: &GameContent,
    planet_id: PlanetId,
    events: &mut Vec<EventEnvelope>,
) {
    let before = state.planets.len();
    state.planets.retain(|planet| planet.id != planet_id);
    if state.planets.len() == before {
        return;
    }
    tracing::info!(planet = %planet_id, "planet depleted");
    crate::record(state, events, Event::PlanetDepleted { planet_id });

    if state.planets.is_empty() && !state.timers.is_scheduled(TimerKind::PlanetRespawn) {
        let due_ms = state.meta.now_ms + content.constants.planet_respawn_delay_ms;
        state.timers.schedule(due_ms, TimerKind::PlanetRespawn);
        crate::record(state, events, Event::PlanetRespawnScheduled { due_ms });
    }
}

/// Fires a due respawn: new planet set, then every ship looks for a target again.
pub(crate) fn service_respawn(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let now_ms = state.meta.now_ms;
    while state
        .timers
        .pop_due(now_ms, |kind| matches!(kind, TimerKind::PlanetRespawn))
        .is_some()
    {
        spawn_initial_set(state, content, rng, events);
        crate::collectors::reassign_idle_collectors(state, events);
    }
}
