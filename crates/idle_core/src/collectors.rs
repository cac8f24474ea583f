//! Collector ships: travel to a planet, mine, fly home, deliver ore.
//!
//! Each ship holds a non-owning planet id that is re-validated against the
//! registry every time it is used; a planet removed by another ship simply
//! looks like "no target".

use crate::geometry::dock_position;
use crate::ledger::{credit, round_tenth};
use crate::planets::{find_planet, is_available, mine_from, next_available, remove_planet};
use crate::{
    AmountKind, CollectorId, CollectorShip, CollectorState, Event, EventEnvelope, GameContent,
    GameState,
};

/// Per-ship delivery size for a fleet yield multiplier.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn delivery_amount(content: &GameContent, yield_multiplier: f64) -> u64 {
    (content.constants.collector_base_yield as f64 * yield_multiplier)
        .round()
        .max(0.0) as u64
}

/// Adds a ship at the next free dock. Returns `None` when every dock is taken.
pub fn add_collector_ship(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> Option<CollectorId> {
    let dock_slot = u32::try_from(state.collectors.len()).ok()?;
    if dock_slot >= content.constants.collector_max_docks {
        return None;
    }

    let id = CollectorId(state.counters.next_collector_id);
    state.counters.next_collector_id += 1;
    let position = dock_position(&content.layout, &content.constants, dock_slot);
    state.collectors.push(CollectorShip {
        id,
        position,
        state: CollectorState::IdleNoPlanets,
        target_planet: None,
        delivery_amount: delivery_amount(content, state.fleet.yield_multiplier),
        cargo: 0,
        dock_slot,
        mining_started_ms: 0,
        mining_progress: 0.0,
    });
    crate::record(
        state,
        events,
        Event::CollectorAdded {
            collector_id: id,
            dock_slot,
            position,
        },
    );

    let index = state.collectors.len() - 1;
    if let Some(planet_id) = next_available(&state.planets) {
        state.collectors[index].target_planet = Some(planet_id);
        set_state(state, index, CollectorState::ReturningToSource, events);
    }
    Some(id)
}

/// Points every ship that is looking for work at the first available planet.
/// Ships carrying ore home or mining are left alone.
pub(crate) fn reassign_idle_collectors(state: &mut GameState, events: &mut Vec<EventEnvelope>) {
    let Some(planet_id) = next_available(&state.planets) else {
        return;
    };
    for index in 0..state.collectors.len() {
        let ship = &state.collectors[index];
        let searching = match ship.state {
            CollectorState::IdleNoPlanets => true,
            CollectorState::ReturningToSource => ship
                .target_planet
                .map_or(true, |target| !is_available(&state.planets, target)),
            CollectorState::Mining
            | CollectorState::ReturningToBase
            | CollectorState::Delivering => false,
        };
        if searching {
            state.collectors[index].target_planet = Some(planet_id);
            set_state(state, index, CollectorState::ReturningToSource, events);
        }
    }
}

/// Recomputes every ship's delivery amount from the fleet multiplier.
pub(crate) fn apply_fleet_yield(state: &mut GameState, content: &GameContent) {
    let amount = delivery_amount(content, state.fleet.yield_multiplier);
    for ship in &mut state.collectors {
        ship.delivery_amount = amount;
    }
}

pub(crate) fn upgrade_fleet_speed(state: &mut GameState, content: &GameContent) {
    state.fleet.base_speed += content.constants.collector_speed_increase;
}

pub(crate) fn upgrade_fleet_yield(state: &mut GameState, content: &GameContent) {
    state.fleet.yield_multiplier = round_tenth(
        state.fleet.yield_multiplier + content.constants.collector_yield_increase,
    );
    apply_fleet_yield(state, content);
}

/// Advances every collector by one frame.
pub(crate) fn update_collectors(
    state: &mut GameState,
    content: &GameContent,
    elapsed_ms: u64,
    events: &mut Vec<EventEnvelope>,
) {
    for index in 0..state.collectors.len() {
        match state.collectors[index].state {
            CollectorState::ReturningToSource => {
                update_returning_to_source(state, content, index, elapsed_ms, events);
            }
            CollectorState::Mining => update_mining(state, content, index, events),
            CollectorState::ReturningToBase => {
                update_returning_to_base(state, content, index, elapsed_ms, events);
            }
            CollectorState::Delivering => update_delivering(state, content, index, events),
            CollectorState::IdleNoPlanets => update_idle(state, index, events),
        }
    }
}

fn update_returning_to_source(
    state: &mut GameState,
    content: &GameContent,
    index: usize,
    elapsed_ms: u64,
    events: &mut Vec<EventEnvelope>,
) {
    let target = state.collectors[index]
        .target_planet
        .filter(|planet_id| is_available(&state.planets, *planet_id))
        .or_else(|| next_available(&state.planets));
    state.collectors[index].target_planet = target;

    let planet = target
        .and_then(|planet_id| find_planet(&state.planets, planet_id))
        .map(|planet| (planet.position, planet.size_percent));
    let Some((planet_position, planet_size)) = planet else {
        set_state(state, index, CollectorState::IdleNoPlanets, events);
        return;
    };
    let planet_radius_px = state.viewport.size_px(planet_size) / 2.0;

    let constants = &content.constants;
    let ship = &state.collectors[index];
    let reach_px = planet_radius_px
        + collector_radius_px(state, content)
        + constants.collector_arrival_buffer_units * state.viewport.game_unit_px;
    if state.viewport.distance_px(ship.position, planet_position) < reach_px {
        let now_ms = state.meta.now_ms;
        let ship = &mut state.collectors[index];
        ship.mining_started_ms = now_ms;
        ship.mining_progress = 0.0;
        set_state(state, index, CollectorState::Mining, events);
        return;
    }

    let step = travel_step(state, constants.collector_source_speed_factor, elapsed_ms, content);
    let ship = &mut state.collectors[index];
    ship.position = ship.position.step_towards(planet_position, step);
}

fn update_mining(
    state: &mut GameState,
    content: &GameContent,
    index: usize,
    events: &mut Vec<EventEnvelope>,
) {
    let planet = state.collectors[index]
        .target_planet
        .and_then(|planet_id| find_planet(&state.planets, planet_id))
        .map(|planet| (planet.id, planet.position));
    let Some((planet_id, planet_position)) = planet else {
        // Another ship emptied the planet first; nothing was mined.
        let ship = &mut state.collectors[index];
        ship.target_planet = None;
        ship.cargo = 0;
        set_state(state, index, CollectorState::ReturningToBase, events);
        return;
    };
    let ship = &state.collectors[index];

    let now_ms = state.meta.now_ms;
    let duration = content.constants.collector_mining_duration_ms.max(1);
    let elapsed = now_ms.saturating_sub(ship.mining_started_ms);
    #[allow(clippy::cast_possible_truncation)]
    let progress = (elapsed as f64 / duration as f64).clamp(0.0, 1.0) as f32;

    let ship = &mut state.collectors[index];
    ship.position = planet_position;
    ship.mining_progress = progress;
    if elapsed < duration {
        return;
    }

    let collector_id = ship.id;
    let amount = ship.delivery_amount;
    ship.cargo = amount;
    let remaining = mine_from(state, planet_id, amount).unwrap_or(0);
    crate::record(
        state,
        events,
        Event::MiningCompleted {
            collector_id,
            planet_id,
            amount,
            planet_remaining: remaining,
        },
    );
    if remaining == 0 {
        remove_planet(state, content, planet_id, events);
        state.collectors[index].target_planet = None;
    }
    set_state(state, index, CollectorState::ReturningToBase, events);
}

fn update_returning_to_base(
    state: &mut GameState,
    content: &GameContent,
    index: usize,
    elapsed_ms: u64,
    events: &mut Vec<EventEnvelope>,
) {
    let constants = &content.constants;
    let ship = &state.collectors[index];
    let dock = dock_position(&content.layout, constants, ship.dock_slot);
    let reach_px = collector_radius_px(state, content)
        + constants.collector_arrival_buffer_units * state.viewport.game_unit_px;

    if state.viewport.distance_px(ship.position, dock) < reach_px {
        state.collectors[index].position = dock;
        set_state(state, index, CollectorState::Delivering, events);
        return;
    }

    let step = travel_step(state, constants.collector_base_speed_factor, elapsed_ms, content);
    let ship = &mut state.collectors[index];
    ship.position = ship.position.step_towards(dock, step);
}

fn update_delivering(
    state: &mut GameState,
    content: &GameContent,
    index: usize,
    events: &mut Vec<EventEnvelope>,
) {
    let ship = &state.collectors[index];
    let collector_id = ship.id;
    let amount = ship.cargo;
    let position = ship.position;

    if amount == 0 {
        tracing::debug!(collector = %collector_id, "collector docked empty");
        state.collectors[index].target_planet = None;
        set_state(state, index, CollectorState::ReturningToSource, events);
        return;
    }

    if state.ledger.ore_stored + amount > state.ledger.ore_capacity {
        let ore_free = state.ledger.ore_free();
        tracing::debug!(collector = %collector_id, amount, ore_free, "ore storage full, delivery deferred");
        crate::record(
            state,
            events,
            Event::DeliveryDeferred {
                collector_id,
                amount,
                ore_free,
            },
        );
        let ship = &mut state.collectors[index];
        ship.target_planet = None;
        ship.cargo = 0;
        set_state(state, index, CollectorState::IdleNoPlanets, events);
        return;
    }

    state.ledger.add_ore(credit(amount));
    state.ledger.add_score(credit(amount));
    crate::record(state, events, Event::OreDelivered { collector_id, amount });
    crate::record(
        state,
        events,
        Event::FloatingAmount {
            kind: AmountKind::Ore,
            amount,
            position,
        },
    );
    let ship = &mut state.collectors[index];
    ship.target_planet = None;
    ship.cargo = 0;
    set_state(state, index, CollectorState::ReturningToSource, events);
    crate::factories::recheck_production(state, content, events);
}

fn update_idle(state: &mut GameState, index: usize, events: &mut Vec<EventEnvelope>) {
    if let Some(planet_id) = next_available(&state.planets) {
        state.collectors[index].target_planet = Some(planet_id);
        set_state(state, index, CollectorState::ReturningToSource, events);
    }
}

fn collector_radius_px(state: &GameState, content: &GameContent) -> f32 {
    state
        .viewport
        .size_px(content.constants.collector_size_percent)
        / 2.0
}

/// Percent units a ship covers this frame. Speeds are per reference frame.
#[allow(clippy::cast_possible_truncation)]
fn travel_step(state: &GameState, factor: f64, elapsed_ms: u64, content: &GameContent) -> f32 {
    let frames = elapsed_ms as f64 / content.constants.reference_frame_ms;
    (state.fleet.base_speed * factor * frames) as f32
}

fn set_state(
    state: &mut GameState,
    index: usize,
    to: CollectorState,
    events: &mut Vec<EventEnvelope>,
) {
    let ship = &mut state.collectors[index];
    let from = ship.state;
    if from == to {
        return;
    }
    ship.state = to;
    if to != CollectorState::Mining {
        ship.mining_progress = 0.0;
    }
    let collector_id = ship.id;
    tracing::debug!(collector = %collector_id, ?from, ?to, "collector state change");
    crate::record(
        state,
        events,
        Event::CollectorStateChanged {
            collector_id,
            from,
            to,
        },
    );
}
