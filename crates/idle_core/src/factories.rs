//! Factories: recurring production cycles converting stored ore into goods.
//!
//! A running factory owns one `FactoryCycle` timer. Every firing re-checks
//! the ledger; a failed check stops the factory until the next
//! [`recheck_production`] finds the preconditions satisfied again.

use crate::ledger::{credit, debit, round_tenth, scale_up};
use crate::{
    AmountKind, Event, EventEnvelope, Factory, FactoryId, GameContent, GameState, TimerKind,
};

/// Goods a factory produces per cycle.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn goods_per_cycle(factory: &Factory) -> u64 {
    (factory.yield_base as f64 * factory.yield_multiplier)
        .round()
        .max(0.0) as u64
}

/// Length of one production cycle in milliseconds.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn cycle_period_ms(factory: &Factory, content: &GameContent) -> u64 {
    debug_assert!(factory.speed_multiplier > 0.0, "speed multiplier must be positive");
    let period = content.constants.factory_base_duration_ms as f64 / factory.speed_multiplier;
    (period.round() as u64).max(1)
}

/// Whether the ledger can absorb one cycle of this factory right now.
pub fn can_produce(state: &GameState, content: &GameContent, factory: &Factory) -> bool {
    let ledger = &state.ledger;
    ledger.ore_stored >= content.constants.factory_ore_consumption
        && ledger.goods_stored + goods_per_cycle(factory) <= ledger.goods_capacity
}

pub(crate) fn new_factory(state: &mut GameState, content: &GameContent, slot: u32) -> FactoryId {
    let constants = &content.constants;
    let id = FactoryId(state.counters.next_factory_id);
    state.counters.next_factory_id += 1;
    state.factories.push(Factory {
        id,
        slot,
        yield_base: constants.factory_goods_yield,
        yield_multiplier: 1.0,
        speed_multiplier: 1.0,
        yield_upgrade_cost: constants.factory_yield_upgrade_cost,
        speed_upgrade_cost: constants.factory_speed_upgrade_cost,
        production_active: false,
        production_started_ms: 0,
        progress: 0.0,
    });
    id
}

/// Starts every idle factory whose preconditions hold. Running factories are
/// untouched, so calling this repeatedly without a ledger change is a no-op.
pub fn recheck_production(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    for index in 0..state.factories.len() {
        let factory = &state.factories[index];
        if !factory.production_active && can_produce(state, content, factory) {
            start_production(state, content, index, events);
        }
    }
}

/// (Re)starts the production timer of one factory. The first output comes
/// one full period from now. If the preconditions fail the factory is left
/// stopped.
pub(crate) fn start_production(
    state: &mut GameState,
    content: &GameContent,
    index: usize,
    events: &mut Vec<EventEnvelope>,
) {
    let factory_id = state.factories[index].id;
    state.timers.cancel(TimerKind::FactoryCycle(factory_id));

    if !can_produce(state, content, &state.factories[index]) {
        let factory = &mut state.factories[index];
        factory.production_active = false;
        factory.progress = 0.0;
        return;
    }

    let now_ms = state.meta.now_ms;
    let period_ms = cycle_period_ms(&state.factories[index], content);
    let factory = &mut state.factories[index];
    factory.production_active = true;
    factory.production_started_ms = now_ms;
    factory.progress = 0.0;
    state
        .timers
        .schedule(now_ms + period_ms, TimerKind::FactoryCycle(factory_id));

    tracing::debug!(factory = %factory_id, period_ms, "production started");
    crate::record(
        state,
        events,
        Event::ProductionStarted {
            factory_id,
            period_ms,
        },
    );
}

fn stop_production(state: &mut GameState, index: usize, events: &mut Vec<EventEnvelope>) {
    let factory = &mut state.factories[index];
    let factory_id = factory.id;
    factory.production_active = false;
    factory.progress = 0.0;
    state.timers.cancel(TimerKind::FactoryCycle(factory_id));

    tracing::debug!(factory = %factory_id, "production stopped");
    crate::record(state, events, Event::ProductionStopped { factory_id });
}

/// Fires every due production cycle (in due order, catching up after a long
/// frame gap) and refreshes the progress of running factories.
pub(crate) fn update_factories(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    let now_ms = state.meta.now_ms;
    while let Some(timer) = state
        .timers
        .pop_due(now_ms, |kind| matches!(kind, TimerKind::FactoryCycle(_)))
    {
        let TimerKind::FactoryCycle(factory_id) = timer.kind else {
            continue;
        };
        run_cycle(state, content, factory_id, timer.due_ms, events);
    }

    for factory in &mut state.factories {
        factory.progress = cycle_progress(factory, content, now_ms);
    }
}

#[allow(clippy::cast_possible_truncation)]
fn cycle_progress(factory: &Factory, content: &GameContent, now_ms: u64) -> f32 {
    if !factory.production_active {
        return 0.0;
    }
    let period_ms = cycle_period_ms(factory, content);
    let elapsed = now_ms.saturating_sub(factory.production_started_ms);
    (elapsed as f64 / period_ms as f64).min(1.0) as f32
}

fn run_cycle(
    state: &mut GameState,
    content: &GameContent,
    factory_id: FactoryId,
    due_ms: u64,
    events: &mut Vec<EventEnvelope>,
) {
    let Some(index) = state.factories.iter().position(|f| f.id == factory_id) else {
        return;
    };

    if !can_produce(state, content, &state.factories[index]) {
        stop_production(state, index, events);
        recheck_production(state, content, events);
        return;
    }

    let consumed = content.constants.factory_ore_consumption;
    let goods = goods_per_cycle(&state.factories[index]);
    state.ledger.add_ore(debit(consumed));
    state.ledger.add_goods(credit(goods));

    let period_ms = cycle_period_ms(&state.factories[index], content);
    state.factories[index].production_started_ms = due_ms;
    state
        .timers
        .schedule(due_ms + period_ms, TimerKind::FactoryCycle(factory_id));

    let position = crate::geometry::slot_position(
        &content.layout,
        &content.constants,
        state.factories[index].slot,
    );
    crate::record(
        state,
        events,
        Event::GoodsProduced {
            factory_id,
            ore_consumed: consumed,
            goods,
        },
    );
    crate::record(
        state,
        events,
        Event::FloatingAmount {
            kind: AmountKind::Goods,
            amount: goods,
            position,
        },
    );
    recheck_production(state, content, events);
}

/// Raises one factory's output multiplier. Returns the `(cost, next_cost)`
/// pair on success.
pub(crate) fn upgrade_yield(
    state: &mut GameState,
    content: &GameContent,
    index: usize,
) -> Option<(u64, u64)> {
    let constants = &content.constants;
    let cost = state.factories[index].yield_upgrade_cost;
    if !state.ledger.try_spend(cost) {
        return None;
    }
    let factory = &mut state.factories[index];
    factory.yield_multiplier =
        round_tenth(factory.yield_multiplier + constants.factory_yield_increase);
    factory.yield_upgrade_cost = scale_up(cost, constants.factory_yield_cost_multiplier);
    Some((cost, factory.yield_upgrade_cost))
}

/// Raises one factory's speed and restarts its timer with the shorter period.
pub(crate) fn upgrade_speed(
    state: &mut GameState,
    content: &GameContent,
    index: usize,
    events: &mut Vec<EventEnvelope>,
) -> Option<(u64, u64)> {
    let constants = &content.constants;
    let cost = state.factories[index].speed_upgrade_cost;
    if !state.ledger.try_spend(cost) {
        return None;
    }
    let factory = &mut state.factories[index];
    factory.speed_multiplier =
        round_tenth(factory.speed_multiplier + constants.factory_speed_increase);
    factory.speed_upgrade_cost = scale_up(cost, constants.factory_speed_cost_multiplier);
    let next_cost = factory.speed_upgrade_cost;

    if state.factories[index].production_active {
        stop_production(state, index, events);
    }
    start_production(state, content, index, events);
    Some((cost, next_cost))
}
