//! Trade post and trader ships.
//!
//! The post spawns a trader every `trader_spawn_interval_ms` while goods are
//! in storage. A trader carries a snapshot of the goods pool, sells it on
//! arrival, then flies off-screen and is removed.

use crate::geometry::slot_position;
use crate::ledger::{credit, debit, round_tenth, scale_up};
use crate::{
    AmountKind, Event, EventEnvelope, GameContent, GameState, TradePost, TraderId, TraderShip,
    TraderState, Vec2,
};

pub(crate) fn new_trade_post(content: &GameContent, now_ms: u64) -> TradePost {
    let constants = &content.constants;
    TradePost {
        slot: constants.trade_post_slot,
        position: slot_position(&content.layout, constants, constants.trade_post_slot),
        sell_price: constants.trade_base_price_per_good,
        trader_speed: constants.trader_base_speed,
        price_upgrade_cost: constants.trade_price_upgrade_cost,
        speed_upgrade_cost: constants.trader_speed_upgrade_cost,
        last_spawn_ms: now_ms,
    }
}

/// Spawns a due trader, then advances every trader by one frame.
pub(crate) fn update_traders(
    state: &mut GameState,
    content: &GameContent,
    elapsed_ms: u64,
    events: &mut Vec<EventEnvelope>,
) {
    maybe_spawn_trader(state, content, events);

    let mut departed = Vec::new();
    for index in 0..state.traders.len() {
        match state.traders[index].state {
            TraderState::Approaching => {
                if update_approaching(state, content, index, elapsed_ms) {
                    sell(state, content, index, events);
                }
            }
            TraderState::Selling => sell(state, content, index, events),
            TraderState::Departing => {
                if update_departing(state, content, index, elapsed_ms) {
                    departed.push(state.traders[index].id);
                }
            }
        }
    }

    for trader_id in departed {
        state.traders.retain(|trader| trader.id != trader_id);
        tracing::debug!(trader = %trader_id, "trader departed");
        crate::record(state, events, Event::TraderDeparted { trader_id });
    }
}

fn maybe_spawn_trader(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    let now_ms = state.meta.now_ms;
    let Some(post) = state.trade_post.as_mut() else {
        return;
    };
    if state.ledger.goods_stored == 0
        || now_ms.saturating_sub(post.last_spawn_ms) < content.constants.trader_spawn_interval_ms
    {
        return;
    }
    post.last_spawn_ms = now_ms;
    let target = post.position;
    let speed = post.trader_speed;

    let goods_carried = state.ledger.goods_stored;
    let trader_id = TraderId(state.counters.next_trader_id);
    state.counters.next_trader_id += 1;
    state.traders.push(TraderShip {
        id: trader_id,
        position: Vec2::new(content.constants.trader_entry_x_percent, target.y),
        state: TraderState::Approaching,
        goods_carried,
        target,
        speed,
    });

    tracing::debug!(trader = %trader_id, goods_carried, "trader spawned");
    crate::record(
        state,
        events,
        Event::TraderSpawned {
            trader_id,
            goods_carried,
        },
    );
}

/// Moves an approaching trader. Returns true once it is within selling
/// distance of the post, at which point it is switched to `Selling`.
fn update_approaching(
    state: &mut GameState,
    content: &GameContent,
    index: usize,
    elapsed_ms: u64,
) -> bool {
    let reach_px = state.viewport.size_px(content.constants.trader_size_percent) * 1.5;
    let trader = &state.traders[index];
    if state.viewport.distance_px(trader.position, trader.target) < reach_px {
        state.traders[index].state = TraderState::Selling;
        return true;
    }
    let step = trader_step(trader, content, elapsed_ms);
    let trader = &mut state.traders[index];
    trader.position = trader.position.step_towards(trader.target, step);
    false
}

/// Settles the sale: debits the carried goods and credits the score. The
/// score is paid on the spawn-time snapshot; if the pool shrank since, the
/// goods debit is clamped at zero.
fn sell(
    state: &mut GameState,
    content: &GameContent,
    index: usize,
    events: &mut Vec<EventEnvelope>,
) {
    let Some(price) = state.trade_post.as_ref().map(|post| post.sell_price) else {
        return;
    };
    let trader = &state.traders[index];
    let trader_id = trader.id;
    let goods = trader.goods_carried;
    let score = goods.saturating_mul(price);

    if goods > state.ledger.goods_stored {
        tracing::warn!(
            trader = %trader_id,
            carried = goods,
            stored = state.ledger.goods_stored,
            "trader carries more goods than are stored"
        );
    }
    state.ledger.add_goods(debit(goods));
    state.ledger.add_score(credit(score));

    let position = trader.position;
    let trader = &mut state.traders[index];
    trader.state = TraderState::Departing;
    trader.target = Vec2::new(content.constants.trader_exit_x_percent, trader.position.y);

    crate::record(
        state,
        events,
        Event::GoodsSold {
            trader_id,
            goods,
            score,
        },
    );
    crate::record(
        state,
        events,
        Event::FloatingAmount {
            kind: AmountKind::Score,
            amount: score,
            position,
        },
    );
    crate::factories::recheck_production(state, content, events);
}

/// Moves a departing trader. Returns true once it has left the play area.
fn update_departing(
    state: &mut GameState,
    content: &GameContent,
    index: usize,
    elapsed_ms: u64,
) -> bool {
    let trader = &state.traders[index];
    if trader.position.x < content.constants.trader_despawn_x_percent {
        return true;
    }
    let step = trader_step(trader, content, elapsed_ms);
    let trader = &mut state.traders[index];
    trader.position = trader.position.step_towards(trader.target, step);
    false
}

#[allow(clippy::cast_possible_truncation)]
fn trader_step(trader: &TraderShip, content: &GameContent, elapsed_ms: u64) -> f32 {
    (trader.speed * elapsed_ms as f64 / content.constants.reference_frame_ms) as f32
}

pub(crate) fn upgrade_price(state: &mut GameState, content: &GameContent) -> Option<(u64, u64)> {
    let constants = &content.constants;
    let cost = state.trade_post.as_ref()?.price_upgrade_cost;
    if !state.ledger.try_spend(cost) {
        return None;
    }
    let post = state.trade_post.as_mut()?;
    post.sell_price += constants.trade_price_increase;
    post.price_upgrade_cost = scale_up(cost, constants.trade_price_cost_multiplier);
    Some((cost, post.price_upgrade_cost))
}

/// Faster traders apply to ships spawned after the upgrade.
pub(crate) fn upgrade_speed(state: &mut GameState, content: &GameContent) -> Option<(u64, u64)> {
    let constants = &content.constants;
    let cost = state.trade_post.as_ref()?.speed_upgrade_cost;
    if !state.ledger.try_spend(cost) {
        return None;
    }
    let post = state.trade_post.as_mut()?;
    post.trader_speed = round_tenth(post.trader_speed + constants.trader_speed_increase);
    post.speed_upgrade_cost = scale_up(cost, constants.trader_speed_cost_multiplier);
    Some((cost, post.speed_upgrade_cost))
}
