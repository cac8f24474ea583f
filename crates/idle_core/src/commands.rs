use crate::collectors::{add_collector_ship, upgrade_fleet_speed, upgrade_fleet_yield};
use crate::factories::{new_factory, recheck_production};
use crate::ledger::scale_up;
use crate::trade::new_trade_post;
use crate::{
    factories, trade, Command, CommandEnvelope, Event, EventEnvelope, EventLevel, FactoryId,
    GameContent, GameState, RejectReason, UpgradeKind, Viewport,
};

type CommandResult = Result<(), RejectReason>;

/// Applies player commands in order. Each is a single ledger-gated mutation;
/// a command whose preconditions fail changes nothing.
pub(crate) fn apply_commands(
    state: &mut GameState,
    commands: &[CommandEnvelope],
    content: &GameContent,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    for envelope in commands {
        let result = match &envelope.command {
            Command::BuyCollector => handle_buy_collector(state, content, events),
            Command::UpgradeCollectorSpeed => handle_upgrade_collector_speed(state, content, events),
            Command::UpgradeCollectorYield => handle_upgrade_collector_yield(state, content, events),
            Command::UpgradeOreStorage => handle_upgrade_ore_storage(state, content, events),
            Command::UpgradeGoodsStorage => handle_upgrade_goods_storage(state, content, events),
            Command::BuildFactory { slot } => handle_build_factory(state, content, *slot, events),
            Command::UpgradeFactoryYield { factory_id } => {
                handle_upgrade_factory_yield(state, content, *factory_id, events)
            }
            Command::UpgradeFactorySpeed { factory_id } => {
                handle_upgrade_factory_speed(state, content, *factory_id, events)
            }
            Command::BuildTradePost => handle_build_trade_post(state, content, events),
            Command::UpgradeTradePrice => handle_upgrade_trade_price(state, content, events),
            Command::UpgradeTraderSpeed => handle_upgrade_trader_speed(state, content, events),
            Command::SetViewport {
                width_px,
                height_px,
            } => handle_set_viewport(state, content, *width_px, *height_px, events),
        };

        match result {
            Ok(()) => recheck_production(state, content, events),
            Err(reason) => {
                tracing::debug!(command = %envelope.id, ?reason, "command rejected");
                if event_level == EventLevel::Debug {
                    crate::record(
                        state,
                        events,
                        Event::CommandRejected {
                            command_id: envelope.id,
                            reason,
                        },
                    );
                }
            }
        }
    }
}

fn spend(state: &mut GameState, cost: u64) -> CommandResult {
    if state.ledger.try_spend(cost) {
        Ok(())
    } else {
        Err(RejectReason::InsufficientScore)
    }
}

fn record_upgrade(
    state: &mut GameState,
    events: &mut Vec<EventEnvelope>,
    upgrade: UpgradeKind,
    cost: u64,
    next_cost: u64,
) {
    tracing::info!(?upgrade, cost, next_cost, "upgrade purchased");
    crate::record(
        state,
        events,
        Event::UpgradePurchased {
            upgrade,
            cost,
            next_cost,
        },
    );
}

fn handle_buy_collector(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> CommandResult {
    let max_docks = usize::try_from(content.constants.collector_max_docks).unwrap_or(usize::MAX);
    if state.collectors.len() >= max_docks {
        return Err(RejectReason::FleetFull);
    }
    let cost = state.costs.buy_collector;
    spend(state, cost)?;
    let Some(collector_id) = add_collector_ship(state, content, events) else {
        state.ledger.add_score(crate::ledger::credit(cost));
        return Err(RejectReason::FleetFull);
    };
    state.costs.buy_collector = scale_up(cost, content.constants.collector_buy_cost_multiplier);
    tracing::info!(collector = %collector_id, cost, fleet = state.collectors.len(), "collector bought");
    Ok(())
}

fn handle_upgrade_collector_speed(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> CommandResult {
    let cost = state.costs.collector_speed;
    spend(state, cost)?;
    upgrade_fleet_speed(state, content);
    let next_cost = scale_up(cost, content.constants.collector_speed_cost_multiplier);
    state.costs.collector_speed = next_cost;
    record_upgrade(state, events, UpgradeKind::CollectorSpeed, cost, next_cost);
    Ok(())
}

fn handle_upgrade_collector_yield(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> CommandResult {
    let cost = state.costs.collector_yield;
    spend(state, cost)?;
    upgrade_fleet_yield(state, content);
    let next_cost = scale_up(cost, content.constants.collector_yield_cost_multiplier);
    state.costs.collector_yield = next_cost;
    record_upgrade(state, events, UpgradeKind::CollectorYield, cost, next_cost);
    Ok(())
}

fn handle_upgrade_ore_storage(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> CommandResult {
    let constants = &content.constants;
    let cost = state.costs.ore_storage;
    if !state.ledger.upgrade_ore_capacity(
        &mut state.costs.ore_storage,
        constants.ore_storage_capacity_multiplier,
        constants.ore_storage_cost_multiplier,
    ) {
        return Err(RejectReason::InsufficientScore);
    }
    let next_cost = state.costs.ore_storage;
    record_upgrade(state, events, UpgradeKind::OreStorage, cost, next_cost);
    Ok(())
}

fn handle_upgrade_goods_storage(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> CommandResult {
    let constants = &content.constants;
    let cost = state.costs.goods_storage;
    if !state.ledger.upgrade_goods_capacity(
        &mut state.costs.goods_storage,
        constants.goods_storage_capacity_multiplier,
        constants.goods_storage_cost_multiplier,
    ) {
        return Err(RejectReason::InsufficientScore);
    }
    let next_cost = state.costs.goods_storage;
    record_upgrade(state, events, UpgradeKind::GoodsStorage, cost, next_cost);
    Ok(())
}

fn handle_build_factory(
    state: &mut GameState,
    content: &GameContent,
    slot: u32,
    events: &mut Vec<EventEnvelope>,
) -> CommandResult {
    if slot >= content.constants.factory_slots {
        return Err(RejectReason::SlotOutOfRange);
    }
    if state.factories.iter().any(|factory| factory.slot == slot) {
        return Err(RejectReason::SlotOccupied);
    }
    let cost = state.costs.factory_build;
    spend(state, cost)?;
    let factory_id = new_factory(state, content, slot);
    tracing::info!(factory = %factory_id, slot, cost, "factory built");
    crate::record(state, events, Event::FactoryBuilt { factory_id, slot });
    Ok(())
}

fn factory_index(state: &GameState, factory_id: FactoryId) -> Result<usize, RejectReason> {
    state
        .factories
        .iter()
        .position(|factory| factory.id == factory_id)
        .ok_or(RejectReason::UnknownFactory)
}

fn handle_upgrade_factory_yield(
    state: &mut GameState,
    content: &GameContent,
    factory_id: FactoryId,
    events: &mut Vec<EventEnvelope>,
) -> CommandResult {
    let index = factory_index(state, factory_id)?;
    let (cost, next_cost) =
        factories::upgrade_yield(state, content, index).ok_or(RejectReason::InsufficientScore)?;
    record_upgrade(state, events, UpgradeKind::FactoryYield(factory_id), cost, next_cost);
    Ok(())
}

fn handle_upgrade_factory_speed(
    state: &mut GameState,
    content: &GameContent,
    factory_id: FactoryId,
    events: &mut Vec<EventEnvelope>,
) -> CommandResult {
    let index = factory_index(state, factory_id)?;
    let (cost, next_cost) = factories::upgrade_speed(state, content, index, events)
        .ok_or(RejectReason::InsufficientScore)?;
    record_upgrade(state, events, UpgradeKind::FactorySpeed(factory_id), cost, next_cost);
    Ok(())
}

fn handle_build_trade_post(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> CommandResult {
    if state.trade_post.is_some() {
        return Err(RejectReason::AlreadyBuilt);
    }
    let slot = content.constants.trade_post_slot;
    if state.factories.iter().any(|factory| factory.slot == slot) {
        return Err(RejectReason::SlotOccupied);
    }
    let cost = state.costs.trade_post_build;
    spend(state, cost)?;
    state.trade_post = Some(new_trade_post(content, state.meta.now_ms));
    tracing::info!(slot, cost, "trade post built");
    crate::record(state, events, Event::TradePostBuilt { slot });
    Ok(())
}

fn handle_upgrade_trade_price(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> CommandResult {
    if state.trade_post.is_none() {
        return Err(RejectReason::NoTradePost);
    }
    let (cost, next_cost) =
        trade::upgrade_price(state, content).ok_or(RejectReason::InsufficientScore)?;
    record_upgrade(state, events, UpgradeKind::TradePrice, cost, next_cost);
    Ok(())
}

fn handle_upgrade_trader_speed(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> CommandResult {
    if state.trade_post.is_none() {
        return Err(RejectReason::NoTradePost);
    }
    let (cost, next_cost) =
        trade::upgrade_speed(state, content).ok_or(RejectReason::InsufficientScore)?;
    record_upgrade(state, events, UpgradeKind::TraderSpeed, cost, next_cost);
    Ok(())
}

fn handle_set_viewport(
    state: &mut GameState,
    content: &GameContent,
    width_px: f32,
    height_px: f32,
    events: &mut Vec<EventEnvelope>,
) -> CommandResult {
    if !(width_px.is_finite() && height_px.is_finite()) || width_px < 0.0 || height_px < 0.0 {
        return Err(RejectReason::InvalidViewport);
    }
    let viewport = Viewport::new(width_px, height_px, &content.constants);
    state.viewport = viewport;
    crate::record(state, events, Event::ViewportChanged { viewport });
    Ok(())
}
