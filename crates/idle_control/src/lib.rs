use idle_core::factories::goods_per_cycle;
use idle_core::{Command, CommandEnvelope, CommandId, GameContent, GameState, ResourceLedger};

pub trait CommandSource {
    fn generate_commands(
        &mut self,
        state: &GameState,
        content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope>;
}

/// Plays the economy greedily, one purchase per frame at most:
/// 1. Build the first factory.
/// 2. Build the trade post once goods can be produced.
/// 3. Expand a storage pool that is nearly full.
/// 4. Otherwise buy the cheapest affordable upgrade.
pub struct AutopilotController;

/// Fill ratio at which a storage pool is worth expanding.
const STORAGE_PRESSURE: f64 = 0.8;

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn make_cmd(state: &GameState, next_id: &mut u64, command: Command) -> CommandEnvelope {
    let id = CommandId(*next_id);
    *next_id += 1;
    CommandEnvelope {
        id,
        issued_ms: state.meta.now_ms,
        command,
    }
}

fn under_pressure(stored: u64, capacity: u64) -> bool {
    capacity == 0 || stored as f64 >= capacity as f64 * STORAGE_PRESSURE
}

/// First build plot that has no factory on it.
fn free_factory_slot(state: &GameState, content: &GameContent) -> Option<u32> {
    (0..content.constants.factory_slots)
        .find(|slot| state.factories.iter().all(|factory| factory.slot != *slot))
}

/// Every purchase currently on offer, with its price, in tie-break order.
fn purchase_options(state: &GameState, content: &GameContent) -> Vec<(u64, Command)> {
    let costs = &state.costs;
    let mut options = Vec::new();

    let fleet_full = state.collectors.len()
        >= usize::try_from(content.constants.collector_max_docks).unwrap_or(usize::MAX);
    if !fleet_full {
        options.push((costs.buy_collector, Command::BuyCollector));
    }
    if let Some(slot) = free_factory_slot(state, content) {
        options.push((costs.factory_build, Command::BuildFactory { slot }));
    }
    options.push((costs.collector_yield, Command::UpgradeCollectorYield));
    options.push((costs.collector_speed, Command::UpgradeCollectorSpeed));

    // Weakest factory first so output evens out.
    let mut factories: Vec<_> = state.factories.iter().collect();
    factories.sort_by_key(|factory| (goods_per_cycle(factory), factory.id));
    for factory in factories {
        options.push((
            factory.yield_upgrade_cost,
            Command::UpgradeFactoryYield {
                factory_id: factory.id,
            },
        ));
        options.push((
            factory.speed_upgrade_cost,
            Command::UpgradeFactorySpeed {
                factory_id: factory.id,
            },
        ));
    }

    if let Some(post) = &state.trade_post {
        options.push((post.price_upgrade_cost, Command::UpgradeTradePrice));
        options.push((post.speed_upgrade_cost, Command::UpgradeTraderSpeed));
    }
    options
}

/// Storage expansion for whichever pool is closest to full, ore first.
fn storage_priority(state: &GameState) -> Option<Command> {
    let ResourceLedger {
        ore_stored,
        ore_capacity,
        goods_stored,
        goods_capacity,
        score,
    } = state.ledger;
    if under_pressure(ore_stored, ore_capacity) && score >= state.costs.ore_storage {
        return Some(Command::UpgradeOreStorage);
    }
    if under_pressure(goods_stored, goods_capacity) && score >= state.costs.goods_storage {
        return Some(Command::UpgradeGoodsStorage);
    }
    None
}

fn choose_command(state: &GameState, content: &GameContent) -> Option<Command> {
    let score = state.ledger.score;

    // Priority 1: the first factory turns ore into goods.
    if state.factories.is_empty() {
        return free_factory_slot(state, content)
            .filter(|_| score >= state.costs.factory_build)
            .map(|slot| Command::BuildFactory { slot });
    }

    // Priority 2: the trade post turns goods into score.
    if state.trade_post.is_none() {
        let slot = content.constants.trade_post_slot;
        let slot_free = state.factories.iter().all(|factory| factory.slot != slot);
        return (slot_free && score >= state.costs.trade_post_build)
            .then_some(Command::BuildTradePost);
    }

    // Priority 3: keep deliveries and production from stalling on full storage.
    if let Some(command) = storage_priority(state) {
        return Some(command);
    }

    // Priority 4: cheapest affordable purchase; earlier options win ties.
    purchase_options(state, content)
        .into_iter()
        .filter(|(cost, _)| *cost <= score)
        .min_by_key(|(cost, _)| *cost)
        .map(|(_, command)| command)
}

impl CommandSource for AutopilotController {
    fn generate_commands(
        &mut self,
        state: &GameState,
        content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope> {
        choose_command(state, content)
            .map(|command| vec![make_cmd(state, next_command_id, command)])
            .unwrap_or_default()
    }
}
