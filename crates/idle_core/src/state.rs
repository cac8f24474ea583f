use crate::{
    Constants, CostState, Counters, FleetState, GameContent, GameState, MetaState,
    ResourceLedger, TimerQueue, Viewport,
};

impl CostState {
    pub fn new(constants: &Constants) -> Self {
        Self {
            buy_collector: constants.collector_buy_cost,
            collector_speed: constants.collector_speed_upgrade_cost,
            collector_yield: constants.collector_yield_upgrade_cost,
            ore_storage: constants.ore_storage_upgrade_cost,
            goods_storage: constants.goods_storage_upgrade_cost,
            factory_build: constants.factory_build_cost,
            trade_post_build: constants.trade_post_build_cost,
        }
    }
}

impl GameState {
    /// An empty world: starting ledger and prices, no planets, no ships, and
    /// a viewport that is not laid out yet.
    pub fn new(content: &GameContent, seed: u64) -> Self {
        let constants = &content.constants;
        Self {
            meta: MetaState {
                frame: 0,
                now_ms: 0,
                last_frame_ms: None,
                seed,
                content_version: content.content_version.clone(),
            },
            ledger: ResourceLedger::new(constants),
            costs: CostState::new(constants),
            fleet: FleetState {
                base_speed: constants.collector_base_speed,
                yield_multiplier: 1.0,
            },
            planets: Vec::new(),
            collectors: Vec::new(),
            factories: Vec::new(),
            trade_post: None,
            traders: Vec::new(),
            timers: TimerQueue::default(),
            viewport: Viewport::default(),
            counters: Counters::default(),
        }
    }

    /// Next id for a command issued against this state.
    pub fn next_command_id(&mut self) -> crate::CommandId {
        let id = crate::CommandId(self.counters.next_command_id);
        self.counters.next_command_id += 1;
        id
    }
}
