//! Type definitions for `idle_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! numeric_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "_{:04}"), self.0)
            }
        }
    };
}

numeric_id!(PlanetId, "planet");
numeric_id!(CollectorId, "collector");
numeric_id!(FactoryId, "factory");
numeric_id!(TraderId, "trader");
numeric_id!(CommandId, "cmd");
numeric_id!(EventId, "evt");

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point in play-area percent coordinates (0..100 on both axes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// Axis-aligned rectangle in play-area percent coordinates. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Pixel dimensions of the play area as reported by the view layer.
///
/// A zero-sized viewport means the view is not laid out yet; frames are
/// skipped until it is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width_px: f32,
    pub height_px: f32,
    /// Size of one game unit in pixels, derived from the smaller dimension.
    pub game_unit_px: f32,
}

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    Normal,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectorState {
    ReturningToSource,
    Mining,
    ReturningToBase,
    Delivering,
    IdleNoPlanets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraderState {
    Approaching,
    Selling,
    Departing,
}

/// Which pool a floating "+N" indicator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountKind {
    Ore,
    Goods,
    Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeKind {
    CollectorSpeed,
    CollectorYield,
    OreStorage,
    GoodsStorage,
    FactoryYield(FactoryId),
    FactorySpeed(FactoryId),
    TradePrice,
    TraderSpeed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    InsufficientScore,
    FleetFull,
    SlotOutOfRange,
    SlotOccupied,
    AlreadyBuilt,
    UnknownFactory,
    NoTradePost,
    InvalidViewport,
}

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub meta: MetaState,
    pub ledger: ResourceLedger,
    pub costs: CostState,
    pub fleet: FleetState,
    pub planets: Vec<Planet>,
    pub collectors: Vec<CollectorShip>,
    pub factories: Vec<Factory>,
    pub trade_post: Option<TradePost>,
    pub traders: Vec<TraderShip>,
    pub timers: TimerQueue,
    pub viewport: Viewport,
    pub counters: Counters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaState {
    /// Number of frames that actually advanced the simulation.
    pub frame: u64,
    /// Clock value of the most recent frame, in milliseconds.
    pub now_ms: u64,
    pub last_frame_ms: Option<u64>,
    pub seed: u64,
    pub content_version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
    pub next_command_id: u64,
    pub next_planet_id: u64,
    pub next_collector_id: u64,
    pub next_factory_id: u64,
    pub next_trader_id: u64,
}

/// Score plus the two capacity-bounded pools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    pub score: u64,
    pub ore_stored: u64,
    pub ore_capacity: u64,
    pub goods_stored: u64,
    pub goods_capacity: u64,
}

/// Current price of every fleet-wide purchase. Each escalates after use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostState {
    pub buy_collector: u64,
    pub collector_speed: u64,
    pub collector_yield: u64,
    pub ore_storage: u64,
    pub goods_storage: u64,
    pub factory_build: u64,
    pub trade_post_build: u64,
}

/// Stats shared by every collector ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetState {
    pub base_speed: f64,
    pub yield_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub id: PlanetId,
    /// Centre of the planet.
    pub position: Vec2,
    pub resources: u64,
    pub size_percent: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorShip {
    pub id: CollectorId,
    pub position: Vec2,
    pub state: CollectorState,
    /// Non-owning reference; re-validated against the registry on every use.
    pub target_planet: Option<PlanetId>,
    pub delivery_amount: u64,
    /// Ore on board, set when a mining run completes. Zero means the ship is
    /// flying home empty.
    #[serde(default)]
    pub cargo: u64,
    pub dock_slot: u32,
    pub mining_started_ms: u64,
    pub mining_progress: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Factory {
    pub id: FactoryId,
    pub slot: u32,
    pub yield_base: u64,
    pub yield_multiplier: f64,
    pub speed_multiplier: f64,
    pub yield_upgrade_cost: u64,
    pub speed_upgrade_cost: u64,
    pub production_active: bool,
    pub production_started_ms: u64,
    /// Fraction of the current cycle completed, for the view's progress bar.
    pub progress: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradePost {
    pub slot: u32,
    pub position: Vec2,
    pub sell_price: u64,
    pub trader_speed: f64,
    pub price_upgrade_cost: u64,
    pub speed_upgrade_cost: u64,
    pub last_spawn_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraderShip {
    pub id: TraderId,
    pub position: Vec2,
    pub state: TraderState,
    /// Snapshot of the goods pool taken when the trader spawned.
    pub goods_carried: u64,
    pub target: Vec2,
    pub speed: f64,
}

// ---------------------------------------------------------------------------
// Timers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    FactoryCycle(FactoryId),
    PlanetRespawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTimer {
    pub due_ms: u64,
    pub kind: TimerKind,
}

/// Deadlines owned by the game state and serviced by the frame loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerQueue {
    pub(crate) entries: Vec<ScheduledTimer>,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub id: CommandId,
    pub issued_ms: u64,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    BuyCollector,
    UpgradeCollectorSpeed,
    UpgradeCollectorYield,
    UpgradeOreStorage,
    UpgradeGoodsStorage,
    BuildFactory { slot: u32 },
    UpgradeFactoryYield { factory_id: FactoryId },
    UpgradeFactorySpeed { factory_id: FactoryId },
    BuildTradePost,
    UpgradeTradePrice,
    UpgradeTraderSpeed,
    SetViewport { width_px: f32, height_px: f32 },
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub frame: u64,
    pub at_ms: u64,
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    PlanetSpawned {
        planet_id: PlanetId,
        position: Vec2,
        resources: u64,
    },
    PlanetDepleted {
        planet_id: PlanetId,
    },
    PlanetRespawnScheduled {
        due_ms: u64,
    },
    CollectorAdded {
        collector_id: CollectorId,
        dock_slot: u32,
        position: Vec2,
    },
    CollectorStateChanged {
        collector_id: CollectorId,
        from: CollectorState,
        to: CollectorState,
    },
    MiningCompleted {
        collector_id: CollectorId,
        planet_id: PlanetId,
        amount: u64,
        planet_remaining: u64,
    },
    OreDelivered {
        collector_id: CollectorId,
        amount: u64,
    },
    DeliveryDeferred {
        collector_id: CollectorId,
        amount: u64,
        ore_free: u64,
    },
    /// Floating "+N" text shown above a point of the play area.
    FloatingAmount {
        kind: AmountKind,
        amount: u64,
        position: Vec2,
    },
    FactoryBuilt {
        factory_id: FactoryId,
        slot: u32,
    },
    ProductionStarted {
        factory_id: FactoryId,
        period_ms: u64,
    },
    ProductionStopped {
        factory_id: FactoryId,
    },
    GoodsProduced {
        factory_id: FactoryId,
        ore_consumed: u64,
        goods: u64,
    },
    TradePostBuilt {
        slot: u32,
    },
    TraderSpawned {
        trader_id: TraderId,
        goods_carried: u64,
    },
    GoodsSold {
        trader_id: TraderId,
        goods: u64,
        score: u64,
    },
    TraderDeparted {
        trader_id: TraderId,
    },
    UpgradePurchased {
        upgrade: UpgradeKind,
        cost: u64,
        next_cost: u64,
    },
    ViewportChanged {
        viewport: Viewport,
    },
    /// Only emitted at `EventLevel::Debug`.
    CommandRejected {
        command_id: CommandId,
        reason: RejectReason,
    },
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameContent {
    pub content_version: String,
    pub constants: Constants,
    pub layout: Layout,
    #[serde(default)]
    pub levels: Vec<LevelDef>,
}

/// Fixed regions of the play area, in percent coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
    /// The home base; collector docks run along its top edge and the build
    /// plots sit inside it.
    pub base: Rect,
    /// Regions covered by UI panels; planets avoid spawning on them.
    #[serde(default)]
    pub ui_exclusion_zones: Vec<Rect>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDef {
    pub level: u32,
    pub build_slots: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    // Ledger
    pub initial_score: u64,
    pub initial_ore_stored: u64,
    pub initial_ore_capacity: u64,
    pub initial_goods_stored: u64,
    pub initial_goods_capacity: u64,
    pub ore_storage_upgrade_cost: u64,
    pub ore_storage_cost_multiplier: f64,
    pub ore_storage_capacity_multiplier: f64,
    pub goods_storage_upgrade_cost: u64,
    pub goods_storage_cost_multiplier: f64,
    pub goods_storage_capacity_multiplier: f64,

    // Viewport scale
    pub game_unit_min_px: f32,
    pub game_unit_max_px: f32,
    /// Frame duration that speeds are expressed against.
    pub reference_frame_ms: f64,

    // Planets
    pub planet_initial_count: u32,
    pub planet_spawn_top: f32,
    pub planet_spawn_bottom: f32,
    pub planet_min_resources: u64,
    pub planet_max_resources: u64,
    pub planet_size_percent: f32,
    pub planet_respawn_delay_ms: u64,
    pub planet_spawn_max_attempts: u32,

    // Collectors
    pub collector_initial_count: u32,
    pub collector_max_docks: u32,
    pub collector_base_speed: f64,
    pub collector_base_yield: u64,
    pub collector_mining_duration_ms: u64,
    pub collector_size_percent: f32,
    pub collector_dock_offset_y_percent: f32,
    pub collector_source_speed_factor: f64,
    pub collector_base_speed_factor: f64,
    /// Extra arrival tolerance, in game units.
    pub collector_arrival_buffer_units: f32,
    pub collector_buy_cost: u64,
    pub collector_buy_cost_multiplier: f64,
    pub collector_speed_upgrade_cost: u64,
    pub collector_speed_cost_multiplier: f64,
    pub collector_speed_increase: f64,
    pub collector_yield_upgrade_cost: u64,
    pub collector_yield_cost_multiplier: f64,
    pub collector_yield_increase: f64,

    // Factories
    pub factory_slots: u32,
    pub factory_build_cost: u64,
    pub factory_ore_consumption: u64,
    pub factory_goods_yield: u64,
    pub factory_base_duration_ms: u64,
    pub factory_yield_upgrade_cost: u64,
    pub factory_yield_cost_multiplier: f64,
    pub factory_yield_increase: f64,
    pub factory_speed_upgrade_cost: u64,
    pub factory_speed_cost_multiplier: f64,
    pub factory_speed_increase: f64,

    // Trade
    pub trade_post_slot: u32,
    pub trade_post_build_cost: u64,
    pub trade_base_price_per_good: u64,
    pub trader_spawn_interval_ms: u64,
    pub trader_base_speed: f64,
    pub trader_size_percent: f32,
    pub trader_entry_x_percent: f32,
    pub trader_exit_x_percent: f32,
    pub trader_despawn_x_percent: f32,
    pub trade_price_upgrade_cost: u64,
    pub trade_price_cost_multiplier: f64,
    pub trade_price_increase: u64,
    pub trader_speed_upgrade_cost: u64,
    pub trader_speed_cost_multiplier: f64,
    pub trader_speed_increase: f64,
}
