//! Shared test fixtures for idle_core and downstream crates.
//!
//! `base_content()` mirrors the shipped tuning with a fixed layout.
//! `base_state()` is an empty world with a laid-out 1000x800 viewport.

use crate::{Constants, GameContent, GameState, Layout, LevelDef, Rect, Viewport};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub fn base_constants() -> Constants {
    Constants {
        initial_score: 1_000,
        initial_ore_stored: 0,
        initial_ore_capacity: 100,
        initial_goods_stored: 0,
        initial_goods_capacity: 50,
        ore_storage_upgrade_cost: 50,
        ore_storage_cost_multiplier: 2.0,
        ore_storage_capacity_multiplier: 1.5,
        goods_storage_upgrade_cost: 75,
        goods_storage_cost_multiplier: 2.0,
        goods_storage_capacity_multiplier: 1.5,
        game_unit_min_px: 0.5,
        game_unit_max_px: 5.0,
        reference_frame_ms: 16.66,
        planet_initial_count: 3,
        planet_spawn_top: 0.05,
        planet_spawn_bottom: 0.40,
        planet_min_resources: 100,
        planet_max_resources: 5_000_000,
        planet_size_percent: 8.0,
        planet_respawn_delay_ms: 3_000,
        planet_spawn_max_attempts: 50,
        collector_initial_count: 1,
        collector_max_docks: 40,
        collector_base_speed: 0.5,
        collector_base_yield: 1,
        collector_mining_duration_ms: 5_000,
        collector_size_percent: 1.5,
        collector_dock_offset_y_percent: 1.0,
        collector_source_speed_factor: 1.2,
        collector_base_speed_factor: 1.5,
        collector_arrival_buffer_units: 2.0,
        collector_buy_cost: 10,
        collector_buy_cost_multiplier: 1.5,
        collector_speed_upgrade_cost: 20,
        collector_speed_cost_multiplier: 1.8,
        collector_speed_increase: 0.1,
        collector_yield_upgrade_cost: 10,
        collector_yield_cost_multiplier: 1.6,
        collector_yield_increase: 0.5,
        factory_slots: 7,
        factory_build_cost: 10,
        factory_ore_consumption: 5,
        factory_goods_yield: 5,
        factory_base_duration_ms: 5_000,
        factory_yield_upgrade_cost: 10,
        factory_yield_cost_multiplier: 1.8,
        factory_yield_increase: 1.0,
        factory_speed_upgrade_cost: 20,
        factory_speed_cost_multiplier: 2.0,
        factory_speed_increase: 0.1,
        trade_post_slot: 7,
        trade_post_build_cost: 50,
        trade_base_price_per_good: 10,
        trader_spawn_interval_ms: 10_000,
        trader_base_speed: 0.8,
        trader_size_percent: 2.0,
        trader_entry_x_percent: 110.0,
        trader_exit_x_percent: -10.0,
        trader_despawn_x_percent: -5.0,
        trade_price_upgrade_cost: 20,
        trade_price_cost_multiplier: 1.8,
        trade_price_increase: 1,
        trader_speed_upgrade_cost: 30,
        trader_speed_cost_multiplier: 1.5,
        trader_speed_increase: 0.2,
    }
}

pub fn base_layout() -> Layout {
    Layout {
        base: Rect {
            x: 5.0,
            y: 80.0,
            width: 90.0,
            height: 15.0,
        },
        ui_exclusion_zones: vec![Rect {
            x: 0.0,
            y: 0.0,
            width: 30.0,
            height: 8.0,
        }],
    }
}

pub fn base_content() -> GameContent {
    GameContent {
        content_version: "test".to_string(),
        constants: base_constants(),
        layout: base_layout(),
        levels: vec![
            LevelDef {
                level: 1,
                build_slots: 2,
            },
            LevelDef {
                level: 2,
                build_slots: 3,
            },
        ],
    }
}

/// Empty world (no planets, no ships) with a ready viewport.
pub fn base_state(content: &GameContent) -> GameState {
    let mut state = GameState::new(content, 42);
    state.viewport = Viewport::new(1_000.0, 800.0, &content.constants);
    state
}

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
