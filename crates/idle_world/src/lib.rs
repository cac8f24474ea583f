//! Content loading and world setup shared between idle_cli, idle_daemon and idle_bench.

use anyhow::{Context, Result};
use idle_core::collectors::add_collector_ship;
use idle_core::planets::spawn_initial_set;
use idle_core::{Constants, GameContent, GameState, Layout, LevelDef};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct LevelsFile {
    content_version: String,
    levels: Vec<LevelDef>,
}

/// Validates cross-field sanity of loaded content, panicking on any authoring error.
///
/// Catches mistakes like an inverted spawn band, a cost multiplier that would
/// make prices fall, or a trade post slot that collides with a factory slot.
pub fn validate_content(content: &GameContent) {
    validate_ledger(&content.constants);
    validate_world(&content.constants);
    validate_multipliers(&content.constants);
    validate_layout(&content.layout);
    validate_levels(&content.levels);
}

fn validate_ledger(c: &Constants) {
    assert!(c.initial_ore_capacity > 0, "initial_ore_capacity must be positive");
    assert!(c.initial_goods_capacity > 0, "initial_goods_capacity must be positive");
    assert!(
        c.initial_ore_stored <= c.initial_ore_capacity,
        "initial_ore_stored {} exceeds initial_ore_capacity {}",
        c.initial_ore_stored,
        c.initial_ore_capacity,
    );
    assert!(
        c.initial_goods_stored <= c.initial_goods_capacity,
        "initial_goods_stored {} exceeds initial_goods_capacity {}",
        c.initial_goods_stored,
        c.initial_goods_capacity,
    );
}

fn validate_world(c: &Constants) {
    // Spawn band and resource range.
    assert!(
        (0.0..=1.0).contains(&c.planet_spawn_top)
            && (0.0..=1.0).contains(&c.planet_spawn_bottom)
            && c.planet_spawn_top < c.planet_spawn_bottom,
        "planet spawn band [{}, {}] is not an ordered range inside [0, 1]",
        c.planet_spawn_top,
        c.planet_spawn_bottom,
    );
    assert!(
        c.planet_min_resources > 0 && c.planet_min_resources <= c.planet_max_resources,
        "planet resource range [{}, {}] is not an ordered positive range",
        c.planet_min_resources,
        c.planet_max_resources,
    );
    assert!(c.planet_spawn_max_attempts > 0, "planet_spawn_max_attempts must be positive");

    assert!(
        c.game_unit_min_px > 0.0 && c.game_unit_min_px <= c.game_unit_max_px,
        "game unit clamp [{}, {}] is not an ordered positive range",
        c.game_unit_min_px,
        c.game_unit_max_px,
    );
    assert!(c.reference_frame_ms > 0.0, "reference_frame_ms must be positive");

    // Fleet and build plots.
    assert!(c.collector_max_docks > 0, "collector_max_docks must be positive");
    assert!(
        c.collector_initial_count <= c.collector_max_docks,
        "collector_initial_count {} exceeds collector_max_docks {}",
        c.collector_initial_count,
        c.collector_max_docks,
    );
    assert!(c.collector_base_yield > 0, "collector_base_yield must be positive");
    assert!(c.collector_mining_duration_ms > 0, "collector_mining_duration_ms must be positive");
    assert!(c.factory_slots > 0, "factory_slots must be positive");
    assert!(c.factory_base_duration_ms > 0, "factory_base_duration_ms must be positive");
    assert!(
        c.factory_goods_yield <= c.initial_goods_capacity,
        "factory_goods_yield {} can never fit into goods storage {}",
        c.factory_goods_yield,
        c.initial_goods_capacity,
    );
    assert!(
        c.trade_post_slot >= c.factory_slots,
        "trade_post_slot {} collides with factory slots 0..{}",
        c.trade_post_slot,
        c.factory_slots,
    );
    assert!(
        c.trader_despawn_x_percent > c.trader_exit_x_percent,
        "traders must despawn ({}) before reaching their exit point ({})",
        c.trader_despawn_x_percent,
        c.trader_exit_x_percent,
    );
}

/// Prices and capacities only ever go up.
fn validate_multipliers(c: &Constants) {
    for (name, multiplier) in [
        ("ore_storage_cost_multiplier", c.ore_storage_cost_multiplier),
        ("ore_storage_capacity_multiplier", c.ore_storage_capacity_multiplier),
        ("goods_storage_cost_multiplier", c.goods_storage_cost_multiplier),
        ("goods_storage_capacity_multiplier", c.goods_storage_capacity_multiplier),
        ("collector_buy_cost_multiplier", c.collector_buy_cost_multiplier),
        ("collector_speed_cost_multiplier", c.collector_speed_cost_multiplier),
        ("collector_yield_cost_multiplier", c.collector_yield_cost_multiplier),
        ("factory_yield_cost_multiplier", c.factory_yield_cost_multiplier),
        ("factory_speed_cost_multiplier", c.factory_speed_cost_multiplier),
        ("trade_price_cost_multiplier", c.trade_price_cost_multiplier),
        ("trader_speed_cost_multiplier", c.trader_speed_cost_multiplier),
    ] {
        assert!(multiplier >= 1.0, "{name} must be at least 1.0, got {multiplier}");
    }
}

fn validate_levels(levels: &[LevelDef]) {
    for pair in levels.windows(2) {
        assert!(
            pair[0].level < pair[1].level,
            "levels.json entries must be sorted by level ({} before {})",
            pair[0].level,
            pair[1].level,
        );
    }
    for level in levels {
        assert!(
            level.build_slots > 0,
            "level {} has no build slots",
            level.level
        );
    }
}

fn validate_layout(layout: &Layout) {
    let base = &layout.base;
    assert!(
        base.width > 0.0 && base.height > 0.0,
        "layout base must have a positive size"
    );
    assert!(
        base.x >= 0.0 && base.y >= 0.0 && base.x + base.width <= 100.0 && base.y + base.height <= 100.0,
        "layout base must lie inside the play area"
    );
    for zone in &layout.ui_exclusion_zones {
        assert!(
            zone.width > 0.0 && zone.height > 0.0,
            "UI exclusion zone at ({}, {}) has no area",
            zone.x,
            zone.y,
        );
    }
}

fn read_json<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T> {
    let text = std::fs::read_to_string(dir.join(name)).with_context(|| format!("reading {name}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {name}"))
}

pub fn load_content(content_dir: &str) -> Result<GameContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = read_json(dir, "constants.json")?;
    let layout: Layout = read_json(dir, "layout.json")?;
    let levels_file: LevelsFile = read_json(dir, "levels.json")?;
    let content = GameContent {
        content_version: levels_file.content_version,
        constants,
        layout,
        levels: levels_file.levels,
    };
    validate_content(&content);
    Ok(content)
}

/// Build-slot count for `level`, from `levels.json` or `level + 1` when the
/// level has no entry.
pub fn build_slots_for_level(content: &GameContent, level: u32) -> u32 {
    content
        .levels
        .iter()
        .find(|def| def.level == level)
        .map_or(level + 1, |def| def.build_slots)
}

/// Scales content for a campaign level: every base price times `level + 1`,
/// starting score times `level`, and the level's build-slot count.
///
/// The trade post moves to the first slot past the factory plots.
pub fn apply_level(content: &GameContent, level: u32) -> GameContent {
    let mut scaled = content.clone();
    let price = u64::from(level) + 1;
    let c = &mut scaled.constants;
    c.initial_score = c.initial_score.saturating_mul(u64::from(level.max(1)));
    for cost in [
        &mut c.ore_storage_upgrade_cost,
        &mut c.goods_storage_upgrade_cost,
        &mut c.collector_buy_cost,
        &mut c.collector_speed_upgrade_cost,
        &mut c.collector_yield_upgrade_cost,
        &mut c.factory_build_cost,
        &mut c.factory_yield_upgrade_cost,
        &mut c.factory_speed_upgrade_cost,
        &mut c.trade_post_build_cost,
        &mut c.trade_price_upgrade_cost,
        &mut c.trader_speed_upgrade_cost,
    ] {
        *cost = cost.saturating_mul(price);
    }
    c.factory_slots = build_slots_for_level(content, level);
    c.trade_post_slot = c.factory_slots;
    scaled
}

/// A fresh world: starting ledger, the initial planet set, and the initial
/// fleet already heading for its first planet. The viewport is left unset;
/// the first frame should carry a `SetViewport` command.
pub fn build_initial_state(content: &GameContent, seed: u64, rng: &mut impl Rng) -> GameState {
    let mut state = GameState::new(content, seed);
    let mut events = Vec::new();
    spawn_initial_set(&mut state, content, rng, &mut events);
    for _ in 0..content.constants.collector_initial_count {
        if add_collector_ship(&mut state, content, &mut events).is_none() {
            break;
        }
    }
    tracing::debug!(
        seed,
        planets = state.planets.len(),
        collectors = state.collectors.len(),
        "initial world built"
    );
    state
}

/// `YYYYMMDD_HHMMSS_seed<N>` in UTC.
pub fn generate_run_id(seed: u64) -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    format!("{timestamp}_seed{seed}")
}

pub fn create_run_dir(root: &Path, run_id: &str) -> Result<PathBuf> {
    let dir = root.join(run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idle_core::test_fixtures::{base_content, make_rng};

    #[test]
    fn test_valid_content_passes_validation() {
        validate_content(&base_content()); // should not panic
    }

    #[test]
    #[should_panic(expected = "planet spawn band")]
    fn test_inverted_spawn_band_panics() {
        let mut content = base_content();
        content.constants.planet_spawn_top = 0.5;
        content.constants.planet_spawn_bottom = 0.2;
        validate_content(&content);
    }

    #[test]
    #[should_panic(expected = "must be at least 1.0")]
    fn test_shrinking_cost_multiplier_panics() {
        let mut content = base_content();
        content.constants.factory_speed_cost_multiplier = 0.9;
        validate_content(&content);
    }

    #[test]
    #[should_panic(expected = "collides with factory slots")]
    fn test_trade_post_on_factory_slot_panics() {
        let mut content = base_content();
        content.constants.trade_post_slot = 3;
        validate_content(&content);
    }

    #[test]
    #[should_panic(expected = "exceeds collector_max_docks")]
    fn test_initial_fleet_larger_than_docks_panics() {
        let mut content = base_content();
        content.constants.collector_initial_count = 41;
        validate_content(&content);
    }

    #[test]
    fn test_apply_level_scales_prices_and_slots() {
        let content = base_content();
        let level_two = apply_level(&content, 2);
        let c = &level_two.constants;
        assert_eq!(c.initial_score, 2_000);
        assert_eq!(c.collector_buy_cost, 30);
        assert_eq!(c.factory_build_cost, 30);
        assert_eq!(c.trade_post_build_cost, 150);
        assert_eq!(c.factory_slots, 3);
        assert_eq!(c.trade_post_slot, 3);
        validate_content(&level_two);
    }

    #[test]
    fn test_unlisted_level_falls_back_to_level_plus_one_slots() {
        let content = base_content();
        assert_eq!(build_slots_for_level(&content, 1), 2);
        assert_eq!(build_slots_for_level(&content, 6), 7);
    }

    #[test]
    fn test_initial_state_has_planets_and_targeted_fleet() {
        let content = base_content();
        let mut rng = make_rng();
        let state = build_initial_state(&content, 42, &mut rng);
        assert_eq!(state.meta.seed, 42);
        assert_eq!(state.ledger.score, 1_000);
        assert_eq!(state.planets.len(), 3);
        assert_eq!(state.collectors.len(), 1);
        assert_eq!(state.collectors[0].target_planet, Some(state.planets[0].id));
        assert!(!state.viewport.is_ready());
    }

    #[test]
    fn test_run_id_ends_with_seed() {
        let id = generate_run_id(7);
        assert!(id.ends_with("_seed7"));
        assert_eq!(id.len(), "YYYYMMDD_HHMMSS_seed7".len());
    }
}
