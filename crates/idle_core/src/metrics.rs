//! Snapshot metrics computed from `GameState`.
//!
//! A single `compute_metrics(&GameState, &GameContent) -> MetricsSnapshot` function
//! samples the current state for time-series analysis. No state mutation, no IO.

use crate::factories::goods_per_cycle;
use crate::{CollectorState, GameContent, GameState, TraderState};
use serde::Serialize;
use std::io::Write;

/// Current schema version. Bump when fields are added, removed or reordered.
const METRICS_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub frame: u64,
    pub now_ms: u64,
    pub metrics_version: u32,

    // Ledger
    pub score: u64,
    pub ore_stored: u64,
    pub ore_capacity: u64,
    pub ore_storage_used_pct: f32,
    pub goods_stored: u64,
    pub goods_capacity: u64,
    pub goods_storage_used_pct: f32,

    // Planets
    pub planets_active: u32,
    pub planet_resources_total: u64,
    pub planet_respawn_pending: bool,

    // Fleet
    pub fleet_total: u32,
    pub fleet_idle: u32,
    pub fleet_travelling: u32,
    pub fleet_mining: u32,
    pub fleet_delivering: u32,
    pub delivery_amount: u64,
    pub fleet_base_speed: f64,

    // Factories
    pub factories_total: u32,
    pub factories_active: u32,
    pub goods_per_cycle_total: u64,

    // Trade
    pub trade_post_built: bool,
    pub sell_price: u64,
    pub traders_active: u32,
    pub goods_in_transit: u64,
}

#[allow(clippy::cast_possible_truncation)]
fn used_pct(stored: u64, capacity: u64) -> f32 {
    if capacity == 0 {
        return 0.0;
    }
    (stored as f64 / capacity as f64 * 100.0) as f32
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

pub fn compute_metrics(state: &GameState, content: &GameContent) -> MetricsSnapshot {
    let ledger = &state.ledger;

    let mut fleet_idle = 0;
    let mut fleet_travelling = 0;
    let mut fleet_mining = 0;
    let mut fleet_delivering = 0;
    for ship in &state.collectors {
        match ship.state {
            CollectorState::IdleNoPlanets => fleet_idle += 1,
            CollectorState::ReturningToSource | CollectorState::ReturningToBase => {
                fleet_travelling += 1;
            }
            CollectorState::Mining => fleet_mining += 1,
            CollectorState::Delivering => fleet_delivering += 1,
        }
    }

    let goods_in_transit = state
        .traders
        .iter()
        .filter(|trader| trader.state == TraderState::Approaching)
        .map(|trader| trader.goods_carried)
        .sum();

    MetricsSnapshot {
        frame: state.meta.frame,
        now_ms: state.meta.now_ms,
        metrics_version: METRICS_VERSION,
        score: ledger.score,
        ore_stored: ledger.ore_stored,
        ore_capacity: ledger.ore_capacity,
        ore_storage_used_pct: used_pct(ledger.ore_stored, ledger.ore_capacity),
        goods_stored: ledger.goods_stored,
        goods_capacity: ledger.goods_capacity,
        goods_storage_used_pct: used_pct(ledger.goods_stored, ledger.goods_capacity),
        planets_active: count(state.planets.len()),
        planet_resources_total: state.planets.iter().map(|planet| planet.resources).sum(),
        planet_respawn_pending: state.timers.is_scheduled(crate::TimerKind::PlanetRespawn),
        fleet_total: count(state.collectors.len()),
        fleet_idle,
        fleet_travelling,
        fleet_mining,
        fleet_delivering,
        delivery_amount: crate::collectors::delivery_amount(content, state.fleet.yield_multiplier),
        fleet_base_speed: state.fleet.base_speed,
        factories_total: count(state.factories.len()),
        factories_active: count(
            state
                .factories
                .iter()
                .filter(|factory| factory.production_active)
                .count(),
        ),
        goods_per_cycle_total: state.factories.iter().map(goods_per_cycle).sum(),
        trade_post_built: state.trade_post.is_some(),
        sell_price: state.trade_post.as_ref().map_or(0, |post| post.sell_price),
        traders_active: count(state.traders.len()),
        goods_in_transit,
    }
}

pub fn write_metrics_header(writer: &mut impl std::io::Write) -> std::io::Result<()> {
    writeln!(
        writer,
        "frame,now_ms,metrics_version,\
         score,ore_stored,ore_capacity,ore_storage_used_pct,\
         goods_stored,goods_capacity,goods_storage_used_pct,\
         planets_active,planet_resources_total,planet_respawn_pending,\
         fleet_total,fleet_idle,fleet_travelling,fleet_mining,fleet_delivering,\
         delivery_amount,fleet_base_speed,\
         factories_total,factories_active,goods_per_cycle_total,\
         trade_post_built,sell_price,traders_active,goods_in_transit"
    )
}

pub fn append_metrics_row(
    writer: &mut impl std::io::Write,
    snapshot: &MetricsSnapshot,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        snapshot.frame,
        snapshot.now_ms,
        snapshot.metrics_version,
        snapshot.score,
        snapshot.ore_stored,
        snapshot.ore_capacity,
        snapshot.ore_storage_used_pct,
        snapshot.goods_stored,
        snapshot.goods_capacity,
        snapshot.goods_storage_used_pct,
        snapshot.planets_active,
        snapshot.planet_resources_total,
        snapshot.planet_respawn_pending,
        snapshot.fleet_total,
        snapshot.fleet_idle,
        snapshot.fleet_travelling,
        snapshot.fleet_mining,
        snapshot.fleet_delivering,
        snapshot.delivery_amount,
        snapshot.fleet_base_speed,
        snapshot.factories_total,
        snapshot.factories_active,
        snapshot.goods_per_cycle_total,
        snapshot.trade_post_built,
        snapshot.sell_price,
        snapshot.traders_active,
        snapshot.goods_in_transit,
    )
}

/// Maximum data rows per CSV file before rotating to a new file.
const MAX_ROWS_PER_FILE: usize = 50_000;

/// Rotating metrics CSV writer. Splits into numbered files
/// (`metrics_000.csv`, `metrics_001.csv`, ...) after [`MAX_ROWS_PER_FILE`] rows each.
pub struct MetricsFileWriter {
    run_dir: std::path::PathBuf,
    file_index: u32,
    rows_in_current_file: usize,
    writer: std::io::BufWriter<std::fs::File>,
}

impl MetricsFileWriter {
    pub fn new(run_dir: std::path::PathBuf) -> std::io::Result<Self> {
        let writer = open_csv_file(&run_dir, 0)?;
        Ok(Self {
            run_dir,
            file_index: 0,
            rows_in_current_file: 0,
            writer,
        })
    }

    /// Append one snapshot row, rotating to a new file if the current one is full.
    pub fn write_row(&mut self, snapshot: &MetricsSnapshot) -> std::io::Result<()> {
        if self.rows_in_current_file >= MAX_ROWS_PER_FILE {
            self.writer.flush()?;
            self.file_index += 1;
            self.writer = open_csv_file(&self.run_dir, self.file_index)?;
            self.rows_in_current_file = 0;
        }
        append_metrics_row(&mut self.writer, snapshot)?;
        self.rows_in_current_file += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

fn open_csv_file(
    run_dir: &std::path::Path,
    index: u32,
) -> std::io::Result<std::io::BufWriter<std::fs::File>> {
    let path = run_dir.join(format!("metrics_{index:03}.csv"));
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    write_metrics_header(&mut writer)?;
    Ok(writer)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
