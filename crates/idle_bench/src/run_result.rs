use idle_core::MetricsSnapshot;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct RunResult {
    pub run_schema_version: u32,
    pub run_status: String,
    pub run_id: String,
    pub git_sha: String,
    pub git_dirty: bool,
    pub seed: u64,
    pub scenario_name: String,
    pub scenario_params: serde_json::Value,
    pub frame_end: u64,
    pub total_frames: u64,
    pub sim_ms_end: u64,
    pub wall_time_ms: u64,
    pub frames_per_second: f64,
    pub summary_metrics: Option<SummaryMetrics>,
    pub stalled: bool,
    pub stall_reason: Option<String>,
    pub metrics_path: String,
}

/// Final-frame economy figures kept in `run_result.json`.
#[derive(Debug, Serialize)]
pub struct SummaryMetrics {
    pub score: u64,
    pub ore_stored: u64,
    pub ore_capacity: u64,
    pub goods_stored: u64,
    pub goods_capacity: u64,
    pub planets_active: u32,
    pub fleet_total: u32,
    pub fleet_idle: u32,
    pub delivery_amount: u64,
    pub factories_total: u32,
    pub factories_active: u32,
    pub goods_per_cycle_total: u64,
    pub trade_post_built: bool,
    pub sell_price: u64,
    pub traders_active: u32,
}

impl SummaryMetrics {
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Self {
        Self {
            score: snapshot.score,
            ore_stored: snapshot.ore_stored,
            ore_capacity: snapshot.ore_capacity,
            goods_stored: snapshot.goods_stored,
            goods_capacity: snapshot.goods_capacity,
            planets_active: snapshot.planets_active,
            fleet_total: snapshot.fleet_total,
            fleet_idle: snapshot.fleet_idle,
            delivery_amount: snapshot.delivery_amount,
            factories_total: snapshot.factories_total,
            factories_active: snapshot.factories_active,
            goods_per_cycle_total: snapshot.goods_per_cycle_total,
            trade_post_built: snapshot.trade_post_built,
            sell_price: snapshot.sell_price,
            traders_active: snapshot.traders_active,
        }
    }
}

impl RunResult {
    /// Write JSON atomically: write to `.tmp` then rename.
    pub fn write_atomic(&self, path: &Path) -> anyhow::Result<()> {
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

/// An economy is stalled when score can no longer grow: nothing sells goods,
/// or the fleet has nothing left to mine and no refill is coming.
pub fn detect_stall(snapshot: &MetricsSnapshot) -> Option<String> {
    if !snapshot.trade_post_built {
        return Some("no trade post".to_string());
    }
    if snapshot.fleet_total == 0 {
        return Some("no collectors".to_string());
    }
    if snapshot.planets_active == 0 && !snapshot.planet_respawn_pending {
        return Some("planets exhausted".to_string());
    }
    None
}

pub fn git_sha() -> String {
    env!("GIT_SHA").to_string()
}

pub fn git_dirty() -> bool {
    env!("GIT_DIRTY") == "true"
}

#[cfg(test)]
mod tests {
    use super::*;
    use idle_core::test_fixtures::{base_content, base_state};

    fn trading_snapshot() -> MetricsSnapshot {
        let content = base_content();
        let state = base_state(&content);
        let mut snapshot = idle_core::compute_metrics(&state, &content);
        snapshot.trade_post_built = true;
        snapshot.fleet_total = 2;
        snapshot.planets_active = 3;
        snapshot
    }

    fn sample_result(summary_metrics: Option<SummaryMetrics>) -> RunResult {
        RunResult {
            run_schema_version: 1,
            run_status: "completed".to_string(),
            run_id: "test-uuid".to_string(),
            git_sha: "abc123".to_string(),
            git_dirty: false,
            seed: 42,
            scenario_name: "test".to_string(),
            scenario_params: serde_json::json!({"frames": 100}),
            frame_end: 100,
            total_frames: 100,
            sim_ms_end: 4_950,
            wall_time_ms: 50,
            frames_per_second: 2000.0,
            summary_metrics,
            stalled: false,
            stall_reason: None,
            metrics_path: "metrics_000.csv".to_string(),
        }
    }

    #[test]
    fn test_summary_metrics_from_snapshot() {
        let metrics = SummaryMetrics::from_snapshot(&trading_snapshot());
        assert_eq!(metrics.score, 1_000);
        assert_eq!(metrics.ore_capacity, 100);
        assert_eq!(metrics.fleet_total, 2);
        assert!(metrics.trade_post_built);
    }

    #[test]
    fn test_serialized_result_has_contract_fields() {
        let result = sample_result(Some(SummaryMetrics::from_snapshot(&trading_snapshot())));
        let parsed: serde_json::Value =
            serde_json::from_str(&serde_json::to_string_pretty(&result).unwrap()).unwrap();
        assert_eq!(parsed["run_schema_version"], 1);
        assert_eq!(parsed["run_status"], "completed");
        assert_eq!(parsed["seed"], 42);
        assert_eq!(parsed["summary_metrics"]["score"], 1_000);
        assert!(parsed["stall_reason"].is_null());
    }

    #[test]
    fn test_atomic_write() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("run_result.json");
        sample_result(None).write_atomic(&path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["frame_end"], 100);
    }

    #[test]
    fn test_trading_economy_is_not_stalled() {
        assert!(detect_stall(&trading_snapshot()).is_none());
    }

    #[test]
    fn test_missing_trade_post_is_a_stall() {
        let mut snapshot = trading_snapshot();
        snapshot.trade_post_built = false;
        assert_eq!(detect_stall(&snapshot).as_deref(), Some("no trade post"));
    }

    #[test]
    fn test_empty_sky_is_a_stall_only_without_respawn() {
        let mut snapshot = trading_snapshot();
        snapshot.planets_active = 0;
        snapshot.planet_respawn_pending = true;
        assert!(detect_stall(&snapshot).is_none());
        snapshot.planet_respawn_pending = false;
        assert_eq!(detect_stall(&snapshot).as_deref(), Some("planets exhausted"));
    }

    #[test]
    fn test_git_sha_not_empty() {
        assert!(!git_sha().is_empty());
    }
}
