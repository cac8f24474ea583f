use crate::run_result::{self, RunResult, SummaryMetrics};
use crate::scenario::Scenario;
use anyhow::{Context, Result};
use idle_control::{AutopilotController, CommandSource};
use idle_core::{Command, CommandEnvelope, CommandId, EventLevel, GameContent, MetricsSnapshot};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

pub struct SeedResult {
    pub seed: u64,
    pub final_snapshot: MetricsSnapshot,
    pub run_id: String,
}

fn write_run_info(seed_dir: &Path, seed: u64, content: &GameContent, scenario: &Scenario) -> Result<()> {
    let info = serde_json::json!({
        "run_id": format!("seed_{seed}"),
        "seed": seed,
        "content_version": content.content_version,
        "metrics_every": scenario.metrics_every,
        "runner": "idle_bench",
        "args": {
            "frames": scenario.frames,
            "frame_ms": scenario.frame_ms,
        }
    });
    let path = seed_dir.join("run_info.json");
    let file = std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &info).with_context(|| format!("writing {}", path.display()))
}

/// Plays one seed headless under the autopilot and writes its run directory:
/// `run_info.json`, metrics CSV and `run_result.json`.
pub fn run_seed(
    content: &GameContent,
    seed: u64,
    scenario: &Scenario,
    scenario_params: &serde_json::Value,
    seed_dir: &Path,
) -> Result<SeedResult> {
    let run_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut state = idle_world::build_initial_state(content, seed, &mut rng);
    let mut autopilot = AutopilotController;
    let mut next_command_id = state.counters.next_command_id;

    std::fs::create_dir_all(seed_dir)
        .with_context(|| format!("creating seed directory: {}", seed_dir.display()))?;
    write_run_info(seed_dir, seed, content, scenario)?;

    let mut metrics_writer = idle_core::MetricsFileWriter::new(seed_dir.to_path_buf())
        .with_context(|| format!("opening metrics CSV in {}", seed_dir.display()))?;

    for step in 0..scenario.frames {
        let mut commands = Vec::new();
        if step == 0 {
            commands.push(CommandEnvelope {
                id: CommandId(next_command_id),
                issued_ms: 0,
                command: Command::SetViewport {
                    width_px: scenario.viewport.width_px,
                    height_px: scenario.viewport.height_px,
                },
            });
            next_command_id += 1;
        }
        commands.extend(autopilot.generate_commands(&state, content, &mut next_command_id));
        idle_core::frame(
            &mut state,
            step * scenario.frame_ms,
            &commands,
            content,
            &mut rng,
            EventLevel::Normal,
        );

        if state.meta.frame % scenario.metrics_every == 0 {
            let snapshot = idle_core::compute_metrics(&state, content);
            metrics_writer.write_row(&snapshot).context("writing metrics row")?;
        }
    }

    // Always capture final snapshot
    let final_snapshot = idle_core::compute_metrics(&state, content);
    if state.meta.frame % scenario.metrics_every != 0 {
        metrics_writer
            .write_row(&final_snapshot)
            .context("writing final metrics row")?;
    }
    metrics_writer.flush().context("flushing metrics")?;

    let wall_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let frames_per_second = if wall_time_ms > 0 {
        scenario.frames as f64 / (wall_time_ms as f64 / 1000.0)
    } else {
        0.0
    };

    let stall_reason = run_result::detect_stall(&final_snapshot);
    if let Some(reason) = &stall_reason {
        tracing::warn!(seed, frame = final_snapshot.frame, %reason, "economy stalled");
    }

    let run_result = RunResult {
        run_schema_version: 1,
        run_status: "completed".to_string(),
        run_id: run_id.clone(),
        git_sha: run_result::git_sha(),
        git_dirty: run_result::git_dirty(),
        seed,
        scenario_name: scenario.name.clone(),
        scenario_params: scenario_params.clone(),
        frame_end: final_snapshot.frame,
        total_frames: scenario.frames,
        sim_ms_end: final_snapshot.now_ms,
        wall_time_ms,
        frames_per_second,
        summary_metrics: Some(SummaryMetrics::from_snapshot(&final_snapshot)),
        stalled: stall_reason.is_some(),
        stall_reason,
        metrics_path: "metrics_000.csv".to_string(),
    };
    run_result
        .write_atomic(&seed_dir.join("run_result.json"))
        .context("writing run_result.json")?;

    tracing::info!(seed, wall_time_ms, score = final_snapshot.score, "seed finished");
    Ok(SeedResult {
        seed,
        final_snapshot,
        run_id,
    })
}
