use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod overrides;
mod run_result;
mod runner;
mod scenario;
mod summary;

#[derive(Parser)]
#[command(
    name = "idle_bench",
    about = "Multi-seed balance runner for the idle economy"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file across multiple seeds.
    Run {
        /// Path to the scenario JSON file.
        #[arg(long)]
        scenario: String,
        /// Output directory (default: runs/).
        #[arg(long, default_value = "runs")]
        output_dir: String,
    },
}

fn load_scenario_content(scenario: &scenario::Scenario) -> Result<idle_core::GameContent> {
    let mut content = idle_world::load_content(&scenario.content_dir)?;
    if let Some(level) = scenario.level {
        content = idle_world::apply_level(&content, level);
    }
    overrides::apply_overrides(&mut content.constants, &scenario.overrides)?;
    idle_world::validate_content(&content);
    Ok(content)
}

fn write_json_atomic(path: &Path, value: &serde_json::Value) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("serializing {}", path.display()))?;
    let mut file =
        std::fs::File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
    file.write_all(json.as_bytes())
        .with_context(|| format!("writing {}", tmp.display()))?;
    file.sync_all()?;
    std::fs::rename(&tmp, path).with_context(|| format!("renaming {}", tmp.display()))
}

fn run(scenario_path: &str, output_dir: &str) -> Result<()> {
    let scenario = scenario::load_scenario(Path::new(scenario_path))?;
    let seeds = scenario.seeds.expand();
    println!(
        "Loading scenario '{}': {} seeds x {} frames",
        scenario.name,
        seeds.len(),
        scenario.frames
    );

    let content = load_scenario_content(&scenario)?;
    let scenario_params = scenario.params();

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let run_dir = PathBuf::from(output_dir).join(format!("{}_{}", scenario.name, timestamp));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("creating output directory: {}", run_dir.display()))?;
    std::fs::copy(scenario_path, run_dir.join("scenario.json")).context("copying scenario file")?;

    println!("Output: {}", run_dir.display());
    tracing::info!(seeds = seeds.len(), threads = rayon::current_num_threads(), "running seeds");

    let results: Vec<Result<runner::SeedResult>> = seeds
        .par_iter()
        .map(|&seed| {
            let seed_dir = run_dir.join(format!("seed_{seed}"));
            runner::run_seed(&content, seed, &scenario, &scenario_params, &seed_dir)
        })
        .collect();

    let mut seed_results = Vec::new();
    for result in results {
        match result {
            Ok(seed_result) => seed_results.push(seed_result),
            Err(err) => tracing::error!("seed failed: {err:#}"),
        }
    }
    if seed_results.is_empty() {
        anyhow::bail!("all seeds failed");
    }

    let snapshots: Vec<&idle_core::MetricsSnapshot> =
        seed_results.iter().map(|r| &r.final_snapshot).collect();
    let stats = summary::compute_summary(&snapshots);
    summary::print_summary(&scenario.name, scenario.frames, &stats);

    let summary = serde_json::json!({
        "batch_schema_version": 1,
        "batch_id": Uuid::new_v4().to_string(),
        "scenario_name": scenario.name,
        "scenario_params": scenario_params,
        "seeds": seed_results.iter().map(|r| r.seed).collect::<Vec<_>>(),
        "run_ids": seed_results.iter().map(|r| r.run_id.as_str()).collect::<Vec<_>>(),
        "stats": stats,
    });
    let summary_path = run_dir.join("summary.json");
    write_json_atomic(&summary_path, &summary)?;
    println!("Summary written to {}", summary_path.display());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            scenario,
            output_dir,
        } => run(&scenario, &output_dir)?,
    }
    Ok(())
}
