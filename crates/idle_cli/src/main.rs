use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use idle_control::{AutopilotController, CommandSource};
use idle_core::{Command, CommandEnvelope, CommandId, Event, EventLevel, GameContent, GameState};
use idle_world::{apply_level, build_initial_state, create_run_dir, generate_run_id, load_content};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "idle_cli", about = "Idle mining economy CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Number of frames to simulate.
    #[arg(long)]
    frames: u64,
    /// Generate the world with this seed. Mutually exclusive with --state.
    #[arg(long, conflicts_with = "state_file")]
    seed: Option<u64>,
    /// Load the initial GameState from a JSON file. Mutually exclusive with --seed.
    #[arg(long = "state", conflicts_with = "seed")]
    state_file: Option<String>,
    #[arg(long, default_value = "./content")]
    content_dir: String,
    /// Simulated milliseconds between frames.
    #[arg(long, default_value_t = 50)]
    frame_ms: u64,
    #[arg(long, default_value_t = 200)]
    print_every: u64,
    #[arg(long, default_value = "normal", value_parser = ["normal", "debug"])]
    event_level: String,
    /// Sample metrics every N frames.
    #[arg(long, default_value_t = 20)]
    metrics_every: u64,
    /// Disable automatic metrics collection to the runs/ directory.
    #[arg(long)]
    no_metrics: bool,
    /// Scale prices and build slots for a campaign level.
    #[arg(long)]
    level: Option<u32>,
    #[arg(long, default_value_t = 1280.0)]
    width_px: f32,
    #[arg(long, default_value_t = 720.0)]
    height_px: f32,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation headless for a fixed number of frames.
    Run(RunArgs),
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn write_run_info(dir: &Path, run_id: &str, state: &GameState, args: &RunArgs) -> Result<()> {
    let info = serde_json::json!({
        "run_id": run_id,
        "seed": state.meta.seed,
        "start_time": run_id.split('_').take(2).collect::<Vec<_>>().join("_"),
        "content_version": state.meta.content_version,
        "metrics_every": args.metrics_every,
        "runner": "idle_cli",
        "args": {
            "frames": args.frames,
            "frame_ms": args.frame_ms,
            "print_every": args.print_every,
            "level": args.level,
        }
    });
    let path = dir.join("run_info.json");
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &info)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn initial_state(content: &GameContent, args: &RunArgs) -> Result<(GameState, ChaCha8Rng)> {
    if let Some(path) = &args.state_file {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading state file: {path}"))?;
        let loaded: GameState =
            serde_json::from_str(&json).with_context(|| format!("parsing state file: {path}"))?;
        let rng = ChaCha8Rng::seed_from_u64(loaded.meta.seed);
        return Ok((loaded, rng));
    }
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let state = build_initial_state(content, seed, &mut rng);
    Ok((state, rng))
}

fn run(args: &RunArgs, event_level: EventLevel) -> Result<()> {
    let mut content = load_content(&args.content_dir)?;
    if let Some(level) = args.level {
        content = apply_level(&content, level);
    }
    let (mut state, mut rng) = initial_state(&content, args)?;

    let mut metrics_writer: Option<idle_core::MetricsFileWriter> = None;
    if !args.no_metrics {
        let run_id = generate_run_id(state.meta.seed);
        let run_dir = create_run_dir(Path::new("runs"), &run_id)?;
        write_run_info(&run_dir, &run_id, &state, args)?;
        let writer = idle_core::MetricsFileWriter::new(run_dir.clone())
            .with_context(|| format!("opening metrics CSV in {}", run_dir.display()))?;
        metrics_writer = Some(writer);
        println!("Run directory: {}", run_dir.display());
    }

    let mut autopilot = AutopilotController;
    let mut next_command_id = state.counters.next_command_id;

    println!(
        "Starting simulation: frames={} seed={} planets={} collectors={} content_version={}",
        args.frames,
        state.meta.seed,
        state.planets.len(),
        state.collectors.len(),
        content.content_version,
    );
    println!("{}", "-".repeat(80));

    let start_ms = state.meta.now_ms;
    for step in 0..args.frames {
        let mut commands = Vec::new();
        if step == 0 {
            commands.push(CommandEnvelope {
                id: CommandId(next_command_id),
                issued_ms: start_ms,
                command: Command::SetViewport {
                    width_px: args.width_px,
                    height_px: args.height_px,
                },
            });
            next_command_id += 1;
        }
        commands.extend(autopilot.generate_commands(&state, &content, &mut next_command_id));

        let now_ms = start_ms + step * args.frame_ms;
        let events = idle_core::frame(&mut state, now_ms, &commands, &content, &mut rng, event_level);

        // Notable events are printed regardless of print_every.
        for event in &events {
            match &event.event {
                Event::FactoryBuilt { slot, .. } => {
                    println!("*** FACTORY BUILT on slot {slot} at frame={:05} ***", state.meta.frame);
                }
                Event::TradePostBuilt { .. } => {
                    println!("*** TRADE POST BUILT at frame={:05} ***", state.meta.frame);
                }
                Event::PlanetDepleted { planet_id } => {
                    println!("*** {planet_id} DEPLETED at frame={:05} ***", state.meta.frame);
                }
                _ => {}
            }
        }

        if args.print_every > 0 && state.meta.frame % args.print_every == 0 {
            print_status(&state);
        }

        if let Some(ref mut writer) = metrics_writer {
            if args.metrics_every > 0 && state.meta.frame % args.metrics_every == 0 {
                let snapshot = idle_core::compute_metrics(&state, &content);
                writer.write_row(&snapshot).context("writing metrics row")?;
            }
        }
    }

    println!("{}", "-".repeat(80));
    println!("Done. Final state at frame {}:", state.meta.frame);
    print_status(&state);

    if let Some(ref mut writer) = metrics_writer {
        writer.flush().context("final metrics flush")?;
        println!("Metrics written to runs/ directory.");
    }

    Ok(())
}

fn print_status(state: &GameState) {
    let seconds = state.meta.now_ms / 1_000;
    let ledger = &state.ledger;
    println!(
        "[frame={frame:05}  t={minutes}:{secs:02}]  score={score:6}  \
         ore={ore}/{ore_cap}  goods={goods}/{goods_cap}  planets={planets}  \
         collectors={collectors:2}  factories={factories}  traders={traders}",
        frame = state.meta.frame,
        minutes = seconds / 60,
        secs = seconds % 60,
        score = ledger.score,
        ore = ledger.ore_stored,
        ore_cap = ledger.ore_capacity,
        goods = ledger.goods_stored,
        goods_cap = ledger.goods_capacity,
        planets = state.planets.len(),
        collectors = state.collectors.len(),
        factories = state.factories.len(),
        traders = state.traders.len(),
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => {
            let level = match args.event_level.as_str() {
                "debug" => EventLevel::Debug,
                _ => EventLevel::Normal,
            };
            run(&args, level)?;
        }
    }
    Ok(())
}
