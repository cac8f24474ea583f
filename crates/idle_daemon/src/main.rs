mod routes;
mod state;
mod frame_loop;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use idle_control::AutopilotController;
use idle_core::Command;
use idle_world::{apply_level, build_initial_state, load_content};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use state::{AppState, SimState};
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "idle_daemon", about = "Real-time idle economy server")]
struct Cli {
    /// World seed; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "./content")]
    content_dir: String,
    #[arg(long, default_value_t = 3001)]
    port: u16,
    /// Simulation frames per second of wall time.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,
    /// Stop advancing after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,
    /// Scale prices and build slots for a campaign level.
    #[arg(long)]
    level: Option<u32>,
    /// Let the autopilot play alongside posted commands.
    #[arg(long)]
    autopilot: bool,
    /// Sample metrics every N frames.
    #[arg(long, default_value_t = 30)]
    metrics_every: u64,
    #[arg(long, default_value_t = 1280.0)]
    width_px: f32,
    #[arg(long, default_value_t = 720.0)]
    height_px: f32,
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    anyhow::ensure!(cli.fps > 0.0, "--fps must be positive, got {}", cli.fps);
    let cors_origin: HeaderValue = cli
        .cors_origin
        .parse()
        .with_context(|| format!("invalid --cors-origin: {}", cli.cors_origin))?;

    let mut content = load_content(&cli.content_dir)?;
    if let Some(level) = cli.level {
        content = apply_level(&content, level);
    }
    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let game_state = build_initial_state(&content, seed, &mut rng);

    let mut sim = SimState {
        game_state,
        content,
        rng,
        autopilot: cli.autopilot.then_some(AutopilotController),
        next_command_id: 0,
        pending_commands: Vec::new(),
        metrics_every: cli.metrics_every,
        metrics_history: VecDeque::new(),
    };
    sim.queue_command(Command::SetViewport {
        width_px: cli.width_px,
        height_px: cli.height_px,
    });

    let (event_tx, _) = broadcast::channel(256);
    let app_state = AppState {
        sim: Arc::new(Mutex::new(sim)),
        event_tx,
        paused: Arc::new(AtomicBool::new(false)),
        frames_per_sec: cli.fps,
    };

    tokio::spawn(frame_loop::run_frame_loop(app_state.clone(), cli.max_frames));

    let router = routes::make_router_with_cors(app_state, cors_origin);
    let addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, seed, fps = cli.fps, autopilot = cli.autopilot, "idle_daemon listening");
    axum::serve(listener, router).await.context("serving HTTP")?;
    Ok(())
}
