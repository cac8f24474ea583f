use idle_control::AutopilotController;
use idle_core::{CommandEnvelope, EventEnvelope, GameContent, GameState, MetricsSnapshot};
use parking_lot::Mutex;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Oldest samples are dropped past this many.
pub const METRICS_HISTORY_CAP: usize = 3_600;

pub struct SimState {
    pub game_state: GameState,
    pub content: GameContent,
    pub rng: ChaCha8Rng,
    pub autopilot: Option<AutopilotController>,
    pub next_command_id: u64,
    /// Commands posted over HTTP, applied at the start of the next frame.
    pub pending_commands: Vec<CommandEnvelope>,
    pub metrics_every: u64,
    pub metrics_history: VecDeque<MetricsSnapshot>,
}

impl SimState {
    pub fn push_metrics(&mut self, snapshot: MetricsSnapshot) {
        if self.metrics_history.len() >= METRICS_HISTORY_CAP {
            self.metrics_history.pop_front();
        }
        self.metrics_history.push_back(snapshot);
    }

    /// Wraps `command` for the next frame and returns its id.
    pub fn queue_command(&mut self, command: idle_core::Command) -> idle_core::CommandId {
        let id = idle_core::CommandId(self.next_command_id);
        self.next_command_id += 1;
        self.pending_commands.push(CommandEnvelope {
            id,
            issued_ms: self.game_state.meta.now_ms,
            command,
        });
        id
    }
}

pub type SharedSim = Arc<Mutex<SimState>>;
pub type EventTx = broadcast::Sender<Vec<EventEnvelope>>;

#[derive(Clone)]
pub struct AppState {
    pub sim: SharedSim,
    pub event_tx: EventTx,
    pub paused: Arc<AtomicBool>,
    pub frames_per_sec: f64,
}
