use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::ai::ValueStore;
use crate::game::GameConfig;
use crate::training::ExecutionMode;

/// Metrics snapshot at checkpoint time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetrics {
    /// Greedy policy vs random opponents; used to rank checkpoints.
    pub eval_win_rate: f32,
    pub bankruptcy_rate: f32,
    pub average_episode_length: f32,
    pub average_return: f64,
    pub buy_rate: f32,
}

/// Settings the table was trained under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointHyperparameters {
    pub epsilon: f64,
    pub max_episode_steps: usize,
    pub mode: ExecutionMode,
    pub batch_size: usize,
    pub seed: u64,
}

/// Top-level checkpoint metadata written to metadata.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub episode: usize,
    pub timestamp: u64,
    pub table_size: usize,
    #[serde(default)]
    pub total_visits: u64,
    pub metrics: CheckpointMetrics,
    pub hyperparameters: CheckpointHyperparameters,
    pub game: GameConfig,
}

impl CheckpointMetadata {
    /// Describe `store` as of `episode`, stamped with the current time.
    pub fn describe(
        store: &ValueStore,
        episode: usize,
        metrics: CheckpointMetrics,
        hyperparameters: CheckpointHyperparameters,
        game: GameConfig,
    ) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        CheckpointMetadata {
            episode,
            timestamp,
            table_size: store.len(),
            total_visits: store.total_visits(),
            metrics,
            hyperparameters,
            game,
        }
    }
}
