use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::ai::{MonteCarloAgent, Policy, ValueStore};
use crate::checkpoint::{
    CheckpointHyperparameters, CheckpointManager, CheckpointMetadata, CheckpointMetrics,
};
use crate::error::TrainingError;
use crate::game::GameConfig;
use crate::training::episode::{evaluate, EpisodeConfig};
use crate::training::log_sink::StepLogSink;
use crate::training::metrics::{TimingMetrics, TrainingMetrics};
use crate::training::scheduler::{BatchScheduler, ExecutionMode};

/// Trainer configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_episodes: usize,
    pub max_episode_steps: usize,
    pub mode: ExecutionMode,
    /// Episodes per parallel wave.
    pub batch_size: usize,
    /// Worker threads; 0 lets rayon decide.
    pub num_threads: usize,
    pub seed: u64,
    /// Log a progress line every this many batches.
    pub log_interval: usize,
    /// Save a checkpoint every this many episodes; 0 disables.
    pub checkpoint_interval: usize,
    pub eval_games: usize,
    /// Rolling window for the logged rates.
    pub metrics_window: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_episodes: 20_000,
            max_episode_steps: 500,
            mode: ExecutionMode::Parallel,
            batch_size: 256,
            num_threads: 0,
            seed: 42,
            log_interval: 10,
            checkpoint_interval: 5_000,
            eval_games: 200,
            metrics_window: 1_000,
        }
    }
}

/// What a finished training run reports.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    /// Episodes that contributed to the table.
    pub episodes: usize,
    pub aborted: usize,
    /// Index one past the last episode run; resume from here.
    pub next_episode: usize,
    pub table_size: usize,
    pub eval_win_rate: f32,
    pub bankruptcy_rate: f32,
    pub average_episode_length: f32,
    pub average_return: f64,
    pub buy_rate: f32,
    pub elapsed: Duration,
    pub last_checkpoint: Option<PathBuf>,
}

/// Monte Carlo control trainer: self-play batches, sequential merge.
pub struct Trainer {
    config: TrainerConfig,
    game: GameConfig,
    agent: MonteCarloAgent,
    start_episode: usize,
    checkpoint_manager: Option<CheckpointManager>,
}

impl Trainer {
    pub fn new(config: TrainerConfig, game: GameConfig, agent: MonteCarloAgent) -> Self {
        Trainer {
            config,
            game,
            agent,
            start_episode: 0,
            checkpoint_manager: None,
        }
    }

    /// Save periodic checkpoints through `manager`.
    pub fn with_checkpoints(mut self, manager: CheckpointManager) -> Self {
        self.checkpoint_manager = Some(manager);
        self
    }

    /// Continue episode numbering (and therefore seeds) from `episode`.
    pub fn resume_from(mut self, episode: usize) -> Self {
        self.start_episode = episode;
        self
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    fn episode_config(&self, record_logs: bool) -> EpisodeConfig {
        EpisodeConfig {
            game: self.game,
            max_steps: self.config.max_episode_steps,
            record_logs,
        }
    }

    /// Run the full training loop, folding every episode into `store`.
    pub fn train(
        &self,
        store: &mut ValueStore,
        sink: &mut dyn StepLogSink,
    ) -> Result<TrainingSummary, TrainingError> {
        let started = Instant::now();
        let scheduler = BatchScheduler::new(
            self.config.mode,
            self.config.batch_size,
            self.config.num_threads,
            self.episode_config(sink.wants_logs()),
            self.config.seed,
        )?;
        let mut metrics = TrainingMetrics::with_capacity(self.config.metrics_window.max(1));
        let mut timing = TimingMetrics::new();
        let window = self.config.metrics_window;

        let end_episode = self.start_episode + self.config.num_episodes;
        let mut next_episode = self.start_episode;
        let mut next_checkpoint = self.start_episode + self.config.checkpoint_interval;
        let mut batches = 0usize;
        let mut last_checkpoint = None;

        info!(
            episodes = self.config.num_episodes,
            start = self.start_episode,
            mode = ?scheduler.mode(),
            batch = scheduler.wave_size(),
            threads = scheduler.num_threads(),
            policy = self.agent.name(),
            epsilon = self.agent.epsilon(),
            "starting training"
        );

        while next_episode < end_episode {
            let count = scheduler.wave_size().min(end_episode - next_episode);
            let report = scheduler.run_batch(next_episode, count, &self.agent, store);
            next_episode += count;
            batches += 1;

            timing.record_simulation(report.simulate_time, report.completed());
            timing.record_update_time(report.update_time);
            for result in &report.results {
                metrics.record_episode(*result);
            }
            for _ in 0..report.aborted {
                metrics.record_aborted();
            }

            let sink_start = Instant::now();
            for (episode_id, logs) in &report.logs {
                sink.record_episode(*episode_id, logs)
                    .map_err(TrainingError::LogSink)?;
            }
            timing.record_overhead(sink_start.elapsed());

            if batches % self.config.log_interval.max(1) == 0 || next_episode == end_episode {
                info!(
                    episode = next_episode,
                    of = end_episode,
                    table = store.len(),
                    bankrupt = format_args!("{:.1}%", metrics.bankruptcy_rate(window) * 100.0),
                    win_p0 = format_args!("{:.1}%", metrics.win_rate(window) * 100.0),
                    buy = format_args!("{:.1}%", metrics.buy_rate(window) * 100.0),
                    avg_len = format_args!("{:.1}", metrics.average_episode_length(window)),
                    avg_return = format_args!("{:.1}", metrics.average_return(window)),
                    eps_per_sec = format_args!("{:.0}", timing.episodes_per_sec()),
                    sim_ms = format_args!("{:.2}", timing.avg_simulation_ms(self.config.log_interval)),
                    update_ms = format_args!("{:.2}", timing.avg_update_ms(self.config.log_interval)),
                    "progress"
                );
                timing.reset_window();
            }

            if self.config.checkpoint_interval > 0 && next_episode >= next_checkpoint {
                while next_checkpoint <= next_episode {
                    next_checkpoint += self.config.checkpoint_interval;
                }
                let t0 = Instant::now();
                if let Some(path) = self.save_checkpoint(store, &metrics, next_episode)? {
                    last_checkpoint = Some(path);
                }
                timing.record_overhead(t0.elapsed());
            }
        }

        sink.flush().map_err(TrainingError::LogSink)?;

        let eval_win_rate = self.evaluate(store)?;
        let summary = TrainingSummary {
            episodes: metrics.total_episodes(),
            aborted: metrics.aborted_episodes(),
            next_episode,
            table_size: store.len(),
            eval_win_rate,
            bankruptcy_rate: metrics.bankruptcy_rate(window),
            average_episode_length: metrics.average_episode_length(window),
            average_return: metrics.average_return(window),
            buy_rate: metrics.buy_rate(window),
            elapsed: started.elapsed(),
            last_checkpoint,
        };
        info!(
            episodes = summary.episodes,
            aborted = summary.aborted,
            table = summary.table_size,
            eval_win_rate = format_args!("{:.1}%", eval_win_rate * 100.0),
            elapsed_s = format_args!("{:.1}", summary.elapsed.as_secs_f64()),
            "training complete"
        );
        Ok(summary)
    }

    /// Greedy learned policy as player 0 against random opponents.
    pub fn evaluate(&self, store: &ValueStore) -> Result<f32, TrainingError> {
        evaluate(
            &self.episode_config(false),
            store,
            self.config.eval_games,
            self.config.seed,
        )
    }

    /// Evaluate and save. A failed save is logged and training continues.
    fn save_checkpoint(
        &self,
        store: &ValueStore,
        metrics: &TrainingMetrics,
        episode: usize,
    ) -> Result<Option<PathBuf>, TrainingError> {
        let Some(manager) = &self.checkpoint_manager else {
            return Ok(None);
        };
        let window = self.config.metrics_window;
        let eval_win_rate = self.evaluate(store)?;
        let metadata = CheckpointMetadata::describe(
            store,
            episode,
            CheckpointMetrics {
                eval_win_rate,
                bankruptcy_rate: metrics.bankruptcy_rate(window),
                average_episode_length: metrics.average_episode_length(window),
                average_return: metrics.average_return(window),
                buy_rate: metrics.buy_rate(window),
            },
            CheckpointHyperparameters {
                epsilon: self.agent.epsilon(),
                max_episode_steps: self.config.max_episode_steps,
                mode: self.config.mode,
                batch_size: self.config.batch_size,
                seed: self.config.seed,
            },
            self.game,
        );

        match manager.save_checkpoint(store, &metadata) {
            Ok(path) => {
                info!(
                    path = %path.display(),
                    eval_win_rate = format_args!("{:.1}%", eval_win_rate * 100.0),
                    "checkpoint saved"
                );
                Ok(Some(path))
            }
            Err(e) => {
                warn!(error = %e, episode, "checkpoint failed");
                Ok(None)
            }
        }
    }
}
