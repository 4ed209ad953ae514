//! Batch scheduling of independent episode workers.
//!
//! Each worker owns its game state, a private seeded random stream and its
//! trajectory buffer, and reads the shared value table immutably. Once every
//! worker in a batch is done, trajectories are merged into the table one
//! episode at a time in episode-index order.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::ai::{first_visit_update, Policy, ValueStore};
use crate::error::{ConfigError, TrainingError};
use crate::game::StepLog;
use crate::training::episode::{episode_seed, play_episode, EpisodeConfig, EpisodeTrace};
use crate::training::metrics::EpisodeResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One episode at a time, learning after each.
    Sequential,
    /// Waves of `batch_size` episodes on a thread pool.
    #[default]
    Parallel,
}

/// What one worker handed back.
#[derive(Debug)]
pub struct WorkerOutcome {
    pub index: usize,
    pub outcome: Result<EpisodeTrace, TrainingError>,
}

/// Summary of one drained batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<EpisodeResult>,
    /// Step logs per episode id, only when logging was requested.
    pub logs: Vec<(usize, Vec<StepLog>)>,
    pub aborted: usize,
    /// (key, action) returns written to the table.
    pub recorded_updates: usize,
    pub simulate_time: Duration,
    pub update_time: Duration,
}

impl BatchReport {
    /// Episodes that produced a trajectory.
    pub fn completed(&self) -> usize {
        self.results.len()
    }
}

pub struct BatchScheduler {
    mode: ExecutionMode,
    batch_size: usize,
    episode: EpisodeConfig,
    base_seed: u64,
    pool: Option<rayon::ThreadPool>,
}

impl BatchScheduler {
    /// `num_threads == 0` lets rayon pick. Sequential mode ignores both
    /// `batch_size` and `num_threads`.
    pub fn new(
        mode: ExecutionMode,
        batch_size: usize,
        num_threads: usize,
        episode: EpisodeConfig,
        base_seed: u64,
    ) -> Result<Self, TrainingError> {
        if batch_size == 0 {
            return Err(ConfigError::Validation("batch_size must be > 0".into()).into());
        }
        episode.game.validate()?;

        let pool = match mode {
            ExecutionMode::Sequential => None,
            ExecutionMode::Parallel => {
                let mut builder = rayon::ThreadPoolBuilder::new();
                if num_threads > 0 {
                    builder = builder.num_threads(num_threads);
                }
                Some(builder.build()?)
            }
        };

        Ok(BatchScheduler {
            mode,
            batch_size,
            episode,
            base_seed,
            pool,
        })
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Episodes simulated per batch.
    pub fn wave_size(&self) -> usize {
        match self.mode {
            ExecutionMode::Sequential => 1,
            ExecutionMode::Parallel => self.batch_size,
        }
    }

    pub fn num_threads(&self) -> usize {
        self.pool.as_ref().map_or(1, |p| p.current_num_threads())
    }

    pub fn episode_config(&self) -> &EpisodeConfig {
        &self.episode
    }

    /// Simulate episodes `start..start + count` against a frozen table.
    /// Outcomes come back in episode order.
    pub fn simulate(
        &self,
        start: usize,
        count: usize,
        policy: &dyn Policy,
        store: &ValueStore,
    ) -> Vec<WorkerOutcome> {
        let run = |index: usize| run_worker(index, &self.episode, self.base_seed, policy, store);
        match &self.pool {
            Some(pool) => pool.install(|| (start..start + count).into_par_iter().map(run).collect()),
            None => (start..start + count).map(run).collect(),
        }
    }

    /// Run one batch of up to `count` episodes starting at `start` and fold
    /// the results into `store`.
    pub fn run_batch(
        &self,
        start: usize,
        count: usize,
        policy: &dyn Policy,
        store: &mut ValueStore,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        match self.mode {
            ExecutionMode::Sequential => {
                for index in start..start + count {
                    let t0 = Instant::now();
                    let outcome = run_worker(index, &self.episode, self.base_seed, policy, store);
                    report.simulate_time += t0.elapsed();

                    let t1 = Instant::now();
                    drain_one(outcome, store, &mut report);
                    report.update_time += t1.elapsed();
                }
            }
            ExecutionMode::Parallel => {
                let t0 = Instant::now();
                let outcomes = self.simulate(start, count, policy, store);
                report.simulate_time = t0.elapsed();

                let t1 = Instant::now();
                for outcome in outcomes {
                    drain_one(outcome, store, &mut report);
                }
                report.update_time = t1.elapsed();
            }
        }
        report
    }
}

fn run_worker(
    index: usize,
    episode: &EpisodeConfig,
    base_seed: u64,
    policy: &dyn Policy,
    store: &ValueStore,
) -> WorkerOutcome {
    let mut rng = StdRng::seed_from_u64(episode_seed(base_seed, index));
    let seats = [policy];
    WorkerOutcome {
        index,
        outcome: play_episode(index, episode, &seats, store, &mut rng),
    }
}

/// Fold one worker's trajectory into the table. A failed worker only loses
/// its own episode.
fn drain_one(outcome: WorkerOutcome, store: &mut ValueStore, report: &mut BatchReport) {
    match outcome.outcome {
        Ok(trace) => {
            let stats = first_visit_update(store, trace.trajectory.steps());
            report.recorded_updates += stats.recorded;
            report.results.push(trace.result);
            if !trace.logs.is_empty() {
                report.logs.push((trace.index, trace.logs));
            }
        }
        Err(e) => {
            tracing::warn!(episode = outcome.index, error = %e, "episode aborted");
            report.aborted += 1;
        }
    }
}
