//! Training infrastructure: episode playout, batch scheduling, the trainer
//! loop, metrics collection and step log sinks.

pub mod episode;
pub mod log_sink;
pub mod metrics;
pub mod scheduler;
pub mod trainer;
pub mod trajectory;

pub use episode::{evaluate, play_episode, EpisodeConfig, EpisodeTrace};
pub use log_sink::{JsonlSink, NoopSink, StepLogSink};
pub use metrics::{EpisodeResult, TimingMetrics, TrainingMetrics};
pub use scheduler::{BatchReport, BatchScheduler, ExecutionMode, WorkerOutcome};
pub use trainer::{Trainer, TrainerConfig, TrainingSummary};
pub use trajectory::Trajectory;
