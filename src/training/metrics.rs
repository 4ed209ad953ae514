use std::collections::VecDeque;

/// Result of a single episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeResult {
    /// Richest surviving player at the end.
    pub winner: Option<usize>,
    /// Set when the episode ended by bankruptcy rather than the step cap.
    pub bankrupt_player: Option<usize>,
    pub length: usize,
    /// Undiscounted sum of every step's reward.
    pub total_reward: f64,
    pub decisions: usize,
    pub buys: usize,
}

/// Training metrics tracker with rolling window computations.
pub struct TrainingMetrics {
    episode_results: VecDeque<EpisodeResult>,
    capacity: usize,
    total_episodes: usize, // lifetime count, never capped
    aborted_episodes: usize,
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            episode_results: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
            aborted_episodes: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_episode(&mut self, result: EpisodeResult) {
        self.total_episodes += 1;
        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
    }

    /// Count an episode that was abandoned before producing a trajectory.
    pub fn record_aborted(&mut self) {
        self.aborted_episodes += 1;
    }

    fn window(&self, last_n: usize) -> impl Iterator<Item = &EpisodeResult> {
        let n = self.episode_results.len().min(last_n);
        self.episode_results.iter().rev().take(n)
    }

    fn window_len(&self, last_n: usize) -> usize {
        self.episode_results.len().min(last_n)
    }

    /// Share of the last N episodes won by player 0.
    pub fn win_rate(&self, last_n: usize) -> f32 {
        let n = self.window_len(last_n);
        if n == 0 {
            return 0.0;
        }
        let wins = self.window(last_n).filter(|r| r.winner == Some(0)).count();
        wins as f32 / n as f32
    }

    /// Share of the last N episodes that ended in bankruptcy.
    pub fn bankruptcy_rate(&self, last_n: usize) -> f32 {
        let n = self.window_len(last_n);
        if n == 0 {
            return 0.0;
        }
        let bankrupt = self
            .window(last_n)
            .filter(|r| r.bankrupt_player.is_some())
            .count();
        bankrupt as f32 / n as f32
    }

    /// Average episode length over the last N episodes.
    pub fn average_episode_length(&self, last_n: usize) -> f32 {
        let n = self.window_len(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self.window(last_n).map(|r| r.length).sum();
        total as f32 / n as f32
    }

    /// Average undiscounted episode return over the last N episodes.
    pub fn average_return(&self, last_n: usize) -> f64 {
        let n = self.window_len(last_n);
        if n == 0 {
            return 0.0;
        }
        self.window(last_n).map(|r| r.total_reward).sum::<f64>() / n as f64
    }

    /// Fraction of real decisions answered with Buy in the last N episodes.
    pub fn buy_rate(&self, last_n: usize) -> f32 {
        let (buys, decisions) = self
            .window(last_n)
            .fold((0, 0), |(b, d), r| (b + r.buys, d + r.decisions));
        if decisions == 0 {
            return 0.0;
        }
        buys as f32 / decisions as f32
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn aborted_episodes(&self) -> usize {
        self.aborted_episodes
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-batch timing tracker for profiling the training loop.
pub struct TimingMetrics {
    simulate_micros: VecDeque<u64>, // per-batch simulation µs
    update_micros: VecDeque<u64>,   // per-batch drain µs
    capacity: usize,
    window_start: std::time::Instant,
    window_count: usize,
    window_overhead_micros: u128, // eval/checkpoint time excluded from throughput
}

impl TimingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TimingMetrics {
            simulate_micros: VecDeque::with_capacity(capacity),
            update_micros: VecDeque::with_capacity(capacity),
            capacity,
            window_start: std::time::Instant::now(),
            window_count: 0,
            window_overhead_micros: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Record one batch's simulation phase covering `episodes` episodes.
    pub fn record_simulation(&mut self, d: std::time::Duration, episodes: usize) {
        push_capped(&mut self.simulate_micros, d.as_micros() as u64, self.capacity);
        self.window_count += episodes;
    }

    pub fn record_update_time(&mut self, d: std::time::Duration) {
        push_capped(&mut self.update_micros, d.as_micros() as u64, self.capacity);
    }

    /// Record time spent in eval or checkpoint saving so it is excluded from
    /// the throughput window.
    pub fn record_overhead(&mut self, d: std::time::Duration) {
        self.window_overhead_micros += d.as_micros();
    }

    /// Mean of the last `last_n` batch simulation times in milliseconds.
    pub fn avg_simulation_ms(&self, last_n: usize) -> f32 {
        mean_ms(&self.simulate_micros, last_n)
    }

    /// Mean of the last `last_n` drain times in milliseconds.
    pub fn avg_update_ms(&self, last_n: usize) -> f32 {
        mean_ms(&self.update_micros, last_n)
    }

    /// Episodes per second since the last `reset_window` call, excluding time
    /// spent in eval/checkpoint overhead.
    pub fn episodes_per_sec(&self) -> f32 {
        let total_micros = self.window_start.elapsed().as_micros();
        let net_micros = total_micros.saturating_sub(self.window_overhead_micros);
        if net_micros == 0 {
            return 0.0;
        }
        self.window_count as f32 / (net_micros as f32 / 1_000_000.0)
    }

    /// Reset the throughput window (call after each log interval).
    pub fn reset_window(&mut self) {
        self.window_start = std::time::Instant::now();
        self.window_count = 0;
        self.window_overhead_micros = 0;
    }
}

impl Default for TimingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn push_capped(values: &mut VecDeque<u64>, value: u64, capacity: usize) {
    values.push_back(value);
    if values.len() > capacity {
        values.pop_front();
    }
}

fn mean_ms(values: &VecDeque<u64>, last_n: usize) -> f32 {
    let n = values.len().min(last_n);
    if n == 0 {
        return 0.0;
    }
    let mean = values.iter().rev().take(n).map(|&v| v as f64).sum::<f64>() / n as f64;
    (mean / 1000.0) as f32
}
