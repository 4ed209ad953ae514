use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::ai::{
    abstract_state, MonteCarloAgent, Policy, RandomAgent, TrajectoryStep, ValueStore,
};
use crate::error::TrainingError;
use crate::game::{decision_available, step, GameConfig, GameState, StepLog};
use crate::training::metrics::EpisodeResult;
use crate::training::trajectory::Trajectory;

/// Per-episode settings shared by every worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeConfig {
    pub game: GameConfig,
    /// Hard cap on steps; the episode is truncated when reached.
    pub max_steps: usize,
    /// Keep a [`StepLog`] for every step.
    pub record_logs: bool,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        EpisodeConfig {
            game: GameConfig::default(),
            max_steps: 500,
            record_logs: false,
        }
    }
}

/// Everything one playout produced.
#[derive(Debug)]
pub struct EpisodeTrace {
    pub index: usize,
    pub trajectory: Trajectory,
    pub logs: Vec<StepLog>,
    pub result: EpisodeResult,
    /// Final position, kept for callers that want to inspect the board.
    pub final_state: GameState,
}

/// Play one game from a fresh state.
///
/// Player `i` is driven by `seats[i % seats.len()]`, so a single seat means
/// self-play. The store is only read; learning happens after the episode.
pub fn play_episode(
    index: usize,
    config: &EpisodeConfig,
    seats: &[&dyn Policy],
    store: &ValueStore,
    rng: &mut dyn RngCore,
) -> Result<EpisodeTrace, TrainingError> {
    assert!(!seats.is_empty(), "at least one policy is required");

    let mut state = GameState::new(config.game)?;
    let mut trajectory = Trajectory::with_capacity(config.max_steps)?;
    let mut logs = Vec::new();
    if config.record_logs {
        logs.reserve(config.max_steps);
    }

    while !state.is_terminal() && state.step_count() < config.max_steps {
        let player = state.current_player();
        let key = abstract_state(&state, player);
        let decision = decision_available(&state, player);
        let action = seats[player % seats.len()].select_action(&key, &state, store, rng);

        let result = step(&mut state, action, &mut *rng);
        trajectory.push(TrajectoryStep {
            key,
            action,
            reward: result.reward,
            player,
            decision,
        });
        if config.record_logs {
            logs.push(result.log);
        }
    }

    let result = EpisodeResult {
        winner: state.leader(),
        bankrupt_player: state.bankrupt_player(),
        length: trajectory.len(),
        total_reward: trajectory.total_reward(),
        decisions: trajectory.decisions(),
        buys: trajectory.buys(),
    };

    Ok(EpisodeTrace {
        index,
        trajectory,
        logs,
        result,
        final_state: state,
    })
}

/// Play `eval_games` games with player 0 following the greedy learned policy
/// and every other seat playing randomly. Returns player 0's win rate.
pub fn evaluate(
    config: &EpisodeConfig,
    store: &ValueStore,
    eval_games: usize,
    base_seed: u64,
) -> Result<f32, TrainingError> {
    if eval_games == 0 {
        return Ok(0.0);
    }
    let greedy = MonteCarloAgent::greedy();
    let random = RandomAgent::new();
    let seats: Vec<&dyn Policy> = (0..config.game.num_players)
        .map(|player| if player == 0 { &greedy as &dyn Policy } else { &random })
        .collect();

    let eval_config = EpisodeConfig {
        record_logs: false,
        ..*config
    };

    let mut wins = 0;
    for game_idx in 0..eval_games {
        // Complemented base seed keeps evaluation streams apart from training.
        let mut rng = StdRng::seed_from_u64(episode_seed(!base_seed, game_idx));
        let trace = play_episode(game_idx, &eval_config, &seats, store, &mut rng)?;
        if trace.result.winner == Some(0) {
            wins += 1;
        }
    }
    Ok(wins as f32 / eval_games as f32)
}

/// Derive a deterministic seed for a given episode index.
pub fn episode_seed(base_seed: u64, episode_index: usize) -> u64 {
    let mut hash = base_seed ^ 0x517cc1b727220a95;
    let index = episode_index as u64;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index >> 32;
    hash
}
