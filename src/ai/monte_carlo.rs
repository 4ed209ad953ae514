use std::collections::HashSet;

use rand::{Rng, RngCore};

use super::agent::Policy;
use super::state_key::StateKey;
use super::value_store::ValueStore;
use crate::game::{decision_available, Action, GameState};

/// Action values closer than this are treated as equal.
pub const TIE_TOLERANCE: f64 = 1e-9;

/// Epsilon-greedy policy over a [`ValueStore`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloAgent {
    epsilon: f64,
}

impl MonteCarloAgent {
    pub fn new(epsilon: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&epsilon),
            "epsilon must be in [0, 1], got {epsilon}"
        );
        MonteCarloAgent { epsilon }
    }

    /// Pure exploitation, used for evaluation and demo games.
    pub fn greedy() -> Self {
        MonteCarloAgent { epsilon: 0.0 }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Policy for MonteCarloAgent {
    fn select_action(
        &self,
        key: &StateKey,
        state: &GameState,
        store: &ValueStore,
        rng: &mut dyn RngCore,
    ) -> Action {
        // No exploration on squares where the choice cannot matter.
        if !decision_available(state, state.current_player()) {
            return Action::Pass;
        }
        if rng.random::<f64>() < self.epsilon {
            return Action::from_index(rng.random_range(0..Action::ALL.len()));
        }

        let values = store.lookup(key);
        let pass = values.mean(Action::Pass);
        let buy = values.mean(Action::Buy);
        if (pass - buy).abs() < TIE_TOLERANCE {
            Action::from_index(rng.random_range(0..Action::ALL.len()))
        } else if buy > pass {
            Action::Buy
        } else {
            Action::Pass
        }
    }

    fn name(&self) -> &str {
        "MonteCarlo"
    }
}

/// One step of a playout as the learner sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryStep {
    pub key: StateKey,
    pub action: Action,
    pub reward: f64,
    pub player: usize,
    /// Whether the acting player had a real buy/pass choice.
    pub decision: bool,
}

/// Outcome of folding one trajectory into the store.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateStats {
    /// Pairs that received a return.
    pub recorded: usize,
    /// Repeat occurrences that were skipped.
    pub skipped: usize,
    /// Undiscounted return from the first step.
    pub episode_return: f64,
}

/// Monte Carlo control update for one finished episode.
///
/// Walks the steps backwards accumulating the undiscounted return. Each
/// (key, action) pair is recorded once per episode, at the first time the
/// backward scan reaches it.
pub fn first_visit_update(store: &mut ValueStore, steps: &[TrajectoryStep]) -> UpdateStats {
    let mut stats = UpdateStats::default();
    let mut seen: HashSet<(StateKey, Action)> = HashSet::with_capacity(steps.len());
    let mut g = 0.0;

    for step in steps.iter().rev() {
        g += step.reward;
        if seen.insert((step.key, step.action)) {
            store.record(step.key, step.action, g);
            stats.recorded += 1;
        } else {
            stats.skipped += 1;
        }
    }

    stats.episode_return = g;
    stats
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::game::GameConfig;

    fn key(position: usize) -> StateKey {
        StateKey {
            position,
            money_bin: 15,
            owner: None,
            in_jail: false,
        }
    }

    fn step(position: usize, action: Action, reward: f64) -> TrajectoryStep {
        TrajectoryStep {
            key: key(position),
            action,
            reward,
            player: 0,
            decision: true,
        }
    }

    /// Player 0 standing on an unowned, affordable street.
    fn decision_state() -> GameState {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        state.player_mut(0).position = 1;
        state
    }

    #[test]
    fn test_agent_name() {
        assert_eq!(MonteCarloAgent::new(0.1).name(), "MonteCarlo");
        assert_eq!(MonteCarloAgent::greedy().name(), "MonteCarlo");
    }

    #[test]
    fn test_non_decision_always_passes() {
        let state = GameState::new(GameConfig::default()).unwrap();
        let agent = MonteCarloAgent::new(1.0);
        let store = ValueStore::new();
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..200 {
            let action = agent.select_action(&key(0), &state, &store, &mut rng);
            assert_eq!(action, Action::Pass);
        }
    }

    #[test]
    fn test_greedy_picks_higher_mean() {
        let state = decision_state();
        let mut store = ValueStore::new();
        store.record(key(1), Action::Buy, 5.0);
        store.record(key(1), Action::Pass, 4.0);
        let agent = MonteCarloAgent::greedy();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(agent.select_action(&key(1), &state, &store, &mut rng), Action::Buy);
        }

        store.record(key(1), Action::Pass, 100.0);
        for _ in 0..100 {
            assert_eq!(agent.select_action(&key(1), &state, &store, &mut rng), Action::Pass);
        }
    }

    #[test]
    fn test_ties_break_randomly() {
        let state = decision_state();
        let store = ValueStore::new();
        let agent = MonteCarloAgent::greedy();
        let mut rng = StdRng::seed_from_u64(2);
        let buys = (0..1000)
            .filter(|_| agent.select_action(&key(1), &state, &store, &mut rng) == Action::Buy)
            .count();
        assert!(buys > 400 && buys < 600, "buys = {buys}");
    }

    #[test]
    fn test_full_exploration_is_uniform() {
        let state = decision_state();
        let mut store = ValueStore::new();
        store.record(key(1), Action::Buy, 1000.0);
        let agent = MonteCarloAgent::new(1.0);
        let mut rng = StdRng::seed_from_u64(3);
        let buys = (0..1000)
            .filter(|_| agent.select_action(&key(1), &state, &store, &mut rng) == Action::Buy)
            .count();
        assert!(buys > 400 && buys < 600, "buys = {buys}");
    }

    #[test]
    #[should_panic]
    fn test_epsilon_out_of_range() {
        MonteCarloAgent::new(1.5);
    }

    #[test]
    fn test_backward_returns() {
        let mut store = ValueStore::new();
        let steps = [
            step(1, Action::Buy, -60.0),
            step(5, Action::Pass, 0.0),
            step(9, Action::Buy, 200.0),
        ];
        let stats = first_visit_update(&mut store, &steps);
        assert_eq!(stats.recorded, 3);
        assert_eq!(stats.skipped, 0);
        assert!((stats.episode_return - 140.0).abs() < 1e-12);
        assert!((store.lookup(&key(9)).mean(Action::Buy) - 200.0).abs() < 1e-12);
        assert!((store.lookup(&key(5)).mean(Action::Pass) - 200.0).abs() < 1e-12);
        assert!((store.lookup(&key(1)).mean(Action::Buy) - 140.0).abs() < 1e-12);
    }

    #[test]
    fn test_repeated_pair_recorded_once() {
        let mut store = ValueStore::new();
        let steps = [
            step(1, Action::Pass, 10.0),
            step(2, Action::Pass, 20.0),
            step(1, Action::Pass, 30.0),
        ];
        let stats = first_visit_update(&mut store, &steps);
        assert_eq!(stats.recorded, 2);
        assert_eq!(stats.skipped, 1);
        let record = *store.lookup(&key(1)).get(Action::Pass);
        assert_eq!(record.count, 1);
        // Reached first by the backward scan, with G = 30.
        assert!((record.sum - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_same_key_different_actions_are_distinct() {
        let mut store = ValueStore::new();
        let steps = [step(1, Action::Pass, 1.0), step(1, Action::Buy, 2.0)];
        let stats = first_visit_update(&mut store, &steps);
        assert_eq!(stats.recorded, 2);
        assert_eq!(store.lookup(&key(1)).get(Action::Buy).count, 1);
        assert_eq!(store.lookup(&key(1)).get(Action::Pass).count, 1);
    }

    #[test]
    fn test_mean_across_episodes() {
        let mut store = ValueStore::new();
        for reward in [10.0, 20.0, 60.0] {
            first_visit_update(&mut store, &[step(4, Action::Buy, reward)]);
        }
        let record = *store.lookup(&key(4)).get(Action::Buy);
        assert_eq!(record.count, 3);
        assert!((record.mean() - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_trajectory() {
        let mut store = ValueStore::new();
        let stats = first_visit_update(&mut store, &[]);
        assert_eq!(stats, UpdateStats::default());
        assert!(store.is_empty());
    }
}
