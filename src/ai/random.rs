use rand::{Rng, RngCore};

use super::agent::Policy;
use super::state_key::StateKey;
use super::value_store::ValueStore;
use crate::game::{Action, GameState};

/// Baseline opponent: buys or passes with equal probability.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAgent;

impl RandomAgent {
    pub fn new() -> Self {
        RandomAgent
    }
}

impl Policy for RandomAgent {
    fn select_action(
        &self,
        _key: &StateKey,
        _state: &GameState,
        _store: &ValueStore,
        rng: &mut dyn RngCore,
    ) -> Action {
        Action::from_index(rng.random_range(0..Action::ALL.len()))
    }

    fn name(&self) -> &str {
        "Random"
    }
}
