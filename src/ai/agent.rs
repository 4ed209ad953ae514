use rand::RngCore;

use super::state_key::StateKey;
use super::value_store::ValueStore;
use crate::game::{Action, GameState};

/// Anything that can choose the buy/pass signal for the current player.
///
/// Policies are shared by reference across worker threads, so all
/// randomness comes from the caller's `rng`.
pub trait Policy: Sync {
    /// Choose an action for `state.current_player()`, whose abstracted
    /// state is `key`.
    fn select_action(
        &self,
        key: &StateKey,
        state: &GameState,
        store: &ValueStore,
        rng: &mut dyn RngCore,
    ) -> Action;

    /// Return the policy's display name.
    fn name(&self) -> &str;
}
