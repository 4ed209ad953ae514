use crate::game::GameState;

/// Width of one cash bucket in the abstracted state.
pub const MONEY_BIN_WIDTH: i64 = 100;

/// Coarse summary of the game from one player's point of view.
///
/// Ordering is only used to give persisted tables a stable layout.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct StateKey {
    pub position: usize,
    /// `floor(cash / 100)`; negative cash lands in negative bins.
    pub money_bin: i64,
    /// Owner of the square the player stands on.
    pub owner: Option<usize>,
    pub in_jail: bool,
}

/// Abstract the state as seen by `player` before they take their turn.
pub fn abstract_state(state: &GameState, player: usize) -> StateKey {
    let p = state.player(player);
    StateKey {
        position: p.position,
        money_bin: p.cash.div_euclid(MONEY_BIN_WIDTH),
        owner: state.holding(p.position).owner,
        in_jail: p.in_jail,
    }
}
