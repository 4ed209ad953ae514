use super::board::{square, BOARD_SIZE, MAX_HOUSES, MAX_PLAYERS};
use super::player::Player;
use crate::error::ConfigError;

/// Table rules that vary between runs.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub num_players: usize,
    pub starting_cash: i64,
    pub pass_go_credit: i64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            num_players: 2,
            starting_cash: 1500,
            pass_go_credit: 200,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_players == 0 || self.num_players > MAX_PLAYERS {
            return Err(ConfigError::Validation(format!(
                "game.num_players must be in [1, {MAX_PLAYERS}], got {}",
                self.num_players
            )));
        }
        if self.starting_cash <= 0 {
            return Err(ConfigError::Validation(
                "game.starting_cash must be > 0".into(),
            ));
        }
        if self.pass_go_credit < 0 {
            return Err(ConfigError::Validation(
                "game.pass_go_credit must be >= 0".into(),
            ));
        }
        Ok(())
    }
}

/// Ownership state of one square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct Holding {
    pub owner: Option<usize>,
    pub houses: u8,
}

#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    players: Vec<Player>,
    holdings: [Holding; BOARD_SIZE],
    current_player: usize,
    step_count: usize,
    terminal: bool,
    bankrupt_player: Option<usize>,
}

impl GameState {
    /// Create a fresh game. Rejects invalid configs instead of clamping them.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let players = (0..config.num_players)
            .map(|id| Player::new(id, config.starting_cash))
            .collect();
        Ok(GameState {
            config,
            players,
            holdings: [Holding::default(); BOARD_SIZE],
            current_player: 0,
            step_count: 0,
            terminal: false,
            bankrupt_player: None,
        })
    }

    /// Return to the starting position, keeping the config.
    pub fn reset(&mut self) {
        for player in &mut self.players {
            *player = Player::new(player.id, self.config.starting_cash);
        }
        self.holdings = [Holding::default(); BOARD_SIZE];
        self.current_player = 0;
        self.step_count = 0;
        self.terminal = false;
        self.bankrupt_player = None;
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, index: usize) -> &Player {
        &self.players[index]
    }

    /// Mutable access, used by the engine and for scenario setup.
    pub fn player_mut(&mut self, index: usize) -> &mut Player {
        &mut self.players[index]
    }

    pub fn current_player(&self) -> usize {
        self.current_player
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn bankrupt_player(&self) -> Option<usize> {
        self.bankrupt_player
    }

    pub fn holding(&self, square_index: usize) -> Holding {
        assert!(square_index < BOARD_SIZE, "square index {square_index} out of range");
        self.holdings[square_index]
    }

    pub fn holdings(&self) -> &[Holding; BOARD_SIZE] {
        &self.holdings
    }

    /// Squares owned by `player`, in ascending board order.
    pub fn owned_squares(&self, player: usize) -> impl Iterator<Item = usize> + '_ {
        self.holdings
            .iter()
            .enumerate()
            .filter(move |(_, h)| h.owner == Some(player))
            .map(|(i, _)| i)
    }

    pub fn owned_count(&self, player: usize) -> usize {
        self.owned_squares(player).count()
    }

    /// Set a square's owner and house count directly (scenario setup).
    /// Panics if the result would break the holding invariants.
    pub fn set_holding(&mut self, square_index: usize, owner: Option<usize>, houses: u8) {
        let sq = square(square_index);
        if let Some(p) = owner {
            assert!(p < self.players.len(), "player {p} out of range");
            assert!(sq.kind.is_ownable(), "{} cannot be owned", sq.name);
        }
        assert!(houses <= MAX_HOUSES, "house count {houses} exceeds {MAX_HOUSES}");
        assert!(
            houses == 0 || (owner.is_some() && sq.supports_houses()),
            "{} cannot hold houses",
            sq.name
        );
        self.holdings[square_index] = Holding { owner, houses };
    }

    pub(crate) fn holding_mut(&mut self, square_index: usize) -> &mut Holding {
        &mut self.holdings[square_index]
    }

    /// Hand the turn to the next player.
    pub(crate) fn advance_turn(&mut self) {
        self.current_player = (self.current_player + 1) % self.players.len();
    }

    pub(crate) fn count_step(&mut self) {
        self.step_count += 1;
    }

    /// End the episode with `player` bankrupt, returning all of their
    /// squares to the bank.
    pub(crate) fn declare_bankrupt(&mut self, player: usize) {
        self.terminal = true;
        self.bankrupt_player = Some(player);
        for holding in self.holdings.iter_mut().filter(|h| h.owner == Some(player)) {
            *holding = Holding::default();
        }
    }

    /// The non-bankrupt player with the most cash, lowest index on ties.
    pub fn leader(&self) -> Option<usize> {
        self.players
            .iter()
            .filter(|p| Some(p.id) != self.bankrupt_player)
            .fold(None::<&Player>, |best, p| match best {
                Some(b) if b.cash >= p.cash => Some(b),
                _ => Some(p),
            })
            .map(|p| p.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = GameState::new(GameConfig::default()).unwrap();
        assert_eq!(state.players().len(), 2);
        assert_eq!(state.current_player(), 0);
        assert!(!state.is_terminal());
        assert!(state.players().iter().all(|p| p.cash == 1500 && p.position == 0));
        assert!(state.holdings().iter().all(|h| h.owner.is_none() && h.houses == 0));
    }

    #[test]
    fn test_rejects_invalid_player_count() {
        for n in [0, MAX_PLAYERS + 1] {
            let config = GameConfig {
                num_players: n,
                ..Default::default()
            };
            assert!(GameState::new(config).is_err(), "{n} players should be rejected");
        }
    }

    #[test]
    fn test_rejects_non_positive_cash() {
        let config = GameConfig {
            starting_cash: 0,
            ..Default::default()
        };
        assert!(matches!(
            GameState::new(config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_advance_turn_wraps() {
        let mut state = GameState::new(GameConfig {
            num_players: 3,
            ..Default::default()
        })
        .unwrap();
        state.advance_turn();
        state.advance_turn();
        assert_eq!(state.current_player(), 2);
        state.advance_turn();
        assert_eq!(state.current_player(), 0);
    }

    #[test]
    fn test_owned_squares_ascending() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        state.set_holding(39, Some(1), 0);
        state.set_holding(3, Some(1), 2);
        state.set_holding(5, Some(0), 0);
        let owned: Vec<usize> = state.owned_squares(1).collect();
        assert_eq!(owned, vec![3, 39]);
        assert_eq!(state.owned_count(0), 1);
    }

    #[test]
    #[should_panic]
    fn test_houses_on_unowned_square_rejected() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        state.set_holding(5, None, 1);
    }

    #[test]
    fn test_houses_on_railroad_accepted() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        state.set_holding(5, Some(0), 2);
        assert_eq!(state.holding(5).houses, 2);
    }

    #[test]
    fn test_declare_bankrupt_forfeits() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        state.set_holding(1, Some(0), 3);
        state.set_holding(5, Some(0), 0);
        state.set_holding(6, Some(1), 0);
        state.declare_bankrupt(0);
        assert!(state.is_terminal());
        assert_eq!(state.bankrupt_player(), Some(0));
        assert_eq!(state.owned_count(0), 0);
        assert_eq!(state.holding(1), Holding::default());
        assert_eq!(state.holding(6).owner, Some(1));
    }

    #[test]
    fn test_leader_skips_bankrupt_player() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        state.player_mut(0).cash = 5000;
        state.player_mut(1).cash = 100;
        assert_eq!(state.leader(), Some(0));
        state.declare_bankrupt(0);
        assert_eq!(state.leader(), Some(1));
    }

    #[test]
    fn test_reset_restores_start() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        state.player_mut(1).cash = 3;
        state.set_holding(1, Some(1), 1);
        state.advance_turn();
        state.count_step();
        state.declare_bankrupt(1);
        state.reset();
        assert!(!state.is_terminal());
        assert_eq!(state.step_count(), 0);
        assert_eq!(state.current_player(), 0);
        assert_eq!(state.player(1).cash, 1500);
        assert_eq!(state.bankrupt_player(), None);
    }
}
