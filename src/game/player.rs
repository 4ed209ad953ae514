use super::board::{BOARD_SIZE, JAIL_SQUARE};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Player {
    pub id: usize,
    pub position: usize,
    /// Signed: may dip below zero until bankruptcy resolution runs.
    pub cash: i64,
    pub in_jail: bool,
    pub jail_turns: u8,
}

impl Player {
    /// Create a player standing on GO with the given cash.
    pub fn new(id: usize, starting_cash: i64) -> Self {
        Player {
            id,
            position: 0,
            cash: starting_cash,
            in_jail: false,
            jail_turns: 0,
        }
    }

    /// Relocate to the jail square and start a fresh jail stay.
    pub fn send_to_jail(&mut self) {
        self.position = JAIL_SQUARE;
        self.in_jail = true;
        self.jail_turns = 0;
    }

    pub fn release_from_jail(&mut self) {
        self.in_jail = false;
        self.jail_turns = 0;
    }

    /// Move to `target`, panicking on an off-board square.
    pub fn move_to(&mut self, target: usize) {
        assert!(target < BOARD_SIZE, "position {target} out of range");
        self.position = target;
    }
}
