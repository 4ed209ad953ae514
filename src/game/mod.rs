//! Monopoly rules: the static board, per-game state, dice, cards, rent,
//! bankruptcy liquidation and the turn engine.

pub mod action;
pub mod bankruptcy;
pub mod board;
pub mod cards;
pub mod dice;
pub mod engine;
pub mod player;
pub mod rent;
pub mod state;

pub use action::Action;
pub use board::{square, Square, SquareKind, BOARD, BOARD_SIZE};
pub use dice::{DiceRoll, DiceSource};
pub use engine::{decision_available, step, CardDraw, StepLog, StepResult, TurnEvent};
pub use player::Player;
pub use state::{GameConfig, GameState, Holding};
