//! # Monopoly MC
//!
//! A simplified Monopoly simulator with a first-visit Monte Carlo agent that
//! learns when to buy, trained by self-play on a data-parallel batch
//! scheduler.
//!
//! ## Modules
//!
//! - [`game`]: board, cards, dice, players and the turn engine
//! - [`ai`]: state abstraction, value table, policies and the Monte Carlo update
//! - [`training`]: episode playout, batch scheduler, trainer, metrics, step logs
//! - [`checkpoint`]: value table persistence and pruning
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: structured error types

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod training;
