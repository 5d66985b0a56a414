//! Tiktac rules - pure tic-tac-toe engine with ten rule variants
//!
//! Every transition takes a [`GameState`] snapshot and returns a new one.
//! Nothing here sleeps, spawns or does I/O; timers and the AI delay live in
//! the controller on top of this crate.
//!
//! # Architecture
//!
//! - **State**: immutable snapshots and validated board geometry
//! - **Rules**: win detection over arbitrary sizes and run lengths
//! - **Variants**: gravity, fading, fog, blocked, bomb and chaos effects
//! - **Ultimate**: the 9x9 grid-of-grids variant
//! - **Engine**: move validation and turn resolution
//! - **AI**: easy, hard and Ultimate-aware move selection
//!
//! # Example
//!
//! ```
//! use tiktac_rules::{engine, GameState, MoveSource, Player, ScriptedDice};
//!
//! let mut dice = ScriptedDice::new();
//! let mut state = GameState::default();
//! for index in [0, 3, 1, 4, 2] {
//!     state = engine::apply_move(&state, index, MoveSource::Human, &mut dice).unwrap();
//! }
//! assert_eq!(state.winner(), Some(Player::X));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod dice;
mod error;
mod rules;
mod state;
mod types;

pub mod ai;
pub mod engine;
pub mod ultimate;
pub mod variants;

// Crate-level exports - Randomness
pub use dice::{Dice, RngDice, ScriptedDice};

// Crate-level exports - Errors
pub use error::MoveError;
pub use state::ConfigError;

// Crate-level exports - Win detection
pub use rules::{SUB_GRID_SIZE, check_sub_win, check_winner, is_sub_grid_full};

// Crate-level exports - Snapshot
pub use state::{BoardConfig, GameState, MAX_GRID_SIZE, MIN_GRID_SIZE, ULTIMATE_GRID_SIZE};

// Crate-level exports - Domain types
pub use engine::MoveSource;
pub use types::{GameMode, Move, OpponentType, Player, Scoreboard, SoundEvent};
