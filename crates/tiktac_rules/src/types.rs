//! Core domain types for the tic-tac-toe variants.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use strum::{Display, EnumIter, EnumString};

/// Player in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Player {
    /// Player X (goes first).
    X,
    /// Player O (goes second, and is the AI seat).
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

/// Rule variant in effect for a game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
    EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GameMode {
    /// Standard rules.
    #[default]
    Classic,
    /// Completing a run loses.
    Misere,
    /// Old moves fade away.
    Fading,
    /// Pieces fall to the bottom of their column.
    Gravity,
    /// Random cells are unplayable for the whole game.
    Blocked,
    /// Three seconds per turn.
    Speed,
    /// Cells stay hidden until a move lands nearby.
    Fog,
    /// A move may clear its neighbourhood instead.
    Bomb,
    /// A placed piece may change sides.
    Chaos,
    /// Nine 3x3 boards inside a 9x9 grid.
    Ultimate,
}

impl GameMode {
    /// Display title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Classic => "Classic",
            Self::Misere => "Misere",
            Self::Fading => "Fading",
            Self::Gravity => "Gravity",
            Self::Blocked => "Blocked",
            Self::Speed => "Speed",
            Self::Fog => "Fog",
            Self::Bomb => "Bomb",
            Self::Chaos => "Chaos",
            Self::Ultimate => "Ultimate",
        }
    }

    /// One-line rule summary.
    pub fn description(self) -> &'static str {
        match self {
            Self::Classic => "Standard Tic Tac Toe rules.",
            Self::Misere => "Don't win! If you get N in a row, you LOSE.",
            Self::Fading => "Old moves fade away. Only N moves allowed per player.",
            Self::Gravity => "Pieces fall to the bottom of the column.",
            Self::Blocked => "Random cells are blocked at start.",
            Self::Speed => "3 seconds to move or you skip turn!",
            Self::Fog => "Adjacent cells hidden until you play near them.",
            Self::Bomb => "Special move: Clears 3x3 area instantly.",
            Self::Chaos => "10% chance your piece swaps with opponent.",
            Self::Ultimate => "9x9 Grid. Win 3 subgrids in a row to win!",
        }
    }
}

/// Who plays the O seat.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum OpponentType {
    /// Two local players.
    #[default]
    #[strum(serialize = "pvp")]
    Pvp,
    /// Win/block/random AI.
    #[strum(serialize = "easy")]
    AiEasy,
    /// Win/block/center/corner AI.
    #[strum(serialize = "hard")]
    AiHard,
}

impl OpponentType {
    /// Persisted ordinal.
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Pvp => 0,
            Self::AiEasy => 1,
            Self::AiHard => 2,
        }
    }

    /// Inverse of [`OpponentType::ordinal`]. Unknown ordinals fall back to PvP.
    pub fn from_ordinal(ordinal: u8) -> Self {
        match ordinal {
            1 => Self::AiEasy,
            2 => Self::AiHard,
            _ => Self::Pvp,
        }
    }

    /// Returns true when O is driven by the AI.
    pub fn is_ai(self) -> bool {
        !matches!(self, Self::Pvp)
    }
}

/// One-shot feedback tag for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SoundEvent {
    /// A piece was placed.
    Move,
    /// The game was won.
    Win,
    /// The run-maker lost (misère).
    Lose,
    /// The game ended in a draw.
    Draw,
    /// A bomb went off.
    Bomb,
    /// A turn expired or a move hit the wrong sub-grid.
    Pop,
}

/// A recorded placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Cell index, `row * grid_size + col`.
    pub index: usize,
    /// Owner of the placed piece.
    pub player: Player,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl Move {
    /// Creates a move stamped with the current wall-clock time.
    pub fn new(index: usize, player: Player) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            index,
            player,
            timestamp,
        }
    }
}

/// Aggregate results, monotonic until an explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    /// Games won by X.
    pub x: u32,
    /// Games won by O.
    pub o: u32,
    /// Drawn games.
    pub draws: u32,
}

impl Scoreboard {
    /// Returns the board with one more result counted. `None` is a draw.
    ///
    /// Counters stop at `u32::MAX`.
    pub fn record(self, winner: Option<Player>) -> Self {
        match winner {
            Some(Player::X) => Self {
                x: self.x.saturating_add(1),
                ..self
            },
            Some(Player::O) => Self {
                o: self.o.saturating_add(1),
                ..self
            },
            None => Self {
                draws: self.draws.saturating_add(1),
                ..self
            },
        }
    }
}
