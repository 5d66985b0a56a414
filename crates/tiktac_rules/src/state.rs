//! Immutable game snapshot.

use crate::types::{GameMode, Move, OpponentType, Player, Scoreboard, SoundEvent};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::instrument;

/// Smallest playable board edge.
pub const MIN_GRID_SIZE: usize = 3;
/// Largest playable board edge.
pub const MAX_GRID_SIZE: usize = 10;
/// Board edge of the Ultimate variant.
pub const ULTIMATE_GRID_SIZE: usize = 9;

/// Validated board geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    grid_size: usize,
    win_condition: usize,
}

impl BoardConfig {
    /// Checks `3 <= grid_size <= 10` and `3 <= win_condition <= grid_size`.
    #[track_caller]
    pub fn new(grid_size: usize, win_condition: usize) -> Result<Self, ConfigError> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&grid_size) {
            return Err(ConfigError::new(format!(
                "grid size {} outside {}..={}",
                grid_size, MIN_GRID_SIZE, MAX_GRID_SIZE
            )));
        }
        if !(MIN_GRID_SIZE..=grid_size).contains(&win_condition) {
            return Err(ConfigError::new(format!(
                "win condition {} outside {}..={}",
                win_condition, MIN_GRID_SIZE, grid_size
            )));
        }
        Ok(Self {
            grid_size,
            win_condition,
        })
    }

    /// Board edge length.
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Length of a winning run.
    pub fn win_condition(&self) -> usize {
        self.win_condition
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            grid_size: 3,
            win_condition: 3,
        }
    }
}

/// Board configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Complete game snapshot.
///
/// Snapshots are never edited in place by callers; every transition in
/// [`crate::engine`] returns a fresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) board: Vec<Option<Player>>,
    pub(crate) grid_size: usize,
    pub(crate) win_condition: usize,
    pub(crate) mode: GameMode,
    pub(crate) opponent: OpponentType,
    pub(crate) current_player: Player,
    pub(crate) winner: Option<Player>,
    pub(crate) is_draw: bool,
    pub(crate) winning_line: Option<Vec<usize>>,
    pub(crate) blocked_cells: BTreeSet<usize>,
    pub(crate) revealed_cells: BTreeSet<usize>,
    pub(crate) move_history: Vec<Move>,
    pub(crate) active_grid_index: Option<usize>,
    pub(crate) sub_grid_winners: [Option<Player>; 9],
    pub(crate) score: Scoreboard,
    pub(crate) time_left: f32,
    pub(crate) sound_event: Option<SoundEvent>,
    pub(crate) sound_enabled: bool,
    pub(crate) haptics_enabled: bool,
    pub(crate) is_ai_thinking: bool,
}

impl GameState {
    /// Creates an empty 3x3 classic game with the given persisted values.
    ///
    /// Use [`crate::engine::reset`] to lay out variant-specific cells.
    pub fn new(
        score: Scoreboard,
        opponent: OpponentType,
        sound_enabled: bool,
        haptics_enabled: bool,
    ) -> Self {
        let config = BoardConfig::default();
        let cells = config.grid_size * config.grid_size;
        Self {
            board: vec![None; cells],
            grid_size: config.grid_size,
            win_condition: config.win_condition,
            mode: GameMode::Classic,
            opponent,
            current_player: Player::X,
            winner: None,
            is_draw: false,
            winning_line: None,
            blocked_cells: BTreeSet::new(),
            revealed_cells: (0..cells).collect(),
            move_history: Vec::new(),
            active_grid_index: None,
            sub_grid_winners: [None; 9],
            score,
            time_left: 1.0,
            sound_event: None,
            sound_enabled,
            haptics_enabled,
            is_ai_thinking: false,
        }
    }

    /// Cells in row-major order.
    pub fn board(&self) -> &[Option<Player>] {
        &self.board
    }

    /// Piece at `index`, if any.
    pub fn cell(&self, index: usize) -> Option<Player> {
        self.board.get(index).copied().flatten()
    }

    /// Board edge length.
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Length of a winning run.
    pub fn win_condition(&self) -> usize {
        self.win_condition
    }

    /// Active rule variant.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Who plays O.
    pub fn opponent(&self) -> OpponentType {
        self.opponent
    }

    /// Player to move.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Winner, once decided.
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// True once the game ended without a winner.
    pub fn is_draw(&self) -> bool {
        self.is_draw
    }

    /// Cells of the winning run, or sub-grid indices in Ultimate.
    pub fn winning_line(&self) -> Option<&[usize]> {
        self.winning_line.as_deref()
    }

    /// Permanently unplayable cells.
    pub fn blocked_cells(&self) -> &BTreeSet<usize> {
        &self.blocked_cells
    }

    /// Cells revealed through the fog. Every cell outside Fog mode.
    pub fn revealed_cells(&self) -> &BTreeSet<usize> {
        &self.revealed_cells
    }

    /// Placements in order, oldest first.
    pub fn move_history(&self) -> &[Move] {
        &self.move_history
    }

    /// Sub-grid the next Ultimate move must land in. `None` means anywhere.
    pub fn active_grid_index(&self) -> Option<usize> {
        self.active_grid_index
    }

    /// Winner of each Ultimate sub-grid.
    pub fn sub_grid_winners(&self) -> &[Option<Player>; 9] {
        &self.sub_grid_winners
    }

    /// Aggregate results.
    pub fn score(&self) -> Scoreboard {
        self.score
    }

    /// Speed countdown, 1.0 down to 0.0.
    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    /// Pending feedback tag.
    pub fn sound_event(&self) -> Option<SoundEvent> {
        self.sound_event
    }

    /// Sound toggle.
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    /// Haptics toggle.
    pub fn haptics_enabled(&self) -> bool {
        self.haptics_enabled
    }

    /// True while the AI move is pending.
    pub fn is_ai_thinking(&self) -> bool {
        self.is_ai_thinking
    }

    /// True once the game has a winner or is drawn.
    pub fn is_terminal(&self) -> bool {
        self.winner.is_some() || self.is_draw
    }

    /// Number of cells on the board.
    pub fn cell_count(&self) -> usize {
        self.board.len()
    }

    /// True if the cell content is hidden by fog.
    ///
    /// Occupied cells are always visible.
    pub fn is_hidden(&self, index: usize) -> bool {
        self.mode == GameMode::Fog
            && self.cell(index).is_none()
            && !self.revealed_cells.contains(&index)
    }

    /// Fogged cells, derived from the revealed set.
    pub fn fog_cells(&self) -> BTreeSet<usize> {
        (0..self.cell_count())
            .filter(|&i| self.is_hidden(i))
            .collect()
    }

    /// True if every playable cell is occupied.
    pub fn is_full(&self) -> bool {
        self.board
            .iter()
            .enumerate()
            .all(|(i, c)| c.is_some() || self.blocked_cells.contains(&i))
    }

    /// Row and column of a cell.
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.grid_size, index % self.grid_size)
    }

    /// Indices of the 3x3 neighbourhood around `index`, clipped to the board.
    pub fn neighbourhood(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let (row, col) = self.coords(index);
        let n = self.grid_size;
        (row.saturating_sub(1)..=(row + 1).min(n - 1)).flat_map(move |r| {
            (col.saturating_sub(1)..=(col + 1).min(n - 1)).map(move |c| r * n + c)
        })
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Scoreboard::default(), OpponentType::Pvp, true, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_config_bounds() {
        assert!(BoardConfig::new(3, 3).is_ok());
        assert!(BoardConfig::new(10, 5).is_ok());
        assert!(BoardConfig::new(2, 2).is_err());
        assert!(BoardConfig::new(11, 3).is_err());
        let err = BoardConfig::new(4, 5).unwrap_err();
        assert!(err.to_string().contains("win condition 5"));
    }

    #[test]
    fn test_new_state_shape() {
        let state = GameState::default();
        assert_eq!(state.board().len(), 9);
        assert_eq!(state.current_player(), Player::X);
        assert!(!state.is_terminal());
        assert_eq!(state.revealed_cells().len(), 9);
        assert!(state.fog_cells().is_empty());
    }

    #[test]
    fn test_neighbourhood_clips_at_edges() {
        let mut state = GameState::default();
        state.grid_size = 4;
        state.board = vec![None; 16];
        let corner: Vec<_> = state.neighbourhood(0).collect();
        assert_eq!(corner, vec![0, 1, 4, 5]);
        let middle: Vec<_> = state.neighbourhood(5).collect();
        assert_eq!(middle, vec![0, 1, 2, 4, 5, 6, 8, 9, 10]);
        let last: Vec<_> = state.neighbourhood(15).collect();
        assert_eq!(last, vec![10, 11, 14, 15]);
    }

    #[test]
    fn test_full_ignores_blocked_cells() {
        let mut state = GameState::default();
        state.blocked_cells.insert(4);
        for i in (0..9).filter(|&i| i != 4) {
            state.board[i] = Some(Player::X);
        }
        assert!(state.is_full());
    }

    #[test]
    fn test_hidden_only_in_fog() {
        let mut state = GameState::default();
        state.revealed_cells.clear();
        assert!(!state.is_hidden(0));
        state.mode = GameMode::Fog;
        assert!(state.is_hidden(0));
        state.board[0] = Some(Player::O);
        assert!(!state.is_hidden(0));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut state = GameState::default();
        state.board[4] = Some(Player::X);
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
