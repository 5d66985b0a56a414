//! Ultimate variant: nine 3x3 sub-grids on a 9x9 board.
//!
//! Each move constrains where the opponent plays next: the position of the
//! move inside its sub-grid names the sub-grid the next move must land in,
//! unless that sub-grid is already won or full.

use crate::error::MoveError;
use crate::rules::{SUB_GRID_SIZE, check_sub_win, check_winner, is_sub_grid_full};
use crate::state::{GameState, ULTIMATE_GRID_SIZE};
use crate::types::{Move, Player, SoundEvent};
use tracing::{debug, info, instrument};

/// Sub-grid (0..9) containing cell `index` of the 9x9 board.
pub fn sub_grid_of(index: usize) -> usize {
    let (row, col) = (index / ULTIMATE_GRID_SIZE, index % ULTIMATE_GRID_SIZE);
    (row / SUB_GRID_SIZE) * SUB_GRID_SIZE + col / SUB_GRID_SIZE
}

/// Position (0..9) of cell `index` inside its own sub-grid.
pub fn position_in_sub_grid(index: usize) -> usize {
    let (row, col) = (index / ULTIMATE_GRID_SIZE, index % ULTIMATE_GRID_SIZE);
    (row % SUB_GRID_SIZE) * SUB_GRID_SIZE + col % SUB_GRID_SIZE
}

/// Board cells of sub-grid `sub`, row-major.
pub fn sub_grid_cells(sub: usize) -> impl Iterator<Item = usize> {
    let (sub_row, sub_col) = (sub / SUB_GRID_SIZE, sub % SUB_GRID_SIZE);
    (0..SUB_GRID_SIZE).flat_map(move |r| {
        (0..SUB_GRID_SIZE).map(move |c| {
            (sub_row * SUB_GRID_SIZE + r) * ULTIMATE_GRID_SIZE + sub_col * SUB_GRID_SIZE + c
        })
    })
}

/// True if sub-grid `sub` can still receive a constrained move.
pub fn is_sub_grid_open(state: &GameState, sub: usize) -> bool {
    state.sub_grid_winners[sub].is_none()
        && !is_sub_grid_full(&state.board, sub / SUB_GRID_SIZE, sub % SUB_GRID_SIZE)
}

/// Would placing `player` at `index` win that cell's sub-grid?
pub fn wins_sub_grid(board: &[Option<Player>], index: usize, player: Player) -> bool {
    let mut hypothetical = board.to_vec();
    hypothetical[index] = Some(player);
    let sub = sub_grid_of(index);
    check_sub_win(&hypothetical, sub / SUB_GRID_SIZE, sub % SUB_GRID_SIZE, player)
}

/// Applies an Ultimate move and resolves sub-grid, meta and draw outcomes.
///
/// The caller has already checked bounds and occupancy of `index`.
#[instrument(skip(state), fields(player = %state.current_player, active = ?state.active_grid_index))]
pub fn place(state: &GameState, index: usize) -> Result<GameState, MoveError> {
    let sub = sub_grid_of(index);
    if let Some(expected) = state.active_grid_index
        && expected != sub
    {
        return Err(MoveError::WrongSubGrid { expected });
    }

    let mover = state.current_player;
    let mut next = state.clone();
    next.board[index] = Some(mover);
    next.move_history.push(Move::new(index, mover));
    next.sound_event = Some(SoundEvent::Move);
    next.is_ai_thinking = false;

    if next.sub_grid_winners[sub].is_none()
        && check_sub_win(&next.board, sub / SUB_GRID_SIZE, sub % SUB_GRID_SIZE, mover)
    {
        debug!(sub, player = %mover, "Sub-grid won");
        next.sub_grid_winners[sub] = Some(mover);
    }

    let target = position_in_sub_grid(index);
    next.active_grid_index = is_sub_grid_open(&next, target).then_some(target);

    if let Some(line) = check_winner(&next.sub_grid_winners, SUB_GRID_SIZE, mover, SUB_GRID_SIZE) {
        info!(player = %mover, ?line, "Meta board won");
        next.score = next.score.record(Some(mover));
        next.winner = Some(mover);
        next.winning_line = Some(line);
        next.sound_event = Some(SoundEvent::Win);
        next.active_grid_index = None;
        return Ok(next);
    }

    // Every decided sub-grid or a full 9x9 board is a draw, even when some
    // sub-grids filled up without a winner.
    let all_decided = next.sub_grid_winners.iter().all(Option::is_some);
    if all_decided || next.board.iter().all(Option::is_some) {
        info!("Ultimate game drawn");
        next.score = next.score.record(None);
        next.is_draw = true;
        next.sound_event = Some(SoundEvent::Draw);
        next.active_grid_index = None;
        return Ok(next);
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::engine;
    use crate::types::GameMode;

    fn ultimate() -> GameState {
        engine::with_mode(&GameState::default(), GameMode::Ultimate, &mut ScriptedDice::new())
    }

    #[test]
    fn test_index_geometry() {
        assert_eq!(sub_grid_of(0), 0);
        assert_eq!(sub_grid_of(8), 2);
        assert_eq!(sub_grid_of(30), 4);
        assert_eq!(sub_grid_of(80), 8);
        assert_eq!(position_in_sub_grid(0), 0);
        assert_eq!(position_in_sub_grid(30), 0);
        assert_eq!(position_in_sub_grid(40), 4);
        assert_eq!(position_in_sub_grid(80), 8);
        let cells: Vec<_> = sub_grid_cells(4).collect();
        assert_eq!(cells, vec![30, 31, 32, 39, 40, 41, 48, 49, 50]);
    }

    #[test]
    fn test_move_sends_opponent_to_matching_sub_grid() {
        let state = ultimate();
        // Cell 10 is row 1, col 1: centre of sub-grid 0.
        let next = place(&state, 10).unwrap();
        assert_eq!(next.active_grid_index, Some(4));
        assert_eq!(next.cell(10), Some(Player::X));
    }

    #[test]
    fn test_wrong_sub_grid_rejected() {
        let mut state = ultimate();
        state.active_grid_index = Some(4);
        assert_eq!(place(&state, 0), Err(MoveError::WrongSubGrid { expected: 4 }));
        assert!(place(&state, 40).is_ok());
    }

    #[test]
    fn test_sub_grid_win_recorded_once() {
        let mut state = ultimate();
        state.board[0] = Some(Player::X);
        state.board[1] = Some(Player::X);
        let next = place(&state, 2).unwrap();
        assert_eq!(next.sub_grid_winners[0], Some(Player::X));

        // O completing a line in the already-won sub-grid does not steal it.
        let mut later = next.clone();
        later.current_player = Player::O;
        later.active_grid_index = None;
        for i in [9, 10] {
            later.board[i] = Some(Player::O);
        }
        let later = place(&later, 11).unwrap();
        assert_eq!(later.sub_grid_winners[0], Some(Player::X));
    }

    #[test]
    fn test_target_won_sub_grid_frees_next_move() {
        let mut state = ultimate();
        state.sub_grid_winners[4] = Some(Player::O);
        // Cell 10 points at sub-grid 4, which is decided.
        let next = place(&state, 10).unwrap();
        assert_eq!(next.active_grid_index, None);
    }

    #[test]
    fn test_target_full_sub_grid_frees_next_move() {
        let mut state = ultimate();
        for (k, i) in sub_grid_cells(8).enumerate() {
            state.board[i] = Some(if k % 3 == 1 { Player::X } else { Player::O });
        }
        // Row 2, col 2 of sub-grid 0 is cell 20 and points at sub-grid 8.
        let next = place(&state, 20).unwrap();
        assert_eq!(next.active_grid_index, None);
    }

    #[test]
    fn test_meta_line_wins_game() {
        let mut state = ultimate();
        state.sub_grid_winners[0] = Some(Player::X);
        state.sub_grid_winners[1] = Some(Player::X);
        // Complete the top row of sub-grid 2 (cells 6, 7, 8).
        state.board[6] = Some(Player::X);
        state.board[7] = Some(Player::X);
        let next = place(&state, 8).unwrap();
        assert_eq!(next.winner, Some(Player::X));
        assert_eq!(next.winning_line.as_deref(), Some(&[0, 1, 2][..]));
        assert_eq!(next.score.x, 1);
        assert_eq!(next.sound_event, Some(SoundEvent::Win));
    }

    #[test]
    fn test_all_sub_grids_decided_is_draw() {
        let mut state = ultimate();
        // X O X / X O O / O X _ on the meta board: no line for anybody.
        let meta = [
            Some(Player::X),
            Some(Player::O),
            Some(Player::X),
            Some(Player::X),
            Some(Player::O),
            Some(Player::O),
            Some(Player::O),
            Some(Player::X),
            None,
        ];
        state.sub_grid_winners = meta;
        // X takes sub-grid 8 via its top row: cells 60, 61, 62.
        state.board[60] = Some(Player::X);
        state.board[61] = Some(Player::X);
        let next = place(&state, 62).unwrap();
        assert_eq!(next.sub_grid_winners[8], Some(Player::X));
        assert_eq!(next.winner, None);
        assert!(next.is_draw);
        assert_eq!(next.score.draws, 1);
        assert_eq!(next.active_grid_index, None);
    }

    #[test]
    fn test_hypothetical_sub_win() {
        let mut board = vec![None; 81];
        board[30] = Some(Player::O);
        board[31] = Some(Player::O);
        assert!(wins_sub_grid(&board, 32, Player::O));
        assert!(!wins_sub_grid(&board, 32, Player::X));
        assert!(!wins_sub_grid(&board, 39, Player::O));
        assert_eq!(board[32], None);
    }
}
