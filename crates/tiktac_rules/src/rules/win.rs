//! Win detection over square boards of any size and run length.

use crate::types::Player;
use tracing::instrument;

/// Edge length of an Ultimate sub-grid.
pub const SUB_GRID_SIZE: usize = 3;
/// Edge length of the full Ultimate board.
const ULTIMATE_EDGE: usize = SUB_GRID_SIZE * SUB_GRID_SIZE;

/// Finds the first run of `win_length` cells owned by `player`.
///
/// Scan order is rows (top to bottom, left to right), then columns, then
/// down-right diagonals, then down-left diagonals. Returns the run's cell
/// indices in scan direction, or `None` if the player has no complete run.
#[instrument(skip(board))]
pub fn check_winner(
    board: &[Option<Player>],
    size: usize,
    player: Player,
    win_length: usize,
) -> Option<Vec<usize>> {
    if win_length == 0 || win_length > size || board.len() < size * size {
        return None;
    }
    let owned = |i: usize| board[i] == Some(player);
    let run = |start: usize, step: isize| -> Vec<usize> {
        (0..win_length)
            .map(|k| (start as isize + step * k as isize) as usize)
            .collect()
    };
    let span = size - win_length;
    let down = size as isize;

    for row in 0..size {
        for col in 0..=span {
            let line = run(row * size + col, 1);
            if line.iter().all(|&i| owned(i)) {
                return Some(line);
            }
        }
    }
    for col in 0..size {
        for row in 0..=span {
            let line = run(row * size + col, down);
            if line.iter().all(|&i| owned(i)) {
                return Some(line);
            }
        }
    }
    for row in 0..=span {
        for col in 0..=span {
            let line = run(row * size + col, down + 1);
            if line.iter().all(|&i| owned(i)) {
                return Some(line);
            }
        }
    }
    for row in 0..=span {
        for col in (win_length - 1)..size {
            let line = run(row * size + col, down - 1);
            if line.iter().all(|&i| owned(i)) {
                return Some(line);
            }
        }
    }
    None
}

/// Index into the 9x9 board of cell `(r, c)` inside sub-grid `(sub_row, sub_col)`.
fn sub_cell(sub_row: usize, sub_col: usize, r: usize, c: usize) -> usize {
    (sub_row * SUB_GRID_SIZE + r) * ULTIMATE_EDGE + sub_col * SUB_GRID_SIZE + c
}

/// Checks the three rows, three columns and two diagonals of one sub-grid.
#[instrument(skip(board))]
pub fn check_sub_win(board: &[Option<Player>], sub_row: usize, sub_col: usize, player: Player) -> bool {
    let at = |r: usize, c: usize| board[sub_cell(sub_row, sub_col, r, c)] == Some(player);
    let rows = (0..3).any(|r| (0..3).all(|c| at(r, c)));
    let cols = (0..3).any(|c| (0..3).all(|r| at(r, c)));
    let diagonal = (0..3).all(|k| at(k, k));
    let anti_diagonal = (0..3).all(|k| at(k, 2 - k));
    rows || cols || diagonal || anti_diagonal
}

/// True iff all nine cells of the sub-grid are occupied.
#[instrument(skip(board))]
pub fn is_sub_grid_full(board: &[Option<Player>], sub_row: usize, sub_col: usize) -> bool {
    (0..3).all(|r| (0..3).all(|c| board[sub_cell(sub_row, sub_col, r, c)].is_some()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(size: usize, cells: &[(usize, Player)]) -> Vec<Option<Player>> {
        let mut board = vec![None; size * size];
        for &(i, p) in cells {
            board[i] = Some(p);
        }
        board
    }

    #[test]
    fn test_no_winner_empty_board() {
        let board = board_with(3, &[]);
        assert_eq!(check_winner(&board, 3, Player::X, 3), None);
    }

    #[test]
    fn test_winner_top_row() {
        let board = board_with(3, &[(0, Player::X), (1, Player::X), (2, Player::X)]);
        assert_eq!(check_winner(&board, 3, Player::X, 3), Some(vec![0, 1, 2]));
        assert_eq!(check_winner(&board, 3, Player::O, 3), None);
    }

    #[test]
    fn test_winner_column() {
        let board = board_with(4, &[(1, Player::O), (5, Player::O), (9, Player::O)]);
        assert_eq!(check_winner(&board, 4, Player::O, 3), Some(vec![1, 5, 9]));
    }

    #[test]
    fn test_winner_diagonal() {
        let board = board_with(3, &[(0, Player::O), (4, Player::O), (8, Player::O)]);
        assert_eq!(check_winner(&board, 3, Player::O, 3), Some(vec![0, 4, 8]));
    }

    #[test]
    fn test_winner_anti_diagonal_on_large_board() {
        // 5x5, run of 4 from (0,4) down-left.
        let board = board_with(
            5,
            &[(4, Player::X), (8, Player::X), (12, Player::X), (16, Player::X)],
        );
        assert_eq!(check_winner(&board, 5, Player::X, 4), Some(vec![4, 8, 12, 16]));
    }

    #[test]
    fn test_diagonals_do_not_wrap() {
        // Cells 2, 3, 4 on a 3x3 board look contiguous in memory but are not a line.
        let board = board_with(3, &[(2, Player::X), (3, Player::X), (4, Player::X)]);
        assert_eq!(check_winner(&board, 3, Player::X, 3), None);
        // Neither do 2, 4, 6 shifted by one row: 5, 7 plus 3.
        let board = board_with(3, &[(3, Player::X), (5, Player::X), (7, Player::X)]);
        assert_eq!(check_winner(&board, 3, Player::X, 3), None);
    }

    #[test]
    fn test_rows_scanned_before_columns() {
        let board = board_with(
            3,
            &[
                (0, Player::X),
                (1, Player::X),
                (2, Player::X),
                (3, Player::X),
                (6, Player::X),
            ],
        );
        assert_eq!(check_winner(&board, 3, Player::X, 3), Some(vec![0, 1, 2]));
    }

    #[test]
    fn test_returned_runs_have_exact_length_and_owner() {
        for size in 3..=10 {
            for win_length in 3..=size {
                // Fill the last row entirely; the first match is its leftmost run.
                let cells: Vec<_> = (0..size).map(|c| ((size - 1) * size + c, Player::O)).collect();
                let board = board_with(size, &cells);
                let line = check_winner(&board, size, Player::O, win_length).unwrap();
                assert_eq!(line.len(), win_length);
                assert!(line.iter().all(|&i| board[i] == Some(Player::O)));
                assert_eq!(check_winner(&board, size, Player::X, win_length), None);
            }
        }
    }

    #[test]
    fn test_oversized_run_is_none() {
        let board = board_with(3, &[(0, Player::X), (1, Player::X), (2, Player::X)]);
        assert_eq!(check_winner(&board, 3, Player::X, 4), None);
    }

    #[test]
    fn test_sub_win_offset() {
        // Sub-grid (1, 2) spans rows 3..6, cols 6..9. Anti-diagonal there.
        let board = board_with(9, &[(3 * 9 + 8, Player::X), (4 * 9 + 7, Player::X), (5 * 9 + 6, Player::X)]);
        assert!(check_sub_win(&board, 1, 2, Player::X));
        assert!(!check_sub_win(&board, 1, 1, Player::X));
        assert!(!check_sub_win(&board, 1, 2, Player::O));
    }

    #[test]
    fn test_sub_win_row_does_not_cross_sub_grids() {
        // Row 0, cols 2..5 spans sub-grids 0 and 1.
        let board = board_with(9, &[(2, Player::O), (3, Player::O), (4, Player::O)]);
        assert!(!check_sub_win(&board, 0, 0, Player::O));
        assert!(!check_sub_win(&board, 0, 1, Player::O));
    }

    #[test]
    fn test_sub_grid_full() {
        let mut board = vec![None; 81];
        for r in 6..9 {
            for c in 0..3 {
                board[r * 9 + c] = Some(if (r + c) % 2 == 0 { Player::X } else { Player::O });
            }
        }
        assert!(is_sub_grid_full(&board, 2, 0));
        assert!(!is_sub_grid_full(&board, 2, 1));
        board[8 * 9 + 2] = None;
        assert!(!is_sub_grid_full(&board, 2, 0));
    }
}
