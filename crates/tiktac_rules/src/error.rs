//! Move rejection reasons.

use derive_more::{Display, Error};

/// Why a move was not applied. The snapshot is left untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// The game already has a winner or is drawn.
    #[display("Game is already over")]
    GameOver,
    /// The index is not on the board.
    #[display("Cell {_0} is off the board")]
    OutOfBounds(#[error(not(source))] usize),
    /// The cell already holds a piece.
    #[display("Cell {_0} is already occupied")]
    Occupied(#[error(not(source))] usize),
    /// The cell is permanently unplayable.
    #[display("Cell {_0} is blocked")]
    Blocked(#[error(not(source))] usize),
    /// Ultimate move outside the active sub-grid.
    #[display("Move must be played in sub-grid {expected}")]
    WrongSubGrid {
        /// Sub-grid the move had to land in.
        expected: usize,
    },
    /// Gravity column has no free cell.
    #[display("Column {_0} is full")]
    ColumnFull(#[error(not(source))] usize),
    /// Input arrived while the AI move is pending.
    #[display("AI is thinking")]
    AiThinking,
    /// Human input on the AI's turn.
    #[display("Not your turn")]
    NotYourTurn,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(MoveError::Occupied(4).to_string(), "Cell 4 is already occupied");
        assert_eq!(
            MoveError::WrongSubGrid { expected: 2 }.to_string(),
            "Move must be played in sub-grid 2"
        );
        assert_eq!(MoveError::GameOver.to_string(), "Game is already over");
    }
}
