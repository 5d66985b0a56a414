//! Move selection for the computer opponent.
//!
//! Candidates are evaluated on scratch copies of the board; the chosen index
//! is then submitted through [`crate::engine::apply_move`] like any other move.

use crate::dice::Dice;
use crate::engine::legal_targets;
use crate::rules::check_winner;
use crate::state::GameState;
use crate::types::{GameMode, OpponentType, Player};
use crate::ultimate::wins_sub_grid;
use tracing::{debug, instrument, warn};

const CORNERS_3X3: [usize; 4] = [0, 2, 6, 8];

/// Picks the AI's next cell for the player to move, or `None` when no
/// legal cell exists.
#[instrument(skip(state, dice), fields(mode = %state.mode(), opponent = %state.opponent()))]
pub fn choose_move(state: &GameState, dice: &mut dyn Dice) -> Option<usize> {
    let candidates = legal_targets(state);
    if candidates.is_empty() {
        warn!("AI asked to move with no legal cell");
        return None;
    }
    let me = state.current_player();

    let choice = if state.mode() == GameMode::Ultimate {
        choose_ultimate(state, &candidates, me, dice)
    } else {
        match state.opponent() {
            OpponentType::AiHard => choose_hard(state, &candidates, me, dice),
            _ => choose_easy(state, &candidates, me, dice),
        }
    };
    debug!(choice, player = %me, "AI chose cell");
    Some(choice)
}

fn choose_easy(state: &GameState, candidates: &[usize], me: Player, dice: &mut dyn Dice) -> usize {
    completing_move(state, candidates, me)
        .or_else(|| completing_move(state, candidates, me.opponent()))
        .unwrap_or_else(|| random_cell(candidates, dice))
}

fn choose_hard(state: &GameState, candidates: &[usize], me: Player, dice: &mut dyn Dice) -> usize {
    if let Some(index) = completing_move(state, candidates, me)
        .or_else(|| completing_move(state, candidates, me.opponent()))
    {
        return index;
    }

    let center = state.cell_count() / 2;
    if candidates.contains(&center) {
        return center;
    }

    if state.grid_size() == 3 {
        let corners: Vec<usize> = CORNERS_3X3
            .into_iter()
            .filter(|c| candidates.contains(c))
            .collect();
        if !corners.is_empty() {
            return random_cell(&corners, dice);
        }
    }
    random_cell(candidates, dice)
}

fn choose_ultimate(state: &GameState, candidates: &[usize], me: Player, dice: &mut dyn Dice) -> usize {
    let board = state.board();
    candidates
        .iter()
        .copied()
        .find(|&i| wins_sub_grid(board, i, me))
        .or_else(|| {
            candidates
                .iter()
                .copied()
                .find(|&i| wins_sub_grid(board, i, me.opponent()))
        })
        .unwrap_or_else(|| random_cell(candidates, dice))
}

/// First candidate that would complete a run for `player`.
fn completing_move(state: &GameState, candidates: &[usize], player: Player) -> Option<usize> {
    let mut scratch = state.board().to_vec();
    candidates.iter().copied().find(|&i| {
        scratch[i] = Some(player);
        let wins = check_winner(&scratch, state.grid_size(), player, state.win_condition()).is_some();
        scratch[i] = None;
        wins
    })
}

fn random_cell(candidates: &[usize], dice: &mut dyn Dice) -> usize {
    candidates[dice.pick(candidates.len())]
}
