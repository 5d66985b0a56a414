//! Turn resolution: pure transitions from one snapshot to the next.
//!
//! Every function takes the current [`GameState`] by reference and returns a
//! new one. Rejected moves return a [`MoveError`] and produce no snapshot.

use crate::dice::Dice;
use crate::error::MoveError;
use crate::rules::check_winner;
use crate::state::{BoardConfig, GameState, ULTIMATE_GRID_SIZE};
use crate::types::{GameMode, OpponentType, Player, Scoreboard, SoundEvent};
use crate::ultimate;
use crate::variants::{self, Placement};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// Where a move request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    /// Local input from the presentation layer.
    Human,
    /// The AI player's own move.
    Ai,
}

/// Starts a new game with the given geometry, keeping mode, opponent,
/// scores and toggles. Ultimate always plays on 9x9.
#[instrument(skip(state, dice), fields(mode = %state.mode))]
pub fn reset(state: &GameState, config: BoardConfig, dice: &mut dyn Dice) -> GameState {
    reset_with(state, config.grid_size(), config.win_condition(), dice)
}

/// Starts a new game with the current geometry.
#[instrument(skip(state, dice), fields(mode = %state.mode))]
pub fn restart(state: &GameState, dice: &mut dyn Dice) -> GameState {
    reset_with(state, state.grid_size, state.win_condition, dice)
}

fn reset_with(state: &GameState, grid_size: usize, win_condition: usize, dice: &mut dyn Dice) -> GameState {
    let grid_size = if state.mode == GameMode::Ultimate {
        ULTIMATE_GRID_SIZE
    } else {
        grid_size
    };
    let cells = grid_size * grid_size;
    let blocked_cells = match state.mode {
        GameMode::Blocked => variants::blocked_layout(cells, dice),
        _ => BTreeSet::new(),
    };
    let revealed_cells = match state.mode {
        GameMode::Fog => BTreeSet::new(),
        _ => (0..cells).collect(),
    };
    debug!(grid_size, win_condition, blocked = blocked_cells.len(), "New game laid out");

    GameState {
        board: vec![None; cells],
        grid_size,
        win_condition,
        current_player: Player::X,
        winner: None,
        is_draw: false,
        winning_line: None,
        blocked_cells,
        revealed_cells,
        move_history: Vec::new(),
        active_grid_index: None,
        sub_grid_winners: [None; 9],
        time_left: 1.0,
        is_ai_thinking: false,
        ..state.clone()
    }
}

/// Switches the rule variant and starts a new game.
pub fn with_mode(state: &GameState, mode: GameMode, dice: &mut dyn Dice) -> GameState {
    let switched = GameState {
        mode,
        ..state.clone()
    };
    restart(&switched, dice)
}

/// Changes who plays O and starts a new game.
pub fn with_opponent(state: &GameState, opponent: OpponentType, dice: &mut dyn Dice) -> GameState {
    let switched = GameState {
        opponent,
        ..state.clone()
    };
    restart(&switched, dice)
}

/// Zeroes the scoreboard.
pub fn reset_stats(state: &GameState) -> GameState {
    GameState {
        score: Scoreboard::default(),
        ..state.clone()
    }
}

/// Sets the sound toggle.
pub fn with_sound(state: &GameState, enabled: bool) -> GameState {
    GameState {
        sound_enabled: enabled,
        ..state.clone()
    }
}

/// Sets the haptics toggle.
pub fn with_haptics(state: &GameState, enabled: bool) -> GameState {
    GameState {
        haptics_enabled: enabled,
        ..state.clone()
    }
}

/// Clears the one-shot sound tag once the presentation layer dispatched it.
pub fn consume_sound(state: &GameState) -> GameState {
    GameState {
        sound_event: None,
        ..state.clone()
    }
}

/// Updates the Speed countdown fraction.
pub fn with_time_left(state: &GameState, time_left: f32) -> GameState {
    GameState {
        time_left: time_left.clamp(0.0, 1.0),
        ..state.clone()
    }
}

/// Speed timeout: the turn passes without a placement.
#[instrument(skip(state), fields(player = %state.current_player))]
pub fn expire_turn(state: &GameState) -> GameState {
    let mut next = state.clone();
    if state.is_terminal() || state.is_ai_thinking {
        return next;
    }
    debug!("Turn expired");
    switch_turn(&mut next);
    next.sound_event = Some(SoundEvent::Pop);
    next
}

/// Cells a move can land on right now.
///
/// In Gravity mode these are the landing cells of the non-full columns, in
/// Ultimate the empty cells of the active sub-grid (or all empty cells when
/// unrestricted), otherwise every empty unblocked cell.
pub fn legal_targets(state: &GameState) -> Vec<usize> {
    if state.is_terminal() {
        return Vec::new();
    }
    let empty = |i: &usize| state.board[*i].is_none() && !state.blocked_cells.contains(i);
    match state.mode {
        GameMode::Gravity => (0..state.grid_size)
            .filter_map(|col| variants::gravity_target(state, col))
            .collect(),
        GameMode::Ultimate => match state.active_grid_index {
            Some(sub) => ultimate::sub_grid_cells(sub).filter(empty).collect(),
            None => (0..state.cell_count()).filter(empty).collect(),
        },
        _ => (0..state.cell_count()).filter(empty).collect(),
    }
}

/// Validates and applies a move, then resolves win, draw and turn order.
///
/// On a draw `current_player` stays on the player who filled the board; the
/// turn only passes while the game is still open.
#[instrument(skip(state, dice), fields(mode = %state.mode, player = %state.current_player))]
pub fn apply_move(
    state: &GameState,
    index: usize,
    source: MoveSource,
    dice: &mut dyn Dice,
) -> Result<GameState, MoveError> {
    if state.is_terminal() {
        return Err(MoveError::GameOver);
    }
    if source == MoveSource::Human {
        if state.is_ai_thinking {
            return Err(MoveError::AiThinking);
        }
        if state.opponent.is_ai() && state.current_player == Player::O {
            return Err(MoveError::NotYourTurn);
        }
    }
    if index >= state.cell_count() {
        return Err(MoveError::OutOfBounds(index));
    }
    if state.board[index].is_some() {
        return Err(MoveError::Occupied(index));
    }
    if state.blocked_cells.contains(&index) {
        return Err(MoveError::Blocked(index));
    }

    if state.mode == GameMode::Ultimate {
        let mut next = ultimate::place(state, index)?;
        if !next.is_terminal() {
            switch_turn(&mut next);
        }
        return Ok(next);
    }

    let (mut next, placement) = variants::place(state, index, dice)?;
    // Runs are checked for the piece's owner, which is the opponent after a chaos swap.
    let run = match placement {
        Placement::Placed { owner, .. } => {
            check_winner(&next.board, next.grid_size, owner, next.win_condition)
                .map(|line| (owner, line))
        }
        Placement::Detonated { .. } => None,
    };

    if let Some((run_maker, line)) = run {
        let (winner, sound) = match state.mode {
            GameMode::Misere => (run_maker.opponent(), SoundEvent::Lose),
            _ => (run_maker, SoundEvent::Win),
        };
        info!(%winner, %run_maker, ?line, "Game won");
        next.score = next.score.record(Some(winner));
        next.winner = Some(winner);
        next.winning_line = Some(line);
        next.sound_event = Some(sound);
    } else if next.is_full() {
        info!("Game drawn");
        next.score = next.score.record(None);
        next.is_draw = true;
        next.sound_event = Some(SoundEvent::Draw);
    } else {
        switch_turn(&mut next);
    }
    Ok(next)
}

/// Hands the move to the other player, flagging the AI when it is O's turn.
fn switch_turn(state: &mut GameState) {
    state.current_player = state.current_player.opponent();
    if state.opponent.is_ai() && state.current_player == Player::O {
        state.is_ai_thinking = true;
    }
}
