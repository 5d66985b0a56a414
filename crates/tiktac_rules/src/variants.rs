//! Per-variant move transforms for the standard (non-Ultimate) boards.
//!
//! A move goes through three stages, each dispatched on [`GameMode`]:
//! target resolution (gravity), the placement effect (bomb, chaos) and
//! post-placement effects (fading, fog).

use crate::dice::Dice;
use crate::error::MoveError;
use crate::state::GameState;
use crate::types::{GameMode, Move, Player, SoundEvent};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Probability that a Bomb-mode move detonates.
pub const BOMB_CHANCE: f64 = 0.15;
/// Probability that a Chaos-mode piece goes to the opponent.
pub const CHAOS_CHANCE: f64 = 0.10;
/// Share of cells blocked in Blocked mode.
pub const BLOCKED_FRACTION: f64 = 0.15;

/// What the placement stage did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// A piece now sits at `index`, owned by `owner`.
    Placed {
        /// Cell the piece landed on.
        index: usize,
        /// Owner of the piece (differs from the mover after a chaos swap).
        owner: Player,
    },
    /// The neighbourhood of `index` was cleared; nothing was placed.
    Detonated {
        /// Centre of the blast.
        index: usize,
    },
}

/// Number of blocked cells for a board of `total_cells`.
pub fn blocked_count(total_cells: usize) -> usize {
    ((total_cells as f64 * BLOCKED_FRACTION) as usize).max(1)
}

/// Picks the blocked cells for a new Blocked-mode game.
#[instrument(skip(dice))]
pub fn blocked_layout(total_cells: usize, dice: &mut dyn Dice) -> BTreeSet<usize> {
    dice.sample(total_cells, blocked_count(total_cells))
        .into_iter()
        .collect()
}

/// Lowest empty, unblocked cell of `col`.
pub fn gravity_target(state: &GameState, col: usize) -> Option<usize> {
    let n = state.grid_size;
    (0..n)
        .rev()
        .map(|row| row * n + col)
        .find(|&i| state.board[i].is_none() && !state.blocked_cells.contains(&i))
}

/// Cell a move aimed at `index` actually lands on.
fn resolve_target(state: &GameState, index: usize) -> Result<usize, MoveError> {
    match state.mode {
        GameMode::Gravity => {
            let col = index % state.grid_size;
            gravity_target(state, col).ok_or(MoveError::ColumnFull(col))
        }
        _ => Ok(index),
    }
}

/// Applies a move on a standard board and returns the new snapshot.
///
/// The caller has already checked bounds, occupancy and blocking of `index`.
/// Win and draw resolution happen afterwards in [`crate::engine`].
#[instrument(skip(state, dice), fields(mode = %state.mode, player = %state.current_player))]
pub fn place(
    state: &GameState,
    index: usize,
    dice: &mut dyn Dice,
) -> Result<(GameState, Placement), MoveError> {
    let target = resolve_target(state, index)?;
    let mover = state.current_player;
    let mut next = state.clone();

    let placement = if state.mode == GameMode::Bomb && dice.chance(BOMB_CHANCE) {
        let cleared: Vec<usize> = state.neighbourhood(target).collect();
        for i in cleared {
            next.board[i] = None;
        }
        next.sound_event = Some(SoundEvent::Bomb);
        debug!(target, "Bomb detonated");
        Placement::Detonated { index: target }
    } else {
        let owner = if state.mode == GameMode::Chaos && dice.chance(CHAOS_CHANCE) {
            debug!(target, "Chaos swapped piece owner");
            mover.opponent()
        } else {
            mover
        };
        next.board[target] = Some(owner);
        next.move_history.push(Move::new(target, owner));
        next.sound_event = Some(SoundEvent::Move);
        Placement::Placed {
            index: target,
            owner,
        }
    };

    match state.mode {
        GameMode::Fading => evict_oldest(&mut next, placement),
        GameMode::Fog => reveal_around(&mut next, target),
        _ => {}
    }

    next.is_ai_thinking = false;
    Ok((next, placement))
}

/// Drops the oldest move once the history outgrows `grid_size + 2`.
fn evict_oldest(state: &mut GameState, placement: Placement) {
    if state.move_history.len() > state.grid_size + 2 {
        let oldest = state.move_history.remove(0);
        if matches!(placement, Placement::Placed { .. }) {
            state.board[oldest.index] = None;
        }
        debug!(index = oldest.index, "Oldest move faded");
    }
}

/// Permanently reveals the neighbourhood of `index`.
fn reveal_around(state: &mut GameState, index: usize) {
    let around: Vec<usize> = state.neighbourhood(index).collect();
    state.revealed_cells.extend(around);
}
