//! Board rules shared by every variant.
//!
//! Pure functions over raw cell slices, kept apart from the snapshot so the
//! AI can evaluate hypothetical boards without building a full state.

pub mod win;

pub use win::{SUB_GRID_SIZE, check_sub_win, check_winner, is_sub_grid_full};
