//! Plain-text view of a snapshot.

use tiktac_rules::{GameMode, GameState, Player, SUB_GRID_SIZE};

/// Width of the Speed countdown bar, in characters.
pub const TIMER_WIDTH: usize = 20;

/// Character shown for cell `index`.
pub fn cell_char(state: &GameState, index: usize) -> char {
    match state.cell(index) {
        Some(Player::X) => 'X',
        Some(Player::O) => 'O',
        None if state.blocked_cells().contains(&index) => '#',
        None if state.is_hidden(index) => '?',
        None => '.',
    }
}

/// Board grid, one line per row. Ultimate boards get sub-grid separators.
pub fn board(state: &GameState) -> String {
    let n = state.grid_size();
    let ultimate = state.mode() == GameMode::Ultimate;
    let mut out = String::new();
    for row in 0..n {
        if ultimate && row > 0 && row % SUB_GRID_SIZE == 0 {
            let segment = "-".repeat(SUB_GRID_SIZE * 2 - 1);
            out.push_str(&vec![segment; n / SUB_GRID_SIZE].join("-+-"));
            out.push('\n');
        }
        let mut line = String::new();
        for col in 0..n {
            if col > 0 {
                line.push_str(if ultimate && col % SUB_GRID_SIZE == 0 {
                    " | "
                } else {
                    " "
                });
            }
            line.push(cell_char(state, row * n + col));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Whose turn it is, or how the game ended.
pub fn status(state: &GameState) -> String {
    if let Some(winner) = state.winner() {
        return match state.mode() {
            GameMode::Misere => format!("{} wins! {} made a line.", winner, winner.opponent()),
            _ => format!("{} wins!", winner),
        };
    }
    if state.is_draw() {
        return "Draw!".to_string();
    }
    if state.is_ai_thinking() {
        return "AI is thinking...".to_string();
    }
    match state.active_grid_index() {
        Some(sub) if state.mode() == GameMode::Ultimate => {
            format!("{} to move in sub-grid {}", state.current_player(), sub)
        }
        _ => format!("{} to move", state.current_player()),
    }
}

/// Scoreboard line.
pub fn score(state: &GameState) -> String {
    let score = state.score();
    format!("X: {}  O: {}  Draws: {}", score.x, score.o, score.draws)
}

/// Countdown bar for a `time_left` fraction.
pub fn timer_bar(time_left: f32) -> String {
    let filled = ((time_left.clamp(0.0, 1.0) * TIMER_WIDTH as f32).round()) as usize;
    format!("[{}{}]", "=".repeat(filled), " ".repeat(TIMER_WIDTH - filled))
}

/// Header, board, status, score and (in Speed mode) the countdown.
pub fn render(state: &GameState) -> String {
    let mut out = format!(
        "{} ({}x{}, {} in a row, vs {})\n",
        state.mode().title(),
        state.grid_size(),
        state.grid_size(),
        state.win_condition(),
        state.opponent(),
    );
    out.push_str(&board(state));
    out.push_str(&format!("{}\n{}\n", status(state), score(state)));
    if state.mode() == GameMode::Speed && !state.is_terminal() {
        out.push_str(&format!("{}\n", timer_bar(state.time_left())));
    }
    out
}
