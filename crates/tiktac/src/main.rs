//! Tiktac - terminal front-end
//!
//! Board and prompts go to stdout, logs to stderr.

#![warn(missing_docs)]

mod cli;

use anyhow::{Result, anyhow};
use clap::Parser;
use cli::{Cli, Command};
use std::path::Path;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tiktac::{
    ControllerConfig, HELP, Input, LogFeedback, SettingsStore, TomlFileStore, TurnController,
    render,
};
use tiktac_rules::{BoardConfig, GameMode, GameState, engine};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Play {
        mode: GameMode::Classic,
        size: 3,
        win: 3,
    });

    match command {
        Command::Play { mode, size, win } => run_play(&cli.settings, mode, size, win).await,
        Command::Stats => show_stats(&cli.settings),
        Command::ResetStats => reset_stats(&cli.settings),
        Command::Modes => {
            for mode in GameMode::iter() {
                println!("{:<10} {}", mode.to_string(), mode.description());
            }
            Ok(())
        }
    }
}

/// Print the stored scoreboard
fn show_stats(path: &Path) -> Result<()> {
    let settings = TomlFileStore::new(path).load()?;
    let score = settings.scoreboard();
    println!("X: {}  O: {}  Draws: {}", score.x, score.o, score.draws);
    Ok(())
}

/// Zero the stored scoreboard, keeping the other settings
#[instrument(fields(path = %path.display()))]
fn reset_stats(path: &Path) -> Result<()> {
    let store = TomlFileStore::new(path);
    let state = engine::reset_stats(&store.load()?.initial_state());
    store.save(&tiktac::Settings::from_state(&state))?;
    info!("Scoreboard cleared");
    println!("Scoreboard cleared.");
    Ok(())
}

/// Interactive game loop
#[instrument(fields(path = %path.display()))]
async fn run_play(path: &Path, mode: GameMode, size: usize, win: usize) -> Result<()> {
    let board = BoardConfig::new(size, win)?;
    let controller = TurnController::new(
        Arc::new(TomlFileStore::new(path)),
        Arc::new(LogFeedback),
        ControllerConfig::default(),
    )?;
    controller.set_mode(mode);
    controller.reset_game(board);
    info!(%mode, size, win, "Starting game");

    let mut updates = controller.subscribe();
    let mut shown = controller.state();
    print!("{}", render::render(&shown));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Input>() {
                    Ok(Input::Quit) => break,
                    Ok(input) => {
                        if let Err(e) = handle(&controller, input) {
                            println!("{}", e);
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                // Countdown ticks alone are not worth a redraw.
                if !same_ignoring_timer(&state, &shown) {
                    print!("{}", render::render(&state));
                    shown = state;
                }
            }
        }
    }
    Ok(())
}

fn same_ignoring_timer(a: &GameState, b: &GameState) -> bool {
    engine::with_time_left(a, 1.0) == engine::with_time_left(b, 1.0)
}

/// Applies one prompt command to the controller.
fn handle(controller: &TurnController, input: Input) -> Result<()> {
    let state = controller.state();
    if let Some(index) = input.target(state.grid_size()) {
        controller.make_move(index)?;
        return Ok(());
    }
    match input {
        Input::Reset => controller.restart(),
        Input::Size(size, win) => {
            let win = win.unwrap_or_else(|| state.win_condition().min(size));
            controller.reset_game(BoardConfig::new(size, win)?);
        }
        Input::Mode(mode) => controller.set_mode(mode),
        Input::Opponent(opponent) => controller.set_opponent(opponent),
        Input::Sound(enabled) => controller.set_sound(enabled),
        Input::Haptics(enabled) => controller.set_haptics(enabled),
        Input::Stats => println!("{}", render::score(&state)),
        Input::ResetStats => {
            controller.reset_stats();
            println!("Scoreboard cleared.");
        }
        Input::Help => println!("{}", HELP),
        Input::Cell(_) | Input::Coords(..) | Input::Quit => {
            return Err(anyhow!("unexpected input {:?}", input));
        }
    }
    Ok(())
}
