//! Command-line interface for tiktac.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tiktac_rules::GameMode;

/// Tiktac - tic-tac-toe with ten rule variants
#[derive(Parser, Debug)]
#[command(name = "tiktac")]
#[command(about = "Tic-tac-toe with ten rule variants and a local AI", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (scores, toggles, opponent)
    #[arg(long, env = "TIKTAC_SETTINGS", default_value = "tiktac_settings.toml", global = true)]
    pub settings: PathBuf,

    /// Subcommand to run (defaults to `play`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Play interactively in the terminal
    Play {
        /// Rule variant to start with
        #[arg(short, long, default_value = "classic")]
        mode: GameMode,

        /// Board edge length (3-10)
        #[arg(short, long, default_value_t = 3)]
        size: usize,

        /// Run length needed to win (3 up to the board size)
        #[arg(short, long, default_value_t = 3)]
        win: usize,
    },

    /// Print the stored scoreboard
    Stats,

    /// Zero the stored scoreboard
    ResetStats,

    /// List the rule variants
    Modes,
}
