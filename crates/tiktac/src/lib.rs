//! Tiktac - turn controller, settings and terminal front-end
//!
//! Drives a [`tiktac_rules`] game in real time: the AI answers after a short
//! delay, Speed mode runs a per-turn countdown, scores and preferences are
//! persisted, and each move is turned into sound and vibration cues.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tiktac::{ControllerConfig, LogFeedback, TomlFileStore, TurnController};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let controller = TurnController::new(
//!     Arc::new(TomlFileStore::new("tiktac_settings.toml")),
//!     Arc::new(LogFeedback),
//!     ControllerConfig::default(),
//! )?;
//! controller.make_move(4)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod controller;
mod feedback;
mod input;
mod settings;

pub mod render;

// Crate-level exports - Controller
pub use controller::{ControllerConfig, ControllerError, TurnController};

// Crate-level exports - Feedback
pub use feedback::{Cue, DEFAULT_AMPLITUDE, FeedbackSink, LogFeedback, Tone, Vibration, Waveform};

// Crate-level exports - Input
pub use input::{HELP, Input, InputError};

// Crate-level exports - Settings
pub use settings::{MemoryStore, Settings, SettingsStore, StoreError, TomlFileStore};
