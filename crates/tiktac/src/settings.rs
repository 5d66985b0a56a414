//! Persisted scores and preferences.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tiktac_rules::{GameState, OpponentType, Scoreboard};
use tracing::{debug, info, instrument};

/// Values that survive between runs.
///
/// Keys in the file are `scoreX`, `scoreO`, `draws`, `sound`, `haptics` and
/// `opponentType`. Missing keys fall back to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Games won by X.
    score_x: u32,
    /// Games won by O.
    score_o: u32,
    /// Drawn games.
    draws: u32,
    /// Sound cues on.
    #[serde(rename = "sound")]
    sound_enabled: bool,
    /// Vibration cues on.
    #[serde(rename = "haptics")]
    haptics_enabled: bool,
    /// Opponent ordinal: 0 PvP, 1 easy AI, 2 hard AI.
    opponent_type: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            score_x: 0,
            score_o: 0,
            draws: 0,
            sound_enabled: true,
            haptics_enabled: true,
            opponent_type: OpponentType::Pvp.ordinal(),
        }
    }
}

impl Settings {
    /// Captures the persisted parts of a snapshot.
    pub fn from_state(state: &GameState) -> Self {
        let score = state.score();
        Self {
            score_x: score.x,
            score_o: score.o,
            draws: score.draws,
            sound_enabled: state.sound_enabled(),
            haptics_enabled: state.haptics_enabled(),
            opponent_type: state.opponent().ordinal(),
        }
    }

    /// Scoreboard view of the counters.
    pub fn scoreboard(&self) -> Scoreboard {
        Scoreboard {
            x: self.score_x,
            o: self.score_o,
            draws: self.draws,
        }
    }

    /// Decoded opponent. Unknown ordinals mean PvP.
    pub fn opponent(&self) -> OpponentType {
        OpponentType::from_ordinal(self.opponent_type)
    }

    /// Fresh classic game carrying these settings.
    pub fn initial_state(&self) -> GameState {
        GameState::new(
            self.scoreboard(),
            self.opponent(),
            self.sound_enabled,
            self.haptics_enabled,
        )
    }
}

/// Settings persistence error.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Where settings are kept.
pub trait SettingsStore: Send + Sync {
    /// Reads the stored settings, or defaults if nothing was stored yet.
    fn load(&self) -> Result<Settings, StoreError>;

    /// Replaces the stored settings.
    fn save(&self, settings: &Settings) -> Result<(), StoreError>;
}

/// TOML file on disk.
#[derive(Debug, Clone, Getters)]
pub struct TomlFileStore {
    /// File location.
    path: PathBuf,
}

impl TomlFileStore {
    /// Store backed by `path`. The file is created on first save.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SettingsStore for TomlFileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Settings, StoreError> {
        if !self.path.exists() {
            debug!("No settings file yet, using defaults");
            return Ok(Settings::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| StoreError::new(format!("Failed to read settings file: {}", e)))?;
        let settings: Settings = toml::from_str(&content)
            .map_err(|e| StoreError::new(format!("Failed to parse settings: {}", e)))?;
        info!(?settings, "Settings loaded");
        Ok(settings)
    }

    #[instrument(skip(self, settings), fields(path = %self.path.display()))]
    fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        let content = toml::to_string_pretty(settings)
            .map_err(|e| StoreError::new(format!("Failed to serialize settings: {}", e)))?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::new(format!("Failed to create settings dir: {}", e)))?;
        }
        std::fs::write(&self.path, content)
            .map_err(|e| StoreError::new(format!("Failed to write settings file: {}", e)))?;
        debug!("Settings saved");
        Ok(())
    }
}

/// Settings held in memory, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    settings: Mutex<Settings>,
}

impl MemoryStore {
    /// Store pre-filled with `settings`.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }

    /// Currently stored value.
    pub fn snapshot(&self) -> Settings {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Settings, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner) = *settings;
        Ok(())
    }
}
