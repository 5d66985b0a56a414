//! Turn controller: the single writer of the current game.
//!
//! Every transition runs under one mutex and is published on a
//! [`watch`] channel. Two kinds of deferred work exist, the AI move delay and
//! the Speed countdown. Both capture the epoch they were scheduled in and do
//! nothing if the epoch has moved on by the time they wake up.

use crate::feedback::{Cue, FeedbackSink};
use crate::settings::{Settings, SettingsStore};
use derive_getters::Getters;
use derive_more::{Display, Error};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tiktac_rules::{
    BoardConfig, Dice, GameMode, GameState, MoveError, MoveSource, OpponentType, RngDice, ai,
    engine,
};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Timing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct ControllerConfig {
    /// Time a Speed-mode player has to move.
    turn_duration: Duration,
    /// Countdown updates per turn (one more is sent at zero).
    countdown_steps: u32,
    /// Pause before the AI answers.
    ai_delay: Duration,
}

impl ControllerConfig {
    /// Creates a config. `countdown_steps` is raised to at least 1.
    pub fn new(turn_duration: Duration, countdown_steps: u32, ai_delay: Duration) -> Self {
        Self {
            turn_duration,
            countdown_steps: countdown_steps.max(1),
            ai_delay,
        }
    }

    fn step(&self) -> Duration {
        self.turn_duration / self.countdown_steps
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new(Duration::from_millis(3000), 100, Duration::from_millis(500))
    }
}

/// Controller construction error.
#[derive(Debug, Clone, Display, Error)]
#[display("Controller error: {} at {}:{}", message, file, line)]
pub struct ControllerError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ControllerError {
    /// Creates a new controller error.
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

struct Inner {
    state: GameState,
    epoch: u64,
    dice: Box<dyn Dice + Send>,
    timer: Option<JoinHandle<()>>,
    ai_task: Option<JoinHandle<()>>,
}

struct Shared {
    inner: Mutex<Inner>,
    tx: watch::Sender<GameState>,
    store: Arc<dyn SettingsStore>,
    feedback: Arc<dyn FeedbackSink>,
    config: ControllerConfig,
    runtime: Handle,
}

/// Handle to the running game. Clones share the same game.
#[derive(Clone)]
pub struct TurnController {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for TurnController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnController")
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

impl TurnController {
    /// Creates a controller seeded from the store, with OS randomness.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(
        store: Arc<dyn SettingsStore>,
        feedback: Arc<dyn FeedbackSink>,
        config: ControllerConfig,
    ) -> Result<Self, ControllerError> {
        let dice = RngDice(StdRng::from_os_rng());
        Self::with_dice(store, feedback, config, Box::new(dice))
    }

    /// Creates a controller drawing randomness from `dice`.
    #[instrument(skip_all)]
    pub fn with_dice(
        store: Arc<dyn SettingsStore>,
        feedback: Arc<dyn FeedbackSink>,
        config: ControllerConfig,
        dice: Box<dyn Dice + Send>,
    ) -> Result<Self, ControllerError> {
        let runtime = Handle::try_current()
            .map_err(|e| ControllerError::new(format!("No tokio runtime: {}", e)))?;
        let settings = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load settings, using defaults");
            Settings::default()
        });
        let state = settings.initial_state();
        info!(opponent = %state.opponent(), score = ?state.score(), "Controller ready");

        let (tx, _) = watch::channel(state.clone());
        let shared = Shared {
            inner: Mutex::new(Inner {
                state,
                epoch: 0,
                dice,
                timer: None,
                ai_task: None,
            }),
            tx,
            store,
            feedback,
            config,
            runtime,
        };
        Ok(Self {
            shared: Arc::new(shared),
        })
    }

    /// Current snapshot.
    pub fn state(&self) -> GameState {
        self.lock().state.clone()
    }

    /// Receiver that sees every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.shared.tx.subscribe()
    }

    /// Human move. Rejected moves leave the game untouched.
    #[instrument(skip(self))]
    pub fn make_move(&self, index: usize) -> Result<(), MoveError> {
        let changed = {
            let mut guard = self.lock();
            let inner = &mut *guard;
            match engine::apply_move(&inner.state, index, MoveSource::Human, inner.dice.as_mut()) {
                Ok(next) => {
                    info!(index, player = %inner.state.current_player(), "Move accepted");
                    self.accept(inner, next)
                }
                Err(e) => {
                    debug!(index, error = %e, "Move rejected");
                    return Err(e);
                }
            }
        };
        self.persist_if(changed);
        Ok(())
    }

    /// New game with the given geometry.
    #[instrument(skip(self))]
    pub fn reset_game(&self, config: BoardConfig) {
        self.restart_with(|state, dice| engine::reset(state, config, dice));
    }

    /// New game with the current geometry.
    #[instrument(skip(self))]
    pub fn restart(&self) {
        self.restart_with(engine::restart);
    }

    /// Switches the rule variant and starts over.
    #[instrument(skip(self))]
    pub fn set_mode(&self, mode: GameMode) {
        self.restart_with(|state, dice| engine::with_mode(state, mode, dice));
    }

    /// Changes who plays O and starts over.
    #[instrument(skip(self))]
    pub fn set_opponent(&self, opponent: OpponentType) {
        self.restart_with(|state, dice| engine::with_opponent(state, opponent, dice));
        self.persist(&Settings::from_state(&self.state()));
    }

    /// Turns sound cues on or off.
    #[instrument(skip(self))]
    pub fn set_sound(&self, enabled: bool) {
        self.update_settings(|state| engine::with_sound(state, enabled));
    }

    /// Turns vibration cues on or off.
    #[instrument(skip(self))]
    pub fn set_haptics(&self, enabled: bool) {
        self.update_settings(|state| engine::with_haptics(state, enabled));
    }

    /// Zeroes the scoreboard.
    #[instrument(skip(self))]
    pub fn reset_stats(&self) {
        self.update_settings(engine::reset_stats);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn update_settings(&self, change: impl FnOnce(&GameState) -> GameState) {
        let snapshot = {
            let mut guard = self.lock();
            let next = change(&guard.state);
            self.publish(&mut guard, next);
            Settings::from_state(&guard.state)
        };
        self.persist(&snapshot);
    }

    fn restart_with(&self, start: impl FnOnce(&GameState, &mut dyn Dice) -> GameState) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        cancel_tasks(inner);
        inner.epoch += 1;
        let next = start(&inner.state, inner.dice.as_mut());
        info!(mode = %next.mode(), grid_size = next.grid_size(), epoch = inner.epoch, "New game");
        self.publish(inner, next);
        self.schedule(inner);
    }

    /// Installs an accepted transition and schedules what follows it.
    ///
    /// Returns the settings to save when the score moved. Callers save them
    /// after releasing the lock.
    fn accept(&self, inner: &mut Inner, next: GameState) -> Option<Settings> {
        cancel_tasks(inner);
        inner.epoch += 1;
        let score_changed = next.score() != inner.state.score();
        if next.is_terminal() {
            info!(winner = ?next.winner(), draw = next.is_draw(), score = ?next.score(), "Game over");
        }
        self.publish(inner, next);
        self.schedule(inner);
        score_changed.then(|| Settings::from_state(&inner.state))
    }

    /// Dispatches any pending cue and sends the snapshot to subscribers.
    fn publish(&self, inner: &mut Inner, next: GameState) {
        let next = match next.sound_event() {
            Some(event) => {
                let cue = Cue::for_event(event, next.sound_enabled(), next.haptics_enabled());
                if !cue.is_empty() {
                    self.shared.feedback.play(event, &cue);
                }
                engine::consume_sound(&next)
            }
            None => next,
        };
        inner.state = next;
        self.shared.tx.send_replace(inner.state.clone());
    }

    fn persist(&self, settings: &Settings) {
        if let Err(e) = self.shared.store.save(settings) {
            warn!(error = %e, "Failed to save settings");
        }
    }

    fn persist_if(&self, settings: Option<Settings>) {
        if let Some(settings) = settings {
            self.persist(&settings);
        }
    }

    fn schedule(&self, inner: &mut Inner) {
        let state = &inner.state;
        if state.is_ai_thinking() {
            inner.ai_task = Some(self.spawn_ai(inner.epoch));
        } else if state.mode() == GameMode::Speed && !state.is_terminal() {
            inner.timer = Some(self.spawn_countdown(inner.epoch));
        }
    }

    fn spawn_ai(&self, epoch: u64) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.shared);
        let delay = self.shared.config.ai_delay;
        debug!(epoch, "AI scheduled");
        self.shared.runtime.spawn(async move {
            sleep(delay).await;
            if let Some(controller) = upgrade(&weak) {
                controller.run_ai(epoch);
            }
        })
    }

    fn spawn_countdown(&self, epoch: u64) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.shared);
        let steps = self.shared.config.countdown_steps;
        let step = self.shared.config.step();
        debug!(epoch, "Countdown started");
        self.shared.runtime.spawn(async move {
            for i in 0..=steps {
                let Some(controller) = upgrade(&weak) else {
                    return;
                };
                if !controller.tick(epoch, 1.0 - i as f32 / steps as f32) {
                    return;
                }
                drop(controller);
                sleep(step).await;
            }
            if let Some(controller) = upgrade(&weak) {
                controller.expire(epoch);
            }
        })
    }

    #[instrument(skip(self))]
    fn run_ai(&self, epoch: u64) {
        let changed = {
            let mut guard = self.lock();
            let inner = &mut *guard;
            if inner.epoch != epoch {
                debug!(current = inner.epoch, "Stale AI wake-up ignored");
                return;
            }
            inner.ai_task = None;
            let Some(index) = ai::choose_move(&inner.state, inner.dice.as_mut()) else {
                return;
            };
            match engine::apply_move(&inner.state, index, MoveSource::Ai, inner.dice.as_mut()) {
                Ok(next) => {
                    info!(index, player = %inner.state.current_player(), "AI move accepted");
                    self.accept(inner, next)
                }
                Err(e) => {
                    warn!(index, error = %e, "AI move rejected");
                    None
                }
            }
        };
        self.persist_if(changed);
    }

    /// Publishes a countdown value. Returns false once the countdown is stale.
    fn tick(&self, epoch: u64, time_left: f32) -> bool {
        let mut guard = self.lock();
        if guard.epoch != epoch {
            return false;
        }
        let next = engine::with_time_left(&guard.state, time_left);
        self.publish(&mut guard, next);
        true
    }

    #[instrument(skip(self))]
    fn expire(&self, epoch: u64) {
        let changed = {
            let mut guard = self.lock();
            let inner = &mut *guard;
            if inner.epoch != epoch {
                return;
            }
            // Running inside the timer task: detach instead of aborting ourselves.
            inner.timer = None;
            let next = engine::expire_turn(&inner.state);
            if next == inner.state {
                return;
            }
            info!(player = %inner.state.current_player(), "Turn timed out");
            self.accept(inner, next)
        };
        self.persist_if(changed);
    }
}

fn upgrade(weak: &Weak<Shared>) -> Option<TurnController> {
    weak.upgrade().map(|shared| TurnController { shared })
}

fn cancel_tasks(inner: &mut Inner) {
    if let Some(handle) = inner.timer.take() {
        handle.abort();
    }
    if let Some(handle) = inner.ai_task.take() {
        handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::LogFeedback;
    use crate::settings::MemoryStore;

    #[test]
    fn test_default_timing() {
        let config = ControllerConfig::default();
        assert_eq!(config.step(), Duration::from_millis(30));
        assert_eq!(*config.ai_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_zero_steps_raised() {
        let config = ControllerConfig::new(Duration::from_secs(1), 0, Duration::ZERO);
        assert_eq!(*config.countdown_steps(), 1);
    }

    #[test]
    fn test_requires_runtime() {
        let result = TurnController::new(
            Arc::new(MemoryStore::default()),
            Arc::new(LogFeedback),
            ControllerConfig::default(),
        );
        assert!(result.is_err());
    }

    /// Records, for every save, whether the game lock was free at the time.
    #[derive(Default)]
    struct LockCheckingStore {
        shared: std::sync::OnceLock<Weak<Shared>>,
        saves: Mutex<Vec<bool>>,
    }

    impl SettingsStore for LockCheckingStore {
        fn load(&self) -> Result<Settings, crate::settings::StoreError> {
            Ok(Settings::default())
        }

        fn save(&self, _settings: &Settings) -> Result<(), crate::settings::StoreError> {
            let free = self
                .shared
                .get()
                .and_then(Weak::upgrade)
                .is_some_and(|shared| shared.inner.try_lock().is_ok());
            self.saves.lock().unwrap().push(free);
            Ok(())
        }
    }

    fn watched() -> (TurnController, Arc<LockCheckingStore>) {
        let store = Arc::new(LockCheckingStore::default());
        let game = TurnController::with_dice(
            store.clone(),
            Arc::new(LogFeedback),
            ControllerConfig::default(),
            Box::new(tiktac_rules::ScriptedDice::new()),
        )
        .unwrap();
        store.shared.set(Arc::downgrade(&game.shared)).unwrap();
        (game, store)
    }

    #[tokio::test(start_paused = true)]
    async fn test_saves_happen_outside_the_lock() {
        let (game, store) = watched();
        for index in [0, 3, 1, 4, 2] {
            game.make_move(index).unwrap();
        }
        game.reset_stats();
        assert_eq!(*store.saves.lock().unwrap(), vec![true, true]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ai_win_saved_outside_the_lock() {
        let (game, store) = watched();
        game.set_opponent(OpponentType::AiHard);
        // O takes the centre, blocks at 2, then completes 2-4-6.
        for index in [0, 1, 8] {
            game.make_move(index).unwrap();
            sleep(Duration::from_millis(600)).await;
        }
        let state = game.state();
        assert_eq!(state.winner(), Some(tiktac_rules::Player::O));
        assert_eq!(state.winning_line(), Some(&[2, 4, 6][..]));
        assert_eq!(*store.saves.lock().unwrap(), vec![true, true]);
    }
}
