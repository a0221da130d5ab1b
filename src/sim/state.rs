//! Session state and core simulation types
//!
//! Everything a running game needs lives in [`GameState`]; it serializes so a
//! session can be snapshotted or compared across runs.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::piece::Piece;
use super::stack::{CollapseReason, Stack};
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Run ended; only a new session resumes play
    GameOver,
}

/// Why the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    TooManyMisses,
    Collapse,
}

/// One-shot notifications for audio, effects and persistence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A piece was added to the tower
    Placed { golden: bool, sequence: u32 },
    /// A piece fell past the tower
    Missed { misses: u32 },
    /// The tower fell
    Collapsed { reason: CollapseReason },
    /// Old pieces were dropped from the bottom of the tower
    Truncated { removed: usize },
    GameOver {
        reason: GameOverReason,
        score: u64,
        coins: u64,
    },
    /// Final score beat the stored best
    NewHighScore { score: u64 },
}

/// Background scroll that follows a truncation
///
/// Linear interpolation driven by a tick counter. Cannot be cancelled once
/// started.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollAnimation {
    pub progress: u32,
    pub duration: u32,
    pub from: f32,
    pub to: f32,
}

impl ScrollAnimation {
    pub fn new(from: f32, to: f32, duration: u32) -> Self {
        Self {
            progress: 0,
            duration: duration.max(1),
            from,
            to,
        }
    }

    /// Advance one tick; returns the interpolated offset
    pub fn advance(&mut self) -> f32 {
        self.progress = (self.progress + 1).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> f32 {
        let t = self.progress as f32 / self.duration as f32;
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self) -> bool {
        self.progress >= self.duration
    }
}

/// RNG state wrapper for serialization
///
/// Each draw site asks for a fresh generator on its own stream so results do
/// not depend on how many numbers earlier sites consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = Pcg32::new(self.seed, self.stream);
        self.stream += 1;
        rng
    }
}

/// Demo player bookkeeping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Autopilot {
    /// Target x for the current piece
    pub aim: Option<f32>,
    /// Signed distance to the aim on the previous tick
    pub last_error: Option<f32>,
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub tuning: Tuning,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    pub piece: Piece,
    pub stack: Stack,
    pub score: u64,
    pub misses: u32,
    /// Swing force multiplier; grows with every placement
    pub speed_multiplier: f32,
    pub phase: GamePhase,
    pub over_reason: Option<GameOverReason>,
    /// Currency earned this run (reported on game over)
    pub coins_earned: u64,
    /// Successful placements this run (not reduced by truncation)
    pub placed: u32,
    /// Stored high score at session start
    pub best_score: u64,
    /// Selected tower skin (rendering only)
    pub skin_id: u8,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub scroll: Option<ScrollAnimation>,
    /// Accumulated background scroll
    pub scroll_offset: f32,
    pub autopilot: Autopilot,
    /// Pending notifications, drained by the host
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new session with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        debug_assert!(tuning.validate().is_ok(), "invalid tuning");
        let stack = Stack::new(&tuning);
        let piece = Piece::spawn(stack.len(), &tuning);
        Self {
            seed,
            rng_state: RngState::new(seed),
            piece,
            stack,
            score: 0,
            misses: 0,
            speed_multiplier: 1.0,
            phase: GamePhase::Playing,
            over_reason: None,
            coins_earned: 0,
            placed: 0,
            best_score: 0,
            skin_id: 1,
            time_ticks: 0,
            scroll: None,
            scroll_offset: 0.0,
            autopilot: Autopilot::default(),
            events: Vec::new(),
            tuning,
        }
    }

    /// Carry profile data into the session (high score to beat, skin)
    pub fn with_profile(mut self, best_score: u64, skin_id: u8) -> Self {
        self.best_score = best_score;
        self.skin_id = skin_id;
        self
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Current pendulum force (negative)
    pub fn swing_force(&self) -> f32 {
        self.tuning.swing_force(self.speed_multiplier)
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_some()
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Replace the retired piece with a fresh one sized to the stack
    pub(crate) fn respawn(&mut self) {
        self.piece = Piece::spawn(self.stack.len(), &self.tuning);
        self.autopilot = Autopilot::default();
    }

    /// Enter the terminal phase and report the result (first call wins)
    pub(crate) fn end_game(&mut self, reason: GameOverReason) {
        if self.is_over() {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.over_reason = Some(reason);
        log::info!(
            "Game over ({:?}): score {}, placed {}, coins {}",
            reason,
            self.score,
            self.placed,
            self.coins_earned
        );
        self.emit(GameEvent::GameOver {
            reason,
            score: self.score,
            coins: self.coins_earned,
        });
        if self.score > self.best_score {
            self.emit(GameEvent::NewHighScore { score: self.score });
        }
    }
}
