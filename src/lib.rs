//! Tower Drop - swing a block on a crane, drop it on the tower
//!
//! Core modules:
//! - `sim`: Deterministic tower assembly engine (pendulum, stack, session)
//! - `tuning`: Data-driven game balance
//! - `profile`: Coins, high score and unlocked skins
//! - `persistence`: Key/value storage backends for saves and settings
//! - `audio`: Maps simulation events to sound cues
//! - `settings`: Player preferences (kept outside the simulation)

pub mod audio;
pub mod persistence;
pub mod profile;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use profile::Profile;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
///
/// These are the defaults behind [`Tuning`]; gameplay code reads the tuning
/// values, never these directly.
pub mod consts {
    /// Fixed simulation rate (one tick per rendered frame)
    pub const SIM_HZ: u32 = 60;

    /// Playfield height (the playfield is 540 wide)
    pub const SCREEN_HEIGHT: f32 = 960.0;
    /// Ground line (bottom edge of the foundation piece)
    pub const GROUND_Y: f32 = SCREEN_HEIGHT;

    /// Piece dimensions
    pub const PIECE_WIDTH: f32 = 63.0;
    pub const PIECE_HEIGHT: f32 = 63.0;

    /// Crane rope and hook geometry
    pub const ROPE_LENGTH: f32 = 305.0;
    pub const ROPE_ANCHOR_X: f32 = 252.0;
    pub const ROPE_ANCHOR_Y: f32 = 118.0;
    /// Piece hangs centered under the hook
    pub const HOOK_ATTACH_OFFSET_X: f32 = PIECE_WIDTH / 2.0;
    pub const HOOK_ATTACH_OFFSET_Y: f32 = 10.0;
    /// Starting swing angle magnitude (radians)
    pub const SWING_START_ANGLE: f32 = 0.8;

    /// Physics (units per tick)
    pub const GRAVITY: f32 = 0.4;
    pub const INITIAL_FORCE: f32 = -0.001;
    /// Swing force growth per successful placement (+1.5%)
    pub const FORCE_GROWTH: f32 = 1.015;

    /// Alignment tolerances
    pub const COLLISION_HALF_WIDTH: f32 = PIECE_WIDTH / 2.0;
    pub const GOLDEN_TOLERANCE: f32 = PIECE_WIDTH / 12.0;
    /// Per-tick overshoot past the stack top still accepted as a landing
    pub const LANDING_TOLERANCE: f32 = 55.0;

    /// Collapse rules
    pub const COLLAPSE_OFFSET_FRACTION: f32 = 0.5;
    pub const WIDTH_OVERRUN_LIMIT: f32 = 140.0;

    /// Tower wobble
    pub const WOBBLE_WIDTH_THRESHOLD: f32 = 100.0;
    pub const WOBBLE_MIN_SIZE: usize = 5;
    pub const WOBBLE_SIZE_THRESHOLD: usize = 20;
    pub const WOBBLE_SPEED: f32 = 0.5;
    pub const WOBBLE_LIMIT: f32 = 10.0;

    /// Session limits
    pub const MAX_MISSES: u32 = 3;

    /// Viewport windowing: at this many pieces the tower is cut back
    pub const TRUNCATION_MILESTONE: usize = 8;
    /// Pieces kept after a cut
    pub const VISIBLE_AFTER_TRUNCATION: usize = 4;
    /// Background scroll animation after a cut
    pub const SCROLL_DURATION_TICKS: u32 = 30;
    pub const SCROLL_STEP: f32 = PIECE_HEIGHT * 2.0;

    /// Rewards
    pub const SCORE_NORMAL: u64 = 1;
    pub const SCORE_GOLDEN: u64 = 2;
    pub const COINS_NORMAL: u64 = 5;
    pub const COINS_GOLDEN: u64 = 10;

    /// Demo player aim jitter (units either side of the target)
    pub const AUTOPILOT_AIM_SPREAD: f32 = 6.0;
}
