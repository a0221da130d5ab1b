//! Data-driven game balance
//!
//! Every numeric rule of the tower engine reads from a [`Tuning`]. Defaults
//! come from [`crate::consts`]; a JSON file may override any subset.

use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunable constants, fixed for the lifetime of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Geometry ===
    pub piece_width: f32,
    pub piece_height: f32,
    pub rope_length: f32,
    pub anchor_x: f32,
    pub anchor_y: f32,
    pub attach_offset_x: f32,
    pub attach_offset_y: f32,
    pub ground_y: f32,
    pub swing_start_angle: f32,

    // === Physics ===
    pub gravity: f32,
    /// Restoring force at multiplier 1.0 (negative)
    pub initial_swing_force: f32,
    /// Multiplier growth per successful placement
    pub force_growth: f32,

    // === Alignment ===
    pub collision_half_width: f32,
    pub golden_tolerance: f32,
    pub landing_tolerance: f32,

    // === Failure rules ===
    /// Fraction of piece width two consecutive pieces may drift apart
    pub collapse_offset_fraction: f32,
    pub width_overrun_limit: f32,
    pub max_misses: u32,

    // === Wobble ===
    pub wobble_width_threshold: f32,
    pub wobble_min_size: usize,
    pub wobble_size_threshold: usize,
    pub wobble_speed: f32,
    pub wobble_limit: f32,

    // === Viewport windowing ===
    pub truncation_milestone: usize,
    pub visible_after_truncation: usize,
    pub scroll_duration_ticks: u32,
    pub scroll_step: f32,

    // === Rewards ===
    pub score_normal: u64,
    pub score_golden: u64,
    pub coins_normal: u64,
    pub coins_golden: u64,

    pub autopilot_aim_spread: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            piece_width: PIECE_WIDTH,
            piece_height: PIECE_HEIGHT,
            rope_length: ROPE_LENGTH,
            anchor_x: ROPE_ANCHOR_X,
            anchor_y: ROPE_ANCHOR_Y,
            attach_offset_x: HOOK_ATTACH_OFFSET_X,
            attach_offset_y: HOOK_ATTACH_OFFSET_Y,
            ground_y: GROUND_Y,
            swing_start_angle: SWING_START_ANGLE,

            gravity: GRAVITY,
            initial_swing_force: INITIAL_FORCE,
            force_growth: FORCE_GROWTH,

            collision_half_width: COLLISION_HALF_WIDTH,
            golden_tolerance: GOLDEN_TOLERANCE,
            landing_tolerance: LANDING_TOLERANCE,

            collapse_offset_fraction: COLLAPSE_OFFSET_FRACTION,
            width_overrun_limit: WIDTH_OVERRUN_LIMIT,
            max_misses: MAX_MISSES,

            wobble_width_threshold: WOBBLE_WIDTH_THRESHOLD,
            wobble_min_size: WOBBLE_MIN_SIZE,
            wobble_size_threshold: WOBBLE_SIZE_THRESHOLD,
            wobble_speed: WOBBLE_SPEED,
            wobble_limit: WOBBLE_LIMIT,

            truncation_milestone: TRUNCATION_MILESTONE,
            visible_after_truncation: VISIBLE_AFTER_TRUNCATION,
            scroll_duration_ticks: SCROLL_DURATION_TICKS,
            scroll_step: SCROLL_STEP,

            score_normal: SCORE_NORMAL,
            score_golden: SCORE_GOLDEN,
            coins_normal: COINS_NORMAL,
            coins_golden: COINS_GOLDEN,

            autopilot_aim_spread: AUTOPILOT_AIM_SPREAD,
        }
    }
}

impl Tuning {
    /// Horizontal drift between consecutive pieces that topples the tower
    #[inline]
    pub fn collapse_offset(&self) -> f32 {
        self.piece_width * self.collapse_offset_fraction
    }

    /// Swing force for a given difficulty multiplier
    #[inline]
    pub fn swing_force(&self, multiplier: f32) -> f32 {
        self.initial_swing_force * multiplier
    }

    /// Parse a (possibly partial) tuning document and validate it
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let tuning: Tuning = serde_json::from_str(json).context("invalid tuning JSON")?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning overrides from a JSON file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading tuning file {}", path.display()))?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.piece_width <= 0.0 || self.piece_height <= 0.0 {
            bail!("piece dimensions must be positive");
        }
        if self.rope_length <= 0.0 {
            bail!("rope_length must be positive");
        }
        if self.gravity <= 0.0 {
            bail!("gravity must be positive");
        }
        if self.initial_swing_force >= 0.0 {
            bail!("initial_swing_force must be negative (restoring)");
        }
        if self.force_growth < 1.0 {
            bail!("force_growth must be >= 1.0");
        }
        if self.golden_tolerance > self.collision_half_width {
            bail!("golden_tolerance cannot exceed collision_half_width");
        }
        if self.landing_tolerance < 0.0 {
            bail!("landing_tolerance must be non-negative");
        }
        if self.max_misses == 0 {
            bail!("max_misses must be at least 1");
        }
        if self.visible_after_truncation == 0
            || self.visible_after_truncation >= self.truncation_milestone
        {
            bail!(
                "visible_after_truncation ({}) must be in 1..truncation_milestone ({})",
                self.visible_after_truncation,
                self.truncation_milestone
            );
        }
        if self.scroll_duration_ticks == 0 {
            bail!("scroll_duration_ticks must be at least 1");
        }
        if self.wobble_speed < 0.0 || self.wobble_limit < 0.0 {
            bail!("wobble speed and limit must be non-negative");
        }
        Ok(())
    }
}
