//! Alignment test between a falling piece and the top of the stack
//!
//! Pure: it only reports what happened. The stack and session decide what
//! to do with a hit (build, score, golden bonus).

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Result of an alignment check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    /// Whether the piece rests on the stack top
    pub collided: bool,
    /// Perfect placement (only ever true when `collided`)
    pub golden: bool,
    /// Signed horizontal offset from the top piece (piece - top)
    pub delta: f32,
}

impl Alignment {
    pub fn miss(delta: f32) -> Self {
        Self {
            collided: false,
            golden: false,
            delta,
        }
    }
}

/// Check whether a dropped piece lands on the stack top
///
/// - `committed_x`: the piece's x, frozen at drop time
/// - `top_offset`: the x of the stack's most recent piece
/// - `vertical_gap`: stack top edge minus piece bottom edge (positive = above)
///
/// Horizontal overlap uses strict inequalities: a delta of exactly
/// `collision_half_width` misses, and a delta of exactly `golden_tolerance`
/// is not golden.
pub fn alignment_test(
    committed_x: f32,
    top_offset: f32,
    vertical_gap: f32,
    tuning: &Tuning,
) -> Alignment {
    let delta = committed_x - top_offset;

    let horizontal = delta.abs() < tuning.collision_half_width;
    let vertical = vertical_gap.abs() <= tuning.landing_tolerance;

    if !(horizontal && vertical) {
        return Alignment::miss(delta);
    }

    Alignment {
        collided: true,
        golden: delta.abs() < tuning.golden_tolerance,
        delta,
    }
}
