//! Read-only view of the simulation for renderers and HUDs

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::piece::{PieceState, VisualVariant};
use super::state::{GameOverReason, GamePhase, GameState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub pos: Vec2,
    pub angle: f32,
    pub state: PieceState,
    pub variant: VisualVariant,
    /// Rope from the crane anchor to the hook; `None` once released
    pub rope: Option<(Vec2, Vec2)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackEntry {
    /// Placement offset (no wobble)
    pub offset: f32,
    /// Where to draw it (wobble applied)
    pub render_x: f32,
    /// Top edge
    pub y: f32,
    pub variant: VisualVariant,
    pub golden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub piece: PieceSnapshot,
    /// Bottom to top
    pub stack: Vec<StackEntry>,
    pub wobble_offset: f32,
    pub stack_top_y: f32,
    pub unstable: bool,
    pub score: u64,
    pub misses: u32,
    pub max_misses: u32,
    pub speed_multiplier: f32,
    pub phase: GamePhase,
    pub over_reason: Option<GameOverReason>,
    pub scroll_offset: f32,
    pub skin_id: u8,
}

impl Snapshot {
    pub fn playable(&self) -> bool {
        self.phase == GamePhase::Playing
    }
}

impl GameState {
    /// Capture everything a renderer needs for this frame
    pub fn snapshot(&self) -> Snapshot {
        let tuning = &self.tuning;
        let stack = &self.stack;

        let entries = (0..stack.len())
            .map(|i| StackEntry {
                offset: stack.offsets()[i],
                render_x: stack.render_x(i),
                y: tuning.ground_y - (i as f32 + 1.0) * tuning.piece_height,
                variant: stack.variants()[i],
                golden: stack.golden_flags()[i],
            })
            .collect();

        let rope = (self.piece.state == PieceState::Swinging).then(|| {
            (
                Vec2::new(tuning.anchor_x, tuning.anchor_y),
                self.piece.rope_end(tuning),
            )
        });

        Snapshot {
            tick: self.time_ticks,
            piece: PieceSnapshot {
                pos: self.piece.pos,
                angle: self.piece.angle,
                state: self.piece.state,
                variant: self.piece.variant,
                rope,
            },
            stack: entries,
            wobble_offset: stack.wobble_offset,
            stack_top_y: stack.top_y(),
            unstable: stack.is_unstable(),
            score: self.score,
            misses: self.misses,
            max_misses: tuning.max_misses,
            speed_multiplier: self.speed_multiplier,
            phase: self.phase,
            over_reason: self.over_reason,
            scroll_offset: self.scroll_offset,
            skin_id: self.skin_id,
        }
    }
}
