//! The active piece: pendulum swing on the crane rope, then free fall
//!
//! Position is derived from the rope angle while swinging and integrated
//! vertically once dropped. Landing is decided against the stack each tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::alignment::{Alignment, alignment_test};
use super::stack::Stack;
use crate::tuning::Tuning;

/// Number of cyclic middle-piece sprites
pub const MIDDLE_VARIANTS: u8 = 4;

/// Piece lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceState {
    /// Hanging from the crane, waiting for the drop command
    Swinging,
    /// Released, falling straight down
    Falling,
    /// Resting on the stack (or ground, for the foundation)
    Landed,
    /// Fell past the stack top without overlapping it
    Missed,
    /// Landed too far off and is toppling off the tower
    Collapsing,
    /// Outcome consumed; the session will replace this piece
    AwaitingRespawn,
}

impl PieceState {
    /// Landed / Missed / Collapsing: the drop has been decided
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PieceState::Landed | PieceState::Missed | PieceState::Collapsing
        )
    }
}

/// Rendering hint derived from a piece's position in the tower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualVariant {
    /// The bottom piece
    Foundation,
    /// One of the cyclic middle sprites (0..MIDDLE_VARIANTS)
    Middle(u8),
}

impl VisualVariant {
    pub fn for_sequence(sequence_number: u32) -> Self {
        if sequence_number == 0 {
            VisualVariant::Foundation
        } else {
            VisualVariant::Middle(((sequence_number - 1) % MIDDLE_VARIANTS as u32) as u8)
        }
    }
}

/// The single piece the player controls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Piece {
    /// Index this piece will occupy in the stack
    pub sequence_number: u32,
    /// Top-left corner
    pub pos: Vec2,
    /// Rope angle (radians, 0 = hanging straight down)
    pub angle: f32,
    pub angular_vel: f32,
    pub fall_vel: f32,
    pub state: PieceState,
    /// x at the moment of release; never changes afterwards
    committed_x: Option<f32>,
    /// Result of the landing test, if one was run
    pub alignment: Option<Alignment>,
    pub variant: VisualVariant,
}

impl Piece {
    /// Spawn a piece for the given stack size, swinging from the alternate side
    pub fn spawn(stack_len: usize, tuning: &Tuning) -> Self {
        let angle = if stack_len % 2 == 0 {
            -tuning.swing_start_angle
        } else {
            tuning.swing_start_angle
        };
        let sequence_number = stack_len as u32;
        let mut piece = Self {
            sequence_number,
            pos: Vec2::ZERO,
            angle,
            angular_vel: 0.0,
            fall_vel: 0.0,
            state: PieceState::Swinging,
            committed_x: None,
            alignment: None,
            variant: VisualVariant::for_sequence(sequence_number),
        };
        piece.pos = piece.rope_position(tuning);
        piece
    }

    pub fn committed_x(&self) -> Option<f32> {
        self.committed_x
    }

    /// Bottom edge
    #[inline]
    pub fn bottom(&self, tuning: &Tuning) -> f32 {
        self.pos.y + tuning.piece_height
    }

    /// Top-left corner for the current rope angle
    pub fn rope_position(&self, tuning: &Tuning) -> Vec2 {
        Vec2::new(
            tuning.anchor_x + tuning.rope_length * self.angle.sin() - tuning.attach_offset_x,
            tuning.anchor_y + tuning.rope_length * self.angle.cos() + tuning.attach_offset_y,
        )
    }

    /// Point where the rope meets the hook
    pub fn rope_end(&self, tuning: &Tuning) -> Vec2 {
        Vec2::new(
            tuning.anchor_x + tuning.rope_length * self.angle.sin(),
            tuning.anchor_y + tuning.rope_length * self.angle.cos(),
        )
    }

    /// Advance the pendulum one tick (`swing_force` is negative)
    pub fn swing(&mut self, swing_force: f32, tuning: &Tuning) {
        if self.state != PieceState::Swinging {
            return;
        }
        let angular_acc = self.angle.sin() * swing_force;
        self.angular_vel += angular_acc;
        self.angle += self.angular_vel;
        self.pos = self.rope_position(tuning);
    }

    /// Release the piece. Returns false (and does nothing) unless swinging.
    pub fn release(&mut self) -> bool {
        if self.state != PieceState::Swinging {
            return false;
        }
        self.committed_x = Some(self.pos.x);
        self.angle = 0.0;
        self.angular_vel = 0.0;
        self.fall_vel = 0.0;
        self.state = PieceState::Falling;
        true
    }

    /// Advance free fall one tick and decide landing against the stack
    pub fn fall(&mut self, stack: &Stack, tuning: &Tuning) {
        if self.state != PieceState::Falling {
            return;
        }
        let Some(committed_x) = self.committed_x else {
            return;
        };

        self.fall_vel += tuning.gravity;
        let next_y = self.pos.y + self.fall_vel;
        let contact_y = stack.top_y() - tuning.piece_height;

        if next_y < contact_y {
            self.pos.y = next_y;
            return;
        }

        if stack.is_empty() {
            // Foundation always lands
            self.pos.y = contact_y;
            self.state = PieceState::Landed;
            return;
        }

        // Negative: how far this tick's step carried the bottom edge past the top
        let vertical_gap = stack.top_y() - (next_y + tuning.piece_height);
        let result = alignment_test(committed_x, stack.top_offset(), vertical_gap, tuning);
        self.alignment = Some(result);
        if result.collided {
            self.pos.y = contact_y;
            self.state = PieceState::Landed;
        } else {
            self.pos.y = next_y;
            self.state = PieceState::Missed;
        }
    }

    /// Golden flag of a landed piece (false for the foundation)
    pub fn golden(&self) -> bool {
        self.alignment.map(|a| a.golden).unwrap_or(false)
    }

    /// Mark as toppling off the tower after an offset collapse
    pub fn topple(&mut self) {
        self.state = PieceState::Collapsing;
    }

    /// Outcome consumed by the session
    pub fn retire(&mut self) {
        if self.state.is_terminal() {
            self.state = PieceState::AwaitingRespawn;
        }
    }
}
