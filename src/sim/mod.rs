//! Deterministic tower assembly engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one tick per frame)
//! - Seeded RNG only
//! - No rendering, audio or storage dependencies

pub mod alignment;
pub mod piece;
pub mod snapshot;
pub mod stack;
pub mod state;
pub mod tick;

pub use alignment::{Alignment, alignment_test};
pub use piece::{Piece, PieceState, VisualVariant};
pub use snapshot::{PieceSnapshot, Snapshot, StackEntry};
pub use stack::{CollapseReason, Stack};
pub use state::{GameEvent, GameOverReason, GamePhase, GameState, ScrollAnimation};
pub use tick::{TickInput, tick};
