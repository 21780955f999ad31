//! Puzzle engine
//!
//! All gameplay logic lives here:
//! - Shapes and their hit-testing
//! - Level generation from an injectable RNG
//! - Selection, drag, rotate and scale input
//! - Batch alignment checks, lives and level progression
//!
//! No rendering or platform dependencies.

pub mod alignment;
pub mod generate;
pub mod shape;
pub mod state;

pub use alignment::{Alignment, CheckOutcome, CheckStatus, Tolerance};
pub use generate::{
    LevelLayout, MIN_CENTER_SPACING, PLACEMENT_ATTEMPTS, generate_level, pair_count,
    sample_centers, sides_for_level,
};
pub use shape::{ACTIVE_COLOR, Shape, ShapeError, ShapeRecord, ShapeRole, TARGET_COLOR};
pub use state::{Game, GamePhase};
