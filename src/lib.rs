//! Shape Evolution - a polygon matching puzzle
//!
//! Core modules:
//! - `sim`: Shapes, level generation, selection/drag state and batch checks
//! - `stats`: Per-level timing and attempt counters
//! - `settings`: Difficulty profiles and engine configuration
//! - `persistence`: JSON snapshot save/load with validation
//! - `hud`: Status strings and splash lookup for the presentation layer
//! - `console`: Line commands for the headless front-end

pub mod console;
pub mod hud;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod stats;

pub use settings::{Difficulty, Settings, SnapPolicy};
pub use stats::Stats;

use glam::DVec2;

/// Game configuration constants
pub mod consts {
    /// Lives restored on reset
    pub const STARTING_LIVES: i32 = 3;
    /// Pairs per level never exceed this (also caps the batch size)
    pub const MAX_PAIRS: u32 = 5;
    /// Side count of level 1 polygons (grows by one per level)
    pub const BASE_SIDES: u32 = 3;
    pub const MAX_SIDES: u32 = 7;

    /// Scale clamp applied whenever a shape is resized
    pub const MIN_SHAPE_SIZE: u32 = 30;
    pub const MAX_SHAPE_SIZE: u32 = 260;

    /// Hit-test radius relative to shape size (circle around the polygon)
    pub const HIT_RADIUS_FACTOR: f64 = 1.1;
    /// Position errors below this count as exact (anti-jitter)
    pub const POSITION_JITTER: f64 = 1.0;

    /// Default canvas
    pub const DEFAULT_WIDTH: u32 = 1600;
    pub const DEFAULT_HEIGHT: u32 = 900;
    pub const DEFAULT_LEVEL_COUNT: u32 = 5;
    /// Upper bound on levels per run (stats arrays are sized by it)
    pub const MAX_LEVEL_COUNT: u32 = 100;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Minimal circular difference between two angles in degrees, in [0, 180]
#[inline]
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let diff = normalize_degrees(a - b);
    diff.min(360.0 - diff)
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    a.distance(b)
}

/// Convert polar (r, degrees) to cartesian offset (x, y)
///
/// Screen space is y-down, so increasing angles run clockwise on screen.
#[inline]
pub fn polar_to_cartesian(r: f64, degrees: f64) -> DVec2 {
    let theta = degrees.to_radians();
    DVec2::new(r * theta.cos(), r * theta.sin())
}
