//! Level generation
//!
//! Places `min(level, 5)` target/active pairs on the canvas. Centers come from
//! bounded rejection sampling; each active shape is a perturbed copy of its
//! target.

use std::ops::RangeInclusive;

use glam::DVec2;
use rand::Rng;

use super::shape::{Shape, ShapeRole};
use crate::consts::*;
use crate::distance;

/// Rejection sampling tries per center before settling for the last sample
pub const PLACEMENT_ATTEMPTS: u32 = 200;
/// Minimum distance between accepted centers in one level
pub const MIN_CENTER_SPACING: f64 = 140.0;
/// Keep-out margins from the canvas edges
pub const MARGIN_X: u32 = 220;
pub const MARGIN_Y: u32 = 160;

pub const TARGET_SIZE: RangeInclusive<u32> = 100..=150;
/// Active shape displacement from its target
pub const OFFSET_X: i64 = 180;
pub const OFFSET_Y: i64 = 140;
pub const SIZE_JITTER: RangeInclusive<f64> = 0.75..=1.25;
pub const ROTATION_JITTER: i64 = 70;

/// Shapes for one level, index-aligned
#[derive(Debug, Clone, Default)]
pub struct LevelLayout {
    pub active: Vec<Shape>,
    pub target: Vec<Shape>,
}

pub fn pair_count(level: u32) -> u32 {
    level.clamp(1, MAX_PAIRS)
}

pub fn sides_for_level(level: u32) -> u32 {
    (BASE_SIDES + level.saturating_sub(1)).min(MAX_SIDES)
}

/// Allowed coordinates along one axis; collapses to the middle when the
/// canvas is smaller than both margins
fn axis_range(extent: u32, margin: u32) -> RangeInclusive<i64> {
    let (extent, margin) = (extent as i64, margin as i64);
    if extent >= 2 * margin {
        margin..=extent - margin
    } else {
        let mid = extent / 2;
        mid..=mid
    }
}

/// Sample `count` centers at least [`MIN_CENTER_SPACING`] apart (best effort)
pub fn sample_centers<R: Rng + ?Sized>(
    rng: &mut R,
    count: u32,
    width: u32,
    height: u32,
) -> Vec<DVec2> {
    let xs = axis_range(width, MARGIN_X);
    let ys = axis_range(height, MARGIN_Y);
    let mut centers: Vec<DVec2> = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let mut candidate = DVec2::ZERO;
        let mut placed = false;
        for _ in 0..PLACEMENT_ATTEMPTS {
            candidate = DVec2::new(
                rng.random_range(xs.clone()) as f64,
                rng.random_range(ys.clone()) as f64,
            );
            if centers
                .iter()
                .all(|c| distance(*c, candidate) >= MIN_CENTER_SPACING)
            {
                placed = true;
                break;
            }
        }
        if !placed {
            log::debug!(
                "No free spot after {} tries, overlapping at ({}, {})",
                PLACEMENT_ATTEMPTS,
                candidate.x,
                candidate.y
            );
        }
        centers.push(candidate);
    }
    centers
}

/// Build all pairs for `level` on a `width` x `height` canvas
pub fn generate_level<R: Rng + ?Sized>(
    rng: &mut R,
    level: u32,
    width: u32,
    height: u32,
) -> LevelLayout {
    let sides = sides_for_level(level);
    let centers = sample_centers(rng, pair_count(level), width, height);
    let mut layout = LevelLayout {
        active: Vec::with_capacity(centers.len()),
        target: Vec::with_capacity(centers.len()),
    };

    for center in centers {
        let size = rng.random_range(TARGET_SIZE);
        let rotation = rng.random_range(0..360u32) as f64;
        let target = Shape::new(center, size, rotation, sides, ShapeRole::Target);

        let offset = DVec2::new(
            rng.random_range(-OFFSET_X..=OFFSET_X) as f64,
            rng.random_range(-OFFSET_Y..=OFFSET_Y) as f64,
        );
        let active_size = (size as f64 * rng.random_range(SIZE_JITTER)).round() as u32;
        let active_rotation =
            rotation + rng.random_range(-ROTATION_JITTER..=ROTATION_JITTER) as f64;
        let active = Shape::new(
            center + offset,
            active_size,
            active_rotation,
            sides,
            ShapeRole::Active,
        );

        layout.target.push(target);
        layout.active.push(active);
    }

    log::info!(
        "Level {}: {} pairs of {}-gons on {}x{}",
        level,
        layout.target.len(),
        sides,
        width,
        height
    );
    layout
}
