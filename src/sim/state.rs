//! Game state and the input-driven engine
//!
//! The engine owns both shape lists, the selection and the drag. Every
//! operation runs to completion on one input event; the presentation layer
//! re-reads the shape lists afterwards.

use std::collections::BTreeSet;

use glam::DVec2;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;

use super::generate::{LevelLayout, generate_level};
use super::shape::Shape;
use crate::consts::*;
use crate::distance;
use crate::settings::{Difficulty, Settings, SnapPolicy};
use crate::stats::Stats;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Constructed, no level generated yet
    Idle,
    /// Pairs remain to be matched
    LevelActive,
    /// Every pair of the level matched, waiting for `next_level`
    LevelClearing,
    /// Final level cleared
    Completed,
    /// Out of lives; only `reset` or a load leaves this phase
    GameOver,
}

/// An in-progress pointer drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Drag {
    pub index: usize,
    /// Pointer position relative to the shape center at grab time
    pub grab_offset: DVec2,
}

/// The level/match engine
///
/// Generic over the random source so tests can inject a fixed one.
#[derive(Debug)]
pub struct Game<R = Pcg32> {
    pub(crate) settings: Settings,
    pub(crate) level: u32,
    pub(crate) lives: i32,
    pub(crate) phase: GamePhase,
    /// Player shapes, index-aligned with `target`
    pub(crate) active: Vec<Shape>,
    pub(crate) target: Vec<Shape>,
    pub(crate) selected: BTreeSet<usize>,
    pub(crate) focus: Option<usize>,
    pub(crate) drag: Option<Drag>,
    pub(crate) stats: Stats,
    /// Actual canvas size reported by the presentation layer
    canvas: (u32, u32),
    rng: R,
}

impl Game<Pcg32> {
    /// Create an engine seeded from system entropy
    pub fn new(settings: Settings) -> Self {
        let rng = Pcg32::from_rng(&mut rand::rng());
        Self::with_rng(settings, rng)
    }

    /// Create an engine with a reproducible seed
    pub fn seeded(settings: Settings, seed: u64) -> Self {
        Self::with_rng(settings, Pcg32::seed_from_u64(seed))
    }
}

impl<R: RngCore> Game<R> {
    pub fn with_rng(mut settings: Settings, rng: R) -> Self {
        settings.level_count = settings.level_count.clamp(1, MAX_LEVEL_COUNT);
        let stats = Stats::new(settings.level_count);
        Self {
            settings,
            level: 1,
            lives: STARTING_LIVES,
            phase: GamePhase::Idle,
            active: Vec::new(),
            target: Vec::new(),
            selected: BTreeSet::new(),
            focus: None,
            drag: None,
            stats,
            canvas: (0, 0),
            rng,
        }
    }

    // === Accessors ===

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn level_count(&self) -> u32 {
        self.settings.level_count
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn player_name(&self) -> &str {
        &self.settings.player_name
    }

    pub fn set_player_name(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.settings.player_name = name.to_string();
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.settings.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.settings.difficulty = difficulty;
        log::info!(
            "Difficulty {} (snap radius {})",
            difficulty.as_str(),
            difficulty.snap_radius()
        );
    }

    pub fn snap_radius(&self) -> f64 {
        self.settings.difficulty.snap_radius()
    }

    pub fn set_snap_policy(&mut self, policy: SnapPolicy) {
        self.settings.snap_policy = policy;
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn active_shapes(&self) -> &[Shape] {
        &self.active
    }

    pub fn target_shapes(&self) -> &[Shape] {
        &self.target
    }

    pub fn selected_indices(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    pub fn focus_index(&self) -> Option<usize> {
        self.focus
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_level_cleared(&self) -> bool {
        self.active.is_empty()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Number of shapes that must be selected together for a check
    pub fn required_batch(&self) -> usize {
        let remaining = self.active.len().max(1);
        (self.level.min(MAX_PAIRS) as usize).min(remaining).max(1)
    }

    /// Shapes affected by rotate/scale: the selection, else the focused shape
    pub fn highlighted_indices(&self) -> Vec<usize> {
        if !self.selected.is_empty() {
            self.selected.iter().copied().collect()
        } else {
            self.focus
                .filter(|&i| i < self.active.len())
                .into_iter()
                .collect()
        }
    }

    /// Record the real canvas size; generation uses the larger of this and
    /// the configured size
    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.canvas = (width, height);
    }

    fn placement_area(&self) -> (u32, u32) {
        (
            self.settings.width.max(self.canvas.0),
            self.settings.height.max(self.canvas.1),
        )
    }

    // === Level lifecycle ===

    /// Start over at level 1 with full lives
    pub fn reset(&mut self) {
        self.level = 1;
        self.lives = STARTING_LIVES;
        log::info!("Run reset for {}", self.settings.player_name);
        self.new_level();
    }

    /// Regenerate the current level from scratch
    pub fn new_level(&mut self) {
        let (width, height) = self.placement_area();
        let LevelLayout { active, target } =
            generate_level(&mut self.rng, self.level, width, height);
        self.active = active;
        self.target = target;
        self.selected.clear();
        self.focus = None;
        self.drag = None;
        self.stats.start_level(self.level);
        self.phase = if self.lives > 0 {
            GamePhase::LevelActive
        } else {
            GamePhase::GameOver
        };
    }

    /// Advance to the next level; on the last level the run completes instead
    ///
    /// Does nothing until every pair of the current level is matched.
    pub fn next_level(&mut self) -> bool {
        if matches!(self.phase, GamePhase::Idle | GamePhase::GameOver) || !self.active.is_empty() {
            return false;
        }
        if self.level >= self.settings.level_count {
            self.phase = GamePhase::Completed;
            log::info!("Run completed by {}", self.settings.player_name);
            return false;
        }
        self.level += 1;
        self.new_level();
        true
    }

    // === Pointer input ===

    /// Hit-test from the topmost shape down; toggles selection, focuses and
    /// starts dragging the hit shape
    pub fn pointer_down(&mut self, point: DVec2) -> Option<usize> {
        self.drag = None;
        if self.phase == GamePhase::GameOver {
            return None;
        }
        let index = (0..self.active.len())
            .rev()
            .find(|&i| self.active[i].contains(point))?;

        if !self.selected.remove(&index) && self.selected.len() < self.required_batch() {
            self.selected.insert(index);
        }
        self.focus = Some(index);
        self.drag = Some(Drag {
            index,
            grab_offset: point - self.active[index].center(),
        });
        log::debug!(
            "Grabbed shape {} (selected: {:?})",
            index,
            self.selected
        );
        Some(index)
    }

    /// Move the dragged shape with the pointer, keeping the grab offset
    pub fn drag_to(&mut self, point: DVec2) {
        let Some(drag) = self.drag else {
            return;
        };
        let new_center = point - drag.grab_offset;
        if self.settings.snap_policy == SnapPolicy::Drag && self.try_snap(drag.index, new_center) {
            self.drag = None;
            return;
        }
        if let Some(shape) = self.active.get_mut(drag.index) {
            shape.set_center(new_center);
        }
    }

    pub fn pointer_up(&mut self, _point: DVec2) {
        if let Some(drag) = self.drag.take() {
            if self.settings.snap_policy == SnapPolicy::Release {
                if let Some(center) = self.active.get(drag.index).map(Shape::center) {
                    self.try_snap(drag.index, center);
                }
            }
        }
    }

    /// Put shape `index` exactly on its target if `center` is close enough
    fn try_snap(&mut self, index: usize, center: DVec2) -> bool {
        let Some(goal) = self.target.get(index).map(Shape::center) else {
            return false;
        };
        if distance(center, goal) > self.snap_radius() {
            return false;
        }
        if let Some(shape) = self.active.get_mut(index) {
            shape.set_center(goal);
            log::debug!("Snapped shape {} onto its target", index);
        }
        true
    }

    // === Transform input ===

    /// Rotate the selection (or focused shape) by `degrees`
    pub fn rotate_active(&mut self, degrees: f64) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        for i in self.highlighted_indices() {
            if let Some(shape) = self.active.get_mut(i) {
                shape.rotate_by(degrees);
            }
        }
    }

    /// Scale the selection (or focused shape) by `factor`
    pub fn scale_active(&mut self, factor: f64) {
        if self.phase == GamePhase::GameOver || !factor.is_finite() {
            return;
        }
        for i in self.highlighted_indices() {
            if let Some(shape) = self.active.get_mut(i) {
                shape.scale_by(factor);
            }
        }
    }
}
