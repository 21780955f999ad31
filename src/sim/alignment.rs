//! Alignment scoring and the batch check
//!
//! A pair passes when its position, rotation and relative scale errors are
//! all inside the difficulty's [`Tolerance`]. A batch passes only if every
//! selected pair passes; the first miss costs one life and nothing is removed.

use rand::RngCore;

use super::shape::Shape;
use super::state::{Game, GamePhase};
use crate::consts::*;
use crate::{angle_difference, distance};

/// Acceptance thresholds for one pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Max center distance in pixels
    pub position: f64,
    /// Max rotation error in degrees
    pub rotation: f64,
    /// Max size error relative to the target size
    pub scale: f64,
}

/// Measured error between an active shape and its target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    pub position: f64,
    /// Degrees, [0, 180]
    pub rotation: f64,
    pub scale: f64,
}

impl Alignment {
    pub fn measure(active: &Shape, target: &Shape) -> Self {
        let mut position = distance(active.center(), target.center());
        if position < POSITION_JITTER {
            position = 0.0;
        }
        let target_size = target.size.max(1) as f64;
        Self {
            position,
            rotation: angle_difference(active.rotation, target.rotation),
            scale: (active.size as f64 - target.size as f64).abs() / target_size,
        }
    }

    pub fn within(&self, tolerance: &Tolerance) -> bool {
        self.position <= tolerance.position
            && self.rotation <= tolerance.rotation
            && self.scale <= tolerance.scale
    }
}

/// Result category of a batch check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Every selected pair matched and was removed
    Matched,
    /// A pair was off; one life lost
    Missed,
    /// Nothing to check or wrong selection size; no penalty
    Neutral,
    /// Out of lives
    GameOver,
}

/// Outcome of [`Game::check_alignment_batch`]
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub status: CheckStatus,
    pub message: String,
    /// Failing pair and its measured error
    pub miss: Option<(usize, Alignment)>,
    /// Seconds taken, when this check cleared the level
    pub level_time: Option<f64>,
}

impl CheckOutcome {
    fn neutral(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Neutral,
            message: message.into(),
            miss: None,
            level_time: None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.status == CheckStatus::Matched
    }
}

fn describe_miss(error: &Alignment, tolerance: &Tolerance) -> String {
    format!(
        "Off target: position {:.0}px (max {:.0}), rotation {:.0}° (max {:.0}°), scale {:.0}% (max {:.0}%)",
        error.position,
        tolerance.position,
        error.rotation,
        tolerance.rotation,
        error.scale * 100.0,
        tolerance.scale * 100.0
    )
}

impl<R: RngCore> Game<R> {
    /// Score the selected batch against its targets
    pub fn check_alignment_batch(&mut self) -> CheckOutcome {
        if self.phase == GamePhase::GameOver {
            return CheckOutcome {
                status: CheckStatus::GameOver,
                message: "Out of lives. Game over.".to_string(),
                miss: None,
                level_time: None,
            };
        }
        if self.active.is_empty() {
            return CheckOutcome::neutral("This level is already complete.");
        }

        let need = self.required_batch().min(self.active.len());
        if self.settings.auto_select_remaining
            && self.selected.is_empty()
            && self.active.len() <= need
        {
            self.selected = (0..self.active.len()).collect();
        }
        if self.selected.len() != need {
            let noun = if need == 1 { "shape" } else { "shapes" };
            return CheckOutcome::neutral(format!("Select exactly {need} {noun} at once!"));
        }

        let tolerance = self.settings.difficulty.tolerance();
        for &i in &self.selected {
            let error = Alignment::measure(&self.active[i], &self.target[i]);
            if error.within(&tolerance) {
                continue;
            }
            self.lives -= 1;
            let message = describe_miss(&error, &tolerance);
            log::info!("Missed pair {} ({} lives left)", i, self.lives);
            if self.lives <= 0 {
                self.phase = GamePhase::GameOver;
                self.drag = None;
                log::info!("Game over at level {}", self.level);
                return CheckOutcome {
                    status: CheckStatus::GameOver,
                    message: format!("{message}. Out of lives. Game over."),
                    miss: Some((i, error)),
                    level_time: None,
                };
            }
            return CheckOutcome {
                status: CheckStatus::Missed,
                message,
                miss: Some((i, error)),
                level_time: None,
            };
        }

        // Descending so earlier removals don't shift later indices
        let matched = self.selected.len();
        for &i in self.selected.iter().rev() {
            self.active.remove(i);
            self.target.remove(i);
        }
        self.selected.clear();
        self.focus = None;
        self.drag = None;

        let mut message = if matched == 1 {
            "Match!".to_string()
        } else {
            format!("Match! {matched} shapes aligned.")
        };
        let mut level_time = None;
        if self.active.is_empty() {
            level_time = self.stats.finish_level(self.level);
            self.phase = if self.level >= self.settings.level_count {
                GamePhase::Completed
            } else {
                GamePhase::LevelClearing
            };
            match level_time {
                Some(secs) => message.push_str(&format!(" Level {} cleared in {:.1}s.", self.level, secs)),
                None => message.push_str(&format!(" Level {} cleared.", self.level)),
            }
            log::info!("Level {} cleared ({:?}s)", self.level, level_time);
        }

        CheckOutcome {
            status: CheckStatus::Matched,
            message,
            miss: None,
            level_time,
        }
    }
}
