//! Engine configuration and difficulty profiles
//!
//! Loaded from an optional JSON file; missing fields take defaults.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::Tolerance;

/// Tolerance profile for batch checks and snapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Lenient parse used for saves and prompts: unknown names mean normal
    pub fn parse(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }

    /// Acceptance thresholds for a single pair
    pub fn tolerance(&self) -> Tolerance {
        match self {
            Difficulty::Easy => Tolerance {
                position: 120.0,
                rotation: 45.0,
                scale: 0.50,
            },
            Difficulty::Normal => Tolerance {
                position: 70.0,
                rotation: 28.0,
                scale: 0.35,
            },
            Difficulty::Hard => Tolerance {
                position: 40.0,
                rotation: 18.0,
                scale: 0.22,
            },
        }
    }

    /// Distance at which a dragged shape jumps onto its target
    pub fn snap_radius(&self) -> f64 {
        match self {
            Difficulty::Easy => 70.0,
            Difficulty::Normal => 45.0,
            Difficulty::Hard => 30.0,
        }
    }
}

/// When the snap assist moves a shape onto its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SnapPolicy {
    /// Continuously while dragging; the drag ends on snap
    #[default]
    Drag,
    /// Once, when the pointer is released
    Release,
    Off,
}

impl SnapPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapPolicy::Drag => "drag",
            SnapPolicy::Release => "release",
            SnapPolicy::Off => "off",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "drag" => Some(SnapPolicy::Drag),
            "release" => Some(SnapPolicy::Release),
            "off" | "none" => Some(SnapPolicy::Off),
            _ => None,
        }
    }
}

/// Errors reading or writing a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Canvas size used for placement
    pub width: u32,
    pub height: u32,
    /// Number of levels in a run
    pub level_count: u32,
    pub difficulty: Difficulty,
    pub snap_policy: SnapPolicy,
    /// Check selects all remaining shapes when nothing is selected
    /// and they fit in one batch
    pub auto_select_remaining: bool,
    pub player_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            level_count: DEFAULT_LEVEL_COUNT,
            difficulty: Difficulty::Normal,
            snap_policy: SnapPolicy::Drag,
            auto_select_remaining: false,
            player_name: DEFAULT_PLAYER_NAME.to_string(),
        }
    }
}

/// Name used until the player enters one
pub const DEFAULT_PLAYER_NAME: &str = "Anonymous";

impl Settings {
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        let mut settings: Settings = serde_json::from_str(&json)?;
        if !(1..=MAX_LEVEL_COUNT).contains(&settings.level_count) {
            log::warn!(
                "level_count {} outside 1..={}, clamping",
                settings.level_count,
                MAX_LEVEL_COUNT
            );
            settings.level_count = settings.level_count.clamp(1, MAX_LEVEL_COUNT);
        }
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or broken
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
