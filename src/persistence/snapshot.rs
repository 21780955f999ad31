//! Snapshot schema and engine save/restore
//!
//! Every top-level field is optional on load; absent fields keep the
//! engine's current value (or the run defaults for level and lives).

use std::path::Path;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{PersistenceError, load_snapshot, save_snapshot};
use crate::consts::*;
use crate::settings::Difficulty;
use crate::sim::{Game, GamePhase, Shape, ShapeRecord};
use crate::stats::{Stats, StatsRecord};

/// Full game state as written to disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lives: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(default)]
    pub active: Vec<ShapeRecord>,
    #[serde(default)]
    pub target: Vec<ShapeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_count: Option<u32>,
    /// Older saves lack this; unknown names load as normal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn parse_shapes(records: &[ShapeRecord], list: &'static str) -> Result<Vec<Shape>, PersistenceError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            Shape::from_record(record)
                .map_err(|source| PersistenceError::InvalidShape { list, index, source })
        })
        .collect()
}

impl<R: RngCore> Game<R> {
    /// Capture the whole run
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            level: Some(self.level),
            lives: Some(self.lives),
            player_name: Some(self.settings.player_name.clone()),
            active: self.active.iter().map(Shape::to_record).collect(),
            target: self.target.iter().map(Shape::to_record).collect(),
            stats: Some(self.stats.to_record()),
            width: Some(self.settings.width),
            height: Some(self.settings.height),
            level_count: Some(self.settings.level_count),
            difficulty: Some(self.settings.difficulty.as_str().to_string()),
        }
    }

    /// Replace the whole run with `snapshot`
    ///
    /// Validates everything first; on error nothing is changed.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        if snapshot.active.len() != snapshot.target.len() {
            return Err(PersistenceError::Misaligned {
                active: snapshot.active.len(),
                target: snapshot.target.len(),
            });
        }
        let level = snapshot.level.unwrap_or(1);
        if level == 0 {
            return Err(PersistenceError::InvalidField {
                field: "level",
                reason: "levels start at 1".to_string(),
            });
        }
        let level_count = snapshot.level_count.unwrap_or(self.settings.level_count);
        if !(1..=MAX_LEVEL_COUNT).contains(&level_count) {
            return Err(PersistenceError::InvalidField {
                field: "level_count",
                reason: format!("{level_count} outside 1..={MAX_LEVEL_COUNT}"),
            });
        }
        let lives = snapshot.lives.unwrap_or(STARTING_LIVES);
        if lives > STARTING_LIVES {
            return Err(PersistenceError::InvalidField {
                field: "lives",
                reason: format!("{lives} above {STARTING_LIVES}"),
            });
        }
        let active = parse_shapes(&snapshot.active, "active")?;
        let target = parse_shapes(&snapshot.target, "target")?;
        if let Some((index, (a, t))) = active
            .iter()
            .zip(&target)
            .enumerate()
            .find(|(_, (a, t))| a.sides != t.sides)
        {
            return Err(PersistenceError::SidesMismatch {
                index,
                active: a.sides,
                target: t.sides,
            });
        }
        let stats = match &snapshot.stats {
            Some(record) => Stats::from_record(record, level_count),
            None => Stats::from_record(&self.stats.to_record(), level_count),
        };

        // Validated: apply wholesale
        let mut settings = self.settings.clone();
        settings.level_count = level_count;
        if let Some(width) = snapshot.width {
            settings.width = width;
        }
        if let Some(height) = snapshot.height {
            settings.height = height;
        }
        if let Some(name) = &snapshot.player_name {
            settings.player_name = name.clone();
        }
        if let Some(difficulty) = &snapshot.difficulty {
            settings.difficulty = Difficulty::parse(difficulty);
        }

        self.settings = settings;
        self.level = level;
        self.lives = lives.max(0);
        self.active = active;
        self.target = target;
        self.stats = stats;
        self.selected.clear();
        self.focus = None;
        self.drag = None;
        self.phase = if self.lives <= 0 {
            GamePhase::GameOver
        } else if !self.active.is_empty() {
            self.stats.resume_level(self.level);
            GamePhase::LevelActive
        } else if self.level >= self.settings.level_count {
            GamePhase::Completed
        } else {
            GamePhase::LevelClearing
        };
        log::info!(
            "Restored level {} with {} pairs, {} lives",
            self.level,
            self.active.len(),
            self.lives
        );
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PersistenceError> {
        save_snapshot(path, &self.to_snapshot())
    }

    /// Load a snapshot file; on any error the current run is kept
    pub fn load_from(&mut self, path: &Path) -> Result<(), PersistenceError> {
        let snapshot = load_snapshot(path)?;
        self.restore(&snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::ACTIVE_COLOR;

    fn playing_game() -> Game {
        let mut game = Game::seeded(Settings::default(), 31);
        game.set_player_name("Péter");
        game.set_difficulty(Difficulty::Hard);
        game.reset();
        game.active.clear();
        game.target.clear();
        game.phase = GamePhase::LevelClearing;
        assert!(game.next_level());
        game
    }

    #[test]
    fn test_snapshot_round_trip() {
        let game = playing_game();
        let json = game.to_snapshot().to_json().unwrap();

        let mut loaded = Game::seeded(Settings::default(), 99);
        loaded.restore(&Snapshot::from_json(&json).unwrap()).unwrap();
        assert_eq!(loaded.level(), 2);
        assert_eq!(loaded.lives(), game.lives());
        assert_eq!(loaded.player_name(), "Péter");
        assert_eq!(loaded.difficulty(), Difficulty::Hard);
        assert_eq!(loaded.active_shapes(), game.active_shapes());
        assert_eq!(loaded.target_shapes(), game.target_shapes());
        assert_eq!(loaded.stats().attempts(2), Some(1));
        assert_eq!(loaded.phase(), GamePhase::LevelActive);
    }

    #[test]
    fn test_snapshot_field_names() {
        let json = playing_game().to_snapshot().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in [
            "level",
            "lives",
            "player_name",
            "active",
            "target",
            "stats",
            "width",
            "height",
            "level_count",
            "difficulty",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["difficulty"], "hard");
        assert_eq!(value["stats"]["total"], 5);
        let shape = &value["active"][0];
        for key in ["cx", "cy", "size", "rotation", "sides", "color"] {
            assert!(shape.get(key).is_some(), "missing shape field {key}");
        }
    }

    #[test]
    fn test_minimal_snapshot_uses_defaults() {
        let mut game = Game::seeded(Settings::default(), 4);
        game.set_player_name("Keeper");
        let snapshot = Snapshot::from_json(
            r##"{
                "active": [{"cx": 400, "cy": 300, "size": 120, "rotation": 15, "sides": 3}],
                "target": [{"cx": 420, "cy": 310, "size": 110, "rotation": 0, "sides": 3, "color": "#3fb950"}]
            }"##,
        )
        .unwrap();
        game.restore(&snapshot).unwrap();
        assert_eq!(game.level(), 1);
        assert_eq!(game.lives(), STARTING_LIVES);
        assert_eq!(game.player_name(), "Keeper");
        assert_eq!(game.difficulty(), Difficulty::Normal);
        assert_eq!(game.level_count(), DEFAULT_LEVEL_COUNT);
        assert_eq!(game.active_shapes()[0].color, ACTIVE_COLOR);
        assert_eq!(game.phase(), GamePhase::LevelActive);
    }

    #[test]
    fn test_misaligned_snapshot_rejected() {
        let mut game = playing_game();
        let before = game.to_snapshot();
        let mut snapshot = before.clone();
        snapshot.level = Some(4);
        snapshot.lives = Some(1);
        snapshot.target.truncate(1);
        assert_eq!(snapshot.active.len(), 2);

        let err = game.restore(&snapshot).unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::Misaligned {
                active: 2,
                target: 1
            }
        ));
        assert_eq!(game.to_snapshot(), before);
    }

    #[test]
    fn test_bad_shape_rejected_without_changes() {
        let mut game = playing_game();
        let before = game.to_snapshot();
        let mut snapshot = before.clone();
        snapshot.level = Some(3);
        snapshot.target[1].sides = 12;
        assert!(matches!(
            game.restore(&snapshot),
            Err(PersistenceError::InvalidShape {
                list: "target",
                index: 1,
                ..
            })
        ));

        let mut snapshot = before.clone();
        snapshot.active[0].sides = 5;
        assert!(matches!(
            game.restore(&snapshot),
            Err(PersistenceError::SidesMismatch { index: 0, .. })
        ));

        let mut snapshot = before.clone();
        snapshot.level = Some(0);
        assert!(matches!(
            game.restore(&snapshot),
            Err(PersistenceError::InvalidField { field: "level", .. })
        ));
        assert_eq!(game.to_snapshot(), before);
    }

    #[test]
    fn test_out_of_range_counts_rejected() {
        let mut game = playing_game();
        let before = game.to_snapshot();

        let snapshot = Snapshot::from_json(r#"{"level_count": 4000000000}"#).unwrap();
        assert!(matches!(
            game.restore(&snapshot),
            Err(PersistenceError::InvalidField {
                field: "level_count",
                ..
            })
        ));

        let snapshot = Snapshot::from_json(r#"{"lives": 2147483647}"#).unwrap();
        assert!(matches!(
            game.restore(&snapshot),
            Err(PersistenceError::InvalidField { field: "lives", .. })
        ));
        assert_eq!(game.to_snapshot(), before);
    }

    #[test]
    fn test_saturated_attempts_survive_restart() {
        let mut game = Game::seeded(Settings::default(), 8);
        let snapshot =
            Snapshot::from_json(r#"{"stats": {"attempts": [0, 4294967295], "total": 5}}"#).unwrap();
        game.restore(&snapshot).unwrap();
        game.reset();
        assert_eq!(game.stats().attempts(1), Some(u32::MAX));
        assert_eq!(game.phase(), GamePhase::LevelActive);
    }

    #[test]
    fn test_negative_lives_load_as_game_over() {
        let mut game = Game::seeded(Settings::default(), 8);
        game.restore(&Snapshot {
            lives: Some(-4),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(game.lives(), 0);
        assert!(game.is_game_over());
    }

    #[test]
    fn test_restore_derives_phase() {
        let mut game = Game::seeded(Settings::default(), 8);
        game.restore(&Snapshot {
            lives: Some(0),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(game.phase(), GamePhase::GameOver);

        game.restore(&Snapshot {
            level: Some(5),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(game.phase(), GamePhase::Completed);

        game.restore(&Snapshot {
            level: Some(2),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(game.phase(), GamePhase::LevelClearing);
        assert!(game.next_level());
        assert_eq!(game.level(), 3);
    }

    #[test]
    fn test_unknown_difficulty_loads_as_normal() {
        let mut game = Game::seeded(
            Settings {
                difficulty: Difficulty::Easy,
                ..Default::default()
            },
            8,
        );
        let snapshot = Snapshot::from_json(r#"{"difficulty": "nightmare"}"#).unwrap();
        game.restore(&snapshot).unwrap();
        assert_eq!(game.difficulty(), Difficulty::Normal);
    }

    #[test]
    fn test_file_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        let game = playing_game();
        game.save_to(&path).unwrap();

        let mut loaded = Game::seeded(Settings::default(), 1);
        loaded.load_from(&path).unwrap();
        assert_eq!(loaded.to_snapshot(), game.to_snapshot());
    }

    #[test]
    fn test_malformed_file_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "not json at all").unwrap();
        let mut game = playing_game();
        let before = game.to_snapshot();
        assert!(game.load_from(&path).is_err());
        assert_eq!(game.to_snapshot(), before);
    }
}
