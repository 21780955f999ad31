//! Save/load of full game snapshots
//!
//! Features:
//! - Flat JSON file (pretty-printed, UTF-8)
//! - Optional fields fall back to the engine's current values
//! - Validation before anything is applied; a rejected load leaves the
//!   engine untouched

pub mod snapshot;

pub use snapshot::Snapshot;

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::sim::ShapeError;

/// Errors saving or loading a snapshot
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `active` and `target` must pair up 1:1
    #[error("{active} active shapes but {target} targets")]
    Misaligned { active: usize, target: usize },

    #[error("invalid {list} shape #{index}: {source}")]
    InvalidShape {
        list: &'static str,
        index: usize,
        source: ShapeError,
    },

    #[error("pair #{index} has {active}-sided active but {target}-sided target")]
    SidesMismatch {
        index: usize,
        active: u32,
        target: u32,
    },

    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Write a snapshot as pretty JSON
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)?;
    log::info!("Game saved to {}", path.display());
    Ok(())
}

/// Read and parse a snapshot file (not yet validated against an engine)
pub fn load_snapshot(path: &Path) -> Result<Snapshot, PersistenceError> {
    let json = fs::read_to_string(path)?;
    Snapshot::from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PersistenceError::Misaligned {
            active: 2,
            target: 1,
        };
        assert_eq!(err.to_string(), "2 active shapes but 1 targets");

        let err = PersistenceError::InvalidShape {
            list: "target",
            index: 3,
            source: ShapeError::Sides(9),
        };
        assert_eq!(err.to_string(), "invalid target shape #3: side count 9 outside 3..=7");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_snapshot(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(PersistenceError::Io(_))));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\"level\": 2, \"active\": [").unwrap();
        assert!(matches!(load_snapshot(&path), Err(PersistenceError::Json(_))));
    }
}
