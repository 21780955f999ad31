//! Per-level timing and attempt tracking
//!
//! Arrays are indexed by level number (1-based); slot 0 is unused.
//! Persisted inside game snapshots.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Per-level stats for one run
#[derive(Debug, Clone)]
pub struct Stats {
    total_levels: u32,
    /// Monotonic start of the latest attempt per level (not persisted)
    start_times: Vec<Option<Instant>>,
    /// Seconds taken by the latest clear of each level
    elapsed: Vec<f64>,
    /// Times each level was started, cumulative across resets
    attempts: Vec<u32>,
}

/// Persisted form of [`Stats`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    #[serde(default)]
    pub elapsed: Vec<f64>,
    #[serde(default)]
    pub attempts: Vec<u32>,
    #[serde(default)]
    pub total: u32,
}

impl Stats {
    pub fn new(total_levels: u32) -> Self {
        let slots = total_levels as usize + 1;
        Self {
            total_levels,
            start_times: vec![None; slots],
            elapsed: vec![0.0; slots],
            attempts: vec![0; slots],
        }
    }

    pub fn total_levels(&self) -> u32 {
        self.total_levels
    }

    fn slot(&self, level: u32) -> Option<usize> {
        (level >= 1 && level <= self.total_levels).then_some(level as usize)
    }

    /// Stamp the start of `level` and count the attempt
    pub fn start_level(&mut self, level: u32) {
        let Some(i) = self.slot(level) else {
            log::warn!("Stats: level {} outside 1..={}", level, self.total_levels);
            return;
        };
        self.start_times[i] = Some(Instant::now());
        self.attempts[i] = self.attempts[i].saturating_add(1);
    }

    /// Restart the clock for `level` without counting an attempt (after a load)
    pub fn resume_level(&mut self, level: u32) {
        if let Some(i) = self.slot(level) {
            self.start_times[i] = Some(Instant::now());
        }
    }

    /// Store and return seconds since `start_level(level)`
    ///
    /// Returns `None` for unknown levels or levels never started in this
    /// session (e.g. cleared right after loading a snapshot).
    pub fn finish_level(&mut self, level: u32) -> Option<f64> {
        let i = self.slot(level)?;
        let started = self.start_times[i]?;
        let secs = started.elapsed().as_secs_f64();
        self.elapsed[i] = secs;
        Some(secs)
    }

    pub fn elapsed(&self, level: u32) -> Option<f64> {
        self.slot(level).map(|i| self.elapsed[i])
    }

    pub fn attempts(&self, level: u32) -> Option<u32> {
        self.slot(level).map(|i| self.attempts[i])
    }

    /// (level, seconds) bars for the stats chart; negative times show as 0
    pub fn chart_rows(&self) -> Vec<(u32, f64)> {
        (1..=self.total_levels)
            .map(|level| (level, self.elapsed[level as usize].max(0.0)))
            .collect()
    }

    /// Attempt counts for levels 1..=total
    pub fn attempt_counts(&self) -> Vec<u32> {
        self.attempts[1..].to_vec()
    }

    pub fn to_record(&self) -> StatsRecord {
        StatsRecord {
            elapsed: self.elapsed.clone(),
            attempts: self.attempts.clone(),
            total: self.total_levels,
        }
    }

    /// Rebuild stats sized for `total_levels`, whatever the record claims
    pub fn from_record(record: &StatsRecord, total_levels: u32) -> Self {
        if record.total != 0 && record.total != total_levels {
            log::warn!(
                "Stats saved for {} levels, resizing to {}",
                record.total,
                total_levels
            );
        }
        let mut stats = Self::new(total_levels);
        for (slot, &secs) in stats.elapsed.iter_mut().zip(&record.elapsed) {
            *slot = if secs.is_finite() { secs } else { 0.0 };
        }
        for (slot, &count) in stats.attempts.iter_mut().zip(&record.attempts) {
            *slot = count;
        }
        stats
    }
}
