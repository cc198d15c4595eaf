//! Leaderboard of finished runs
//!
//! In-memory only, tracks the top 10 runs of this process.

use serde::{Deserialize, Serialize};

use crate::sim::ControlMode;

/// Maximum number of runs to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEntry {
    /// Obstacles passed
    pub score: u32,
    /// Physics ticks survived
    pub ticks: u64,
    /// Seed the run was played with
    pub seed: u64,
    /// Who was in control when the run ended
    pub mode: ControlMode,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<RunEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a finished run if it qualifies.
    /// Returns the rank achieved (1-indexed) or None if it didn't.
    pub fn add_run(&mut self, entry: RunEntry) -> Option<usize> {
        let rank = self.potential_rank(entry.score)?;
        log::debug!("Run with score {} ranks #{}", entry.score, rank);
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }
}
