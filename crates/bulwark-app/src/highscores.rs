//! High score table, persisted as JSON next to the binary's working directory.
//!
//! Keeps the ten best runs ranked by final wave.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use bulwark_core::enums::Theme;
use bulwark_sim::ProgressReporter;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Wave reached when the run ended.
    pub wave: u32,
    pub seed: u64,
    pub theme: Theme,
    /// Unix timestamp (seconds).
    pub timestamp: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn qualifies(&self, wave: u32) -> bool {
        if wave == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| wave > e.wave).unwrap_or(true)
    }

    /// Insert a run, keeping the table sorted by wave (descending).
    /// Returns the 1-indexed rank, or `None` if it didn't qualify.
    pub fn add_score(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.wave) {
            return None;
        }
        let pos = self
            .entries
            .iter()
            .position(|e| entry.wave > e.wave)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(pos + 1)
    }

    pub fn top_wave(&self) -> Option<u32> {
        self.entries.first().map(|e| e.wave)
    }

    /// Load from `path`. A missing file is an empty table.
    pub fn load(path: &Path) -> io::Result<Self> {
        match fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }
}

/// Records the final wave of a run into the high score file.
pub struct FileReporter {
    path: PathBuf,
    seed: u64,
    theme: Theme,
}

impl FileReporter {
    pub fn new(path: impl Into<PathBuf>, seed: u64, theme: Theme) -> Self {
        Self {
            path: path.into(),
            seed,
            theme,
        }
    }

    fn record(&self, wave: u32) -> io::Result<Option<usize>> {
        let mut scores = HighScores::load(&self.path)?;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let rank = scores.add_score(HighScoreEntry {
            wave,
            seed: self.seed,
            theme: self.theme,
            timestamp,
        });
        if rank.is_some() {
            scores.save(&self.path)?;
        }
        Ok(rank)
    }
}

impl ProgressReporter for FileReporter {
    fn report_final_wave(&mut self, wave: u32) {
        match self.record(wave) {
            Ok(Some(rank)) => info!(wave, rank, path = %self.path.display(), "new high score"),
            Ok(None) => info!(wave, "run did not place on the high score table"),
            Err(e) => warn!(error = %e, path = %self.path.display(), "failed to record high score"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(wave: u32) -> HighScoreEntry {
        HighScoreEntry {
            wave,
            seed: 7,
            theme: Theme::Meadow,
            timestamp: 0,
        }
    }

    fn scratch_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "bulwark-{name}-{}.json",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_ranking_and_truncation() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(entry(5)), Some(1));
        assert_eq!(scores.add_score(entry(9)), Some(1));
        assert_eq!(scores.add_score(entry(7)), Some(2));
        assert_eq!(scores.top_wave(), Some(9));

        for _ in 0..MAX_HIGH_SCORES {
            scores.add_score(entry(20));
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(20));
        assert_eq!(scores.add_score(entry(3)), None);
    }

    #[test]
    fn test_wave_zero_never_qualifies() {
        assert!(!HighScores::new().qualifies(0));
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let path = scratch_path("missing");
        let scores = HighScores::load(&path).unwrap();
        assert!(scores.entries.is_empty());
    }

    #[test]
    fn test_reporter_persists_run() {
        let path = scratch_path("reporter");
        let mut reporter = FileReporter::new(&path, 99, Theme::Tundra);
        reporter.report_final_wave(4);
        reporter.report_final_wave(6);

        let scores = HighScores::load(&path).unwrap();
        assert_eq!(scores.entries.len(), 2);
        assert_eq!(scores.entries[0].wave, 6);
        assert_eq!(scores.entries[0].seed, 99);
        assert_eq!(scores.entries[1].theme, Theme::Tundra);
        let _ = fs::remove_file(&path);
    }
}
