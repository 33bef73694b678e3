//! High score leaderboard system
//!
//! `ScoreService` is the contract the game submits finished runs to.
//! `Leaderboard` is the local implementation: top 10 scores, optionally
//! persisted to a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;
/// Longest accepted player name
pub const MAX_NAME_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("invalid player name '{0}': use 1-6 letters or digits")]
    InvalidName(String),
    #[error("score storage failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed score data: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("score rejected: {0}")]
    Rejected(String),
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u64,
}

/// Where finished runs are reported
pub trait ScoreService {
    fn submit_score(&mut self, name: &str, score: u64) -> Result<(), ScoreError>;

    /// Best scores first, at most `MAX_HIGH_SCORES`
    fn fetch_top_scores(&self) -> Result<Vec<ScoreEntry>, ScoreError>;
}

/// Trim, uppercase and check a player name
pub fn normalize_name(name: &str) -> Result<String, ScoreError> {
    let name = name.trim().to_uppercase();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ScoreError::InvalidName(name));
    }
    Ok(name)
}

/// High score leaderboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<ScoreEntry>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Leaderboard {
    /// Create empty in-memory leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, name: String, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = ScoreEntry { name, score };

        // Ties keep the earlier entry ahead
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from `path`. A missing file gives an empty board bound to `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScoreError> {
        let path = path.as_ref();
        let mut board = if path.exists() {
            let json = fs::read_to_string(path)?;
            let mut board: Leaderboard = serde_json::from_str(&json)?;
            board.entries.sort_by(|a, b| b.score.cmp(&a.score));
            board.entries.truncate(MAX_HIGH_SCORES);
            log::info!("Loaded {} high scores", board.entries.len());
            board
        } else {
            log::info!("No high scores found, starting fresh");
            Leaderboard::new()
        };
        board.path = Some(path.to_path_buf());
        Ok(board)
    }

    /// Write to the bound file. In-memory boards have nothing to do.
    pub fn save(&self) -> Result<(), ScoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

impl ScoreService for Leaderboard {
    fn submit_score(&mut self, name: &str, score: u64) -> Result<(), ScoreError> {
        let name = normalize_name(name)?;
        match self.add_score(name, score) {
            Some(rank) => {
                log::info!("New high score {score} at rank {rank}");
                self.save()
            }
            None => Ok(()),
        }
    }

    fn fetch_top_scores(&self) -> Result<Vec<ScoreEntry>, ScoreError> {
        Ok(self.entries.iter().take(MAX_HIGH_SCORES).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_rules() {
        assert_eq!(normalize_name("  ace ").expect("valid"), "ACE");
        assert_eq!(normalize_name("r2d2").expect("valid"), "R2D2");
        assert!(matches!(normalize_name(""), Err(ScoreError::InvalidName(_))));
        assert!(matches!(normalize_name("   "), Err(ScoreError::InvalidName(_))));
        assert!(matches!(normalize_name("TOOLONG"), Err(ScoreError::InvalidName(_))));
        assert!(matches!(normalize_name("a b"), Err(ScoreError::InvalidName(_))));
    }

    #[test]
    fn test_sorted_and_truncated() {
        let mut board = Leaderboard::new();
        for i in 1..=15u64 {
            board.submit_score("AAA", i * 100).expect("in-memory submit");
        }
        let top = board.fetch_top_scores().expect("fetch");
        assert_eq!(top.len(), MAX_HIGH_SCORES);
        assert_eq!(top[0].score, 1500);
        assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(!board.qualifies(500));
        assert_eq!(board.potential_rank(1550), Some(1));
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut board = Leaderboard::new();
        assert_eq!(board.add_score("ZED".into(), 0), None);
        assert!(board.is_empty());
    }

    #[test]
    fn test_rejected_name_leaves_board_untouched() {
        let mut board = Leaderboard::new();
        assert!(board.submit_score("WAYTOOLONG", 900).is_err());
        assert_eq!(board.top_score(), None);
    }

    #[test]
    fn test_file_round_trip() {
        let path =
            std::env::temp_dir().join(format!("road_rampage_scores_{}.json", std::process::id()));
        let _ = fs::remove_file(&path);

        let mut board = Leaderboard::load(&path).expect("missing file is fine");
        board.submit_score("max", 4200).expect("submit");
        board.submit_score("ann", 9000).expect("submit");

        let reloaded = Leaderboard::load(&path).expect("reload");
        let top = reloaded.fetch_top_scores().expect("fetch");
        assert_eq!(
            top[0],
            ScoreEntry {
                name: "ANN".into(),
                score: 9000
            }
        );
        assert_eq!(top[1].name, "MAX");
        let _ = fs::remove_file(&path);
    }
}
