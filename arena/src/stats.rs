//! Per-player score record.
//!
//! Only human players are recorded. The record lives for one session and is
//! handed to the session explicitly; when a path is set it is loaded on start
//! and written back as JSON after every game.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Wins and games played for one name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub wins: u32,
    pub played: u32,
}

/// Serializable form written to the scores file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub players: BTreeMap<String, PlayerRecord>,
    pub timestamp: u64,
}

#[derive(Debug, Default)]
pub struct ScoreBoard {
    records: BTreeMap<String, PlayerRecord>,
    /// Where to persist the record. None keeps it in memory only.
    path: Option<PathBuf>,
}

impl ScoreBoard {
    /// A record that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the record at `path`, starting empty if the file is missing or
    /// unreadable. Later saves go to the same path.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<ScoreSnapshot>(&content) {
                Ok(snapshot) => {
                    debug!(
                        "Loaded {} score records from {}",
                        snapshot.players.len(),
                        path.display()
                    );
                    snapshot.players
                }
                Err(e) => {
                    warn!("Failed to parse scores file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read scores file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self {
            records,
            path: Some(path),
        }
    }

    /// Record one finished game for `name`.
    pub fn record_game(&mut self, name: &str, won: bool) {
        let record = self.records.entry(name.to_string()).or_default();
        record.played += 1;
        if won {
            record.wins += 1;
        }
    }

    pub fn get(&self, name: &str) -> Option<PlayerRecord> {
        self.records.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// "`name`'s score: W out of N", or None for a name with no games.
    pub fn describe(&self, name: &str) -> Option<String> {
        self.get(name)
            .map(|r| format!("{}'s score: {} out of {}", name, r.wins, r.played))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            players: self.records.clone(),
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Write the record to its path (atomic write-then-rename). Failures are
    /// logged and otherwise ignored.
    pub fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };

        let json = match serde_json::to_string_pretty(&self.snapshot()) {
            Ok(j) => j,
            Err(e) => {
                warn!("Failed to serialize scores: {}", e);
                return;
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!("Failed to create scores directory: {}", e);
                    return;
                }
            }
        }

        let mut temp_path = path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        match fs::File::create(&temp_path) {
            Ok(mut file) => {
                if let Err(e) = file.write_all(json.as_bytes()) {
                    warn!("Failed to write scores: {}", e);
                    return;
                }
            }
            Err(e) => {
                warn!("Failed to create temp scores file: {}", e);
                return;
            }
        }

        if let Err(e) = fs::rename(&temp_path, path) {
            warn!("Failed to rename scores file: {}", e);
            let _ = fs::remove_file(&temp_path);
            return;
        }

        debug!("Wrote scores to {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_record_game() {
        let mut scores = ScoreBoard::in_memory();
        assert!(scores.is_empty());

        scores.record_game("Ada", true);
        scores.record_game("Ada", false);
        scores.record_game("Grace", false);

        assert_eq!(scores.get("Ada"), Some(PlayerRecord { wins: 1, played: 2 }));
        assert_eq!(scores.get("Grace"), Some(PlayerRecord { wins: 0, played: 1 }));
        assert_eq!(scores.get("Linus"), None);
        assert_eq!(scores.len(), 2);
    }

    #[test]
    fn test_describe() {
        let mut scores = ScoreBoard::in_memory();
        scores.record_game("Ada", true);
        scores.record_game("Ada", true);
        scores.record_game("Ada", false);

        assert_eq!(
            scores.describe("Ada").as_deref(),
            Some("Ada's score: 2 out of 3")
        );
        assert_eq!(scores.describe("nobody"), None);
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        let mut scores = ScoreBoard::in_memory();
        scores.record_game("Ada", true);
        scores.save();
        assert!(scores.path().is_none());
    }

    #[test]
    fn test_load_missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let scores = ScoreBoard::load(dir.path().join("scores.json"));
        assert!(scores.is_empty());
        assert_eq!(scores.path(), Some(dir.path().join("scores.json").as_path()));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");

        let mut scores = ScoreBoard::load(&path);
        scores.record_game("Ada", true);
        scores.record_game("Grace", false);
        scores.save();

        assert!(path.exists());
        let content = fs::read_to_string(&path).unwrap();
        let parsed: ScoreSnapshot = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.players.len(), 2);

        let mut reloaded = ScoreBoard::load(&path);
        assert_eq!(reloaded.get("Ada"), Some(PlayerRecord { wins: 1, played: 1 }));

        // Records carry across sessions
        reloaded.record_game("Ada", false);
        reloaded.save();
        let again = ScoreBoard::load(&path);
        assert_eq!(again.get("Ada"), Some(PlayerRecord { wins: 1, played: 2 }));
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.json");

        let mut scores = ScoreBoard::load(&path);
        scores.record_game("Ada", true);
        scores.save();

        assert!(path.exists());
        assert!(!dir.path().join("nested").join("scores.json.tmp").exists());
    }

    #[test]
    fn test_load_corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "{ not json").unwrap();

        let scores = ScoreBoard::load(&path);
        assert!(scores.is_empty());
    }
}
