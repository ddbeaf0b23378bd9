//! Record store for the club's players, games, pairs and results.
//!
//! The scoring engine never touches storage. The recording workflow talks to
//! a [`RecordStore`]; the bundled implementation keeps one JSONL file per
//! entity type under the data directory.

pub mod jsonl;

pub use jsonl::{EntityType, JsonlReader, JsonlStore, JsonlWriter};

use std::path::PathBuf;
use thiserror::Error;

use crate::models::{Availability, Game, GameId, MatchResult, Pair, Player, PlayerId};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Unreadable record at {path:?} line {line}: {source}")]
    CorruptRecord {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn records_dir(&self) -> PathBuf {
        self.data_dir.join("records")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// CRUD access to the team's records.
///
/// `commit_results` must store the results and the concluded game as one
/// unit; callers compute everything before invoking it.
pub trait RecordStore {
    fn players(&self) -> Result<Vec<Player>, StorageError>;

    fn player(&self, id: &PlayerId) -> Result<Option<Player>, StorageError> {
        Ok(self.players()?.into_iter().find(|p| &p.id == id))
    }

    /// Insert or replace a player by ID.
    fn save_player(&self, player: &Player) -> Result<(), StorageError>;

    fn game(&self, id: &GameId) -> Result<Option<Game>, StorageError>;

    fn save_game(&self, game: &Game) -> Result<(), StorageError>;

    fn availabilities(&self, game_id: &GameId) -> Result<Vec<Availability>, StorageError>;

    /// Pairs of a game with totals taken from the current roster, in court order.
    fn pairs(&self, game_id: &GameId) -> Result<Vec<Pair>, StorageError>;

    /// Drop every pair of `game_id` and store `pairs` instead.
    fn replace_pairs(&self, game_id: &GameId, pairs: &[Pair]) -> Result<(), StorageError>;

    fn results(&self, game_id: &GameId) -> Result<Vec<MatchResult>, StorageError>;

    fn commit_results(&self, game: &Game, results: &[MatchResult]) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));
        assert_eq!(config.records_dir(), PathBuf::from("/data/records"));
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }
}
