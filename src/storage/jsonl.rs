//! JSONL (JSON Lines) record store.
//!
//! Each entity type lives in its own file under `records/`, one JSON object
//! per line.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{RecordStore, StorageConfig, StorageError};
use crate::models::{rank_pairs, Availability, Game, GameId, MatchResult, Pair, Player};

/// Entity types for JSONL storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Player,
    Game,
    Availability,
    Pair,
    Result,
}

impl EntityType {
    /// Get the filename for this entity type.
    pub fn filename(&self) -> &'static str {
        match self {
            EntityType::Player => "players.jsonl",
            EntityType::Game => "games.jsonl",
            EntityType::Availability => "availabilities.jsonl",
            EntityType::Pair => "pairs.jsonl",
            EntityType::Result => "results.jsonl",
        }
    }

    /// Path of this entity's file.
    pub fn path(&self, config: &StorageConfig) -> PathBuf {
        config.records_dir().join(self.filename())
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a writer for a specific entity type.
    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(entity.path(config))
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append multiple entities to the file.
    pub fn append_batch(&self, entities: &[T]) -> Result<usize, StorageError> {
        if entities.is_empty() {
            return Ok(0);
        }

        self.ensure_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let count = Self::write_lines(BufWriter::new(file), entities)?;
        info!("Appended {} records to {:?}", count, self.path);
        Ok(count)
    }

    /// Write entities, replacing the entire file.
    ///
    /// The new contents go to a sibling temp file that is renamed over the
    /// old one, so a failed write leaves the previous file in place.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let tmp = self.path.with_extension("jsonl.tmp");
        let file = File::create(&tmp)?;
        let count = Self::write_lines(BufWriter::new(file), entities)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Wrote {} records to {:?}", count, self.path);
        Ok(count)
    }

    fn write_lines(mut writer: BufWriter<File>, entities: &[T]) -> Result<usize, StorageError> {
        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()?;
        Ok(entities.len())
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a reader for a specific entity type.
    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(entity.path(config))
    }

    /// Read all entities from the file. A missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        self.read(false)
    }

    /// Like [`read_all`](Self::read_all), but fails on the first line that
    /// does not parse instead of skipping it.
    pub fn read_all_strict(&self) -> Result<Vec<T>, StorageError> {
        self.read(true)
    }

    fn read(&self, strict: bool) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(source) if strict => {
                    return Err(StorageError::CorruptRecord {
                        path: self.path.clone(),
                        line: index + 1,
                        source,
                    });
                }
                Err(e) => {
                    warn!("Skipping line {} in {:?}: {}", index + 1, self.path, e);
                }
            }
        }

        debug!("Read {} records from {:?}", entities.len(), self.path);
        Ok(entities)
    }

    /// Read entities matching a predicate.
    pub fn read_where<F>(&self, predicate: F) -> Result<Vec<T>, StorageError>
    where
        F: Fn(&T) -> bool,
    {
        let all = self.read_all()?;
        Ok(all.into_iter().filter(predicate).collect())
    }
}

/// [`RecordStore`] backed by JSONL files under the data directory.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    config: StorageConfig,
}

impl JsonlStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn reader<T: DeserializeOwned>(&self, entity: EntityType) -> JsonlReader<T> {
        JsonlReader::for_entity(&self.config, entity)
    }

    fn writer<T: Serialize>(&self, entity: EntityType) -> JsonlWriter<T> {
        JsonlWriter::for_entity(&self.config, entity)
    }

    /// Read every record of `entity`, apply `change` and write the file back.
    ///
    /// Refuses to rewrite a file holding lines it cannot parse.
    fn update<T, F>(&self, entity: EntityType, change: F) -> Result<(), StorageError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>),
    {
        let mut all: Vec<T> = self.reader(entity).read_all_strict()?;
        change(&mut all);
        self.writer(entity).write_all(&all)?;
        Ok(())
    }

    /// Insert or replace a player's availability for a game.
    pub fn save_availability(&self, availability: &Availability) -> Result<(), StorageError> {
        self.update(EntityType::Availability, |all: &mut Vec<Availability>| {
            upsert(all, availability.clone(), |a| a.id == availability.id)
        })
    }

    fn restore_game(&self, id: &GameId, previous: Option<Game>) -> Result<(), StorageError> {
        self.update(EntityType::Game, |games: &mut Vec<Game>| match previous {
            Some(game) => upsert(games, game, |g| &g.id == id),
            None => games.retain(|g| &g.id != id),
        })
    }
}

fn upsert<T>(items: &mut Vec<T>, item: T, same: impl Fn(&T) -> bool) {
    match items.iter().position(same) {
        Some(index) => items[index] = item,
        None => items.push(item),
    }
}

impl RecordStore for JsonlStore {
    fn players(&self) -> Result<Vec<Player>, StorageError> {
        self.reader(EntityType::Player).read_all()
    }

    fn save_player(&self, player: &Player) -> Result<(), StorageError> {
        self.update(EntityType::Player, |players: &mut Vec<Player>| {
            upsert(players, player.clone(), |p| p.id == player.id)
        })
    }

    fn game(&self, id: &GameId) -> Result<Option<Game>, StorageError> {
        let games = self.reader::<Game>(EntityType::Game).read_where(|g: &Game| &g.id == id)?;
        Ok(games.into_iter().last())
    }

    fn save_game(&self, game: &Game) -> Result<(), StorageError> {
        self.update(EntityType::Game, |games: &mut Vec<Game>| {
            upsert(games, game.clone(), |g| g.id == game.id)
        })
    }

    fn availabilities(&self, game_id: &GameId) -> Result<Vec<Availability>, StorageError> {
        self.reader::<Availability>(EntityType::Availability)
            .read_where(|a: &Availability| &a.game_id == game_id)
    }

    fn pairs(&self, game_id: &GameId) -> Result<Vec<Pair>, StorageError> {
        let mut pairs = self
            .reader::<Pair>(EntityType::Pair)
            .read_where(|p: &Pair| &p.game_id == game_id)?;
        let roster = self.players()?;
        rank_pairs(&mut pairs, &roster);
        Ok(pairs)
    }

    fn replace_pairs(&self, game_id: &GameId, pairs: &[Pair]) -> Result<(), StorageError> {
        self.update(EntityType::Pair, |all: &mut Vec<Pair>| {
            all.retain(|p| &p.game_id != game_id);
            all.extend_from_slice(pairs);
        })?;
        info!("Stored {} pairs for game {}", pairs.len(), game_id);
        Ok(())
    }

    fn results(&self, game_id: &GameId) -> Result<Vec<MatchResult>, StorageError> {
        self.reader::<MatchResult>(EntityType::Result)
            .read_where(|r: &MatchResult| &r.game_id == game_id)
    }

    /// Saves the game first, then appends the results. If the append fails
    /// the previous game record is restored and any partially written results
    /// are removed.
    fn commit_results(&self, game: &Game, results: &[MatchResult]) -> Result<(), StorageError> {
        let previous = self.game(&game.id)?;
        self.save_game(game)?;

        if let Err(e) = self.writer(EntityType::Result).append_batch(results) {
            warn!("Storing results for game {} failed, restoring game record: {}", game.id, e);
            self.restore_game(&game.id, previous)?;

            let written: HashSet<_> = results.iter().map(|r| &r.id).collect();
            let cleanup = self.update(EntityType::Result, |all: &mut Vec<MatchResult>| {
                all.retain(|r| !written.contains(&r.id))
            });
            if let Err(cleanup) = cleanup {
                warn!("Could not clean up results for game {}: {}", game.id, cleanup);
            }
            return Err(e);
        }
        Ok(())
    }
}
