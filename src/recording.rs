//! Match recording workflow.
//!
//! Drives the scoring engine against a [`RecordStore`]: suggests and stores
//! pairs, records pair results, awards team points and moves games through
//! their lifecycle. Every mutating call takes the acting [`Actor`]
//! explicitly.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{
    Actor, AvailabilityStatus, AvailabilitySummary, Game, GameId, GameStateError, GameStatus,
    GameSummary, MatchResult, Pair, PairId, PairSlot, PairSuggestion, Player, PlayerId, Role,
    SetScore,
};
use crate::scoring::{
    balance_pairs, resolve_match, summarize_results, ScoringError, ScoringRules,
};
use crate::storage::{RecordStore, StorageError};

/// Errors raised while recording.
#[derive(Debug, Error)]
pub enum RecordingError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    GameState(#[from] GameStateError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("A {role} is not allowed to {action}")]
    Forbidden { role: Role, action: &'static str },

    #[error("Game not found: {0}")]
    GameNotFound(GameId),

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Player {0} already exists")]
    PlayerExists(PlayerId),

    #[error("Game {0} no longer accepts changes")]
    GameClosed(GameId),

    #[error("Results were already recorded for game {0}")]
    AlreadyRecorded(GameId),

    #[error("No results submitted for game {0}")]
    NoResults(GameId),

    #[error("Pair {pair} does not belong to game {game}")]
    UnknownPair { pair: PairId, game: GameId },

    #[error("Pair {0} was submitted more than once")]
    DuplicateEntry(PairId),

    #[error("Pair {pair_order}: {source}")]
    PairResult {
        pair_order: u32,
        #[source]
        source: ScoringError,
    },

    #[error("Games are concluded by recording their results")]
    ConcludeWithoutResults,
}

/// Set scores entered for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairResultEntry {
    pub pair_id: PairId,
    pub set1: SetScore,
    pub set2: SetScore,
    #[serde(default)]
    pub set3: Option<SetScore>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Everything the captain enters when closing a game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSubmission {
    #[serde(default)]
    pub entries: Vec<PairResultEntry>,

    #[serde(default)]
    pub no_show: bool,

    /// Points for tournament games, entered by hand
    #[serde(default)]
    pub manual_points: Option<i32>,
}

/// Returned once results and team points are stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingConfirmation {
    pub game_id: GameId,
    pub team_points: Option<i32>,
    pub summary: GameSummary,
    pub results_stored: usize,
}

/// Returned once a pair composition is stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairingConfirmation {
    pub game_id: GameId,
    pub pairs: Vec<Pair>,
}

/// Records pairs and results for games held in a [`RecordStore`].
pub struct MatchRecorder<'a, S> {
    store: &'a S,
    rules: &'a ScoringRules,
}

impl<'a, S: RecordStore> MatchRecorder<'a, S> {
    pub fn new(store: &'a S, rules: &'a ScoringRules) -> Self {
        Self { store, rules }
    }

    fn require_manager(actor: &Actor, action: &'static str) -> Result<(), RecordingError> {
        if actor.can_manage_games() {
            Ok(())
        } else {
            Err(Self::forbid(actor, action))
        }
    }

    fn forbid(actor: &Actor, action: &'static str) -> RecordingError {
        warn!("{} ({}) tried to {}", actor.player_id, actor.role, action);
        RecordingError::Forbidden {
            role: actor.role,
            action,
        }
    }

    fn load_player(&self, player_id: &PlayerId) -> Result<Player, RecordingError> {
        self.store
            .player(player_id)?
            .ok_or_else(|| RecordingError::PlayerNotFound(player_id.clone()))
    }

    fn load_game(&self, game_id: &GameId) -> Result<Game, RecordingError> {
        self.store
            .game(game_id)?
            .ok_or_else(|| RecordingError::GameNotFound(game_id.clone()))
    }

    fn players_with(
        &self,
        game_id: &GameId,
        keep: impl Fn(AvailabilityStatus) -> bool,
    ) -> Result<Vec<Player>, RecordingError> {
        let wanted: HashSet<_> = self
            .store
            .availabilities(game_id)?
            .into_iter()
            .filter(|a| keep(a.status))
            .map(|a| a.player_id)
            .collect();

        Ok(self
            .active_roster()?
            .into_iter()
            .filter(|p| wanted.contains(&p.id))
            .collect())
    }

    fn active_roster(&self) -> Result<Vec<Player>, RecordingError> {
        Ok(self
            .store
            .players()?
            .into_iter()
            .filter(|p| p.is_active)
            .collect())
    }

    /// Add a new squad member.
    ///
    /// Anyone may join as a player. Any other role needs an admin, except
    /// for the first member of an empty roster.
    pub fn register_player(
        &self,
        actor: Option<&Actor>,
        player: Player,
    ) -> Result<Player, RecordingError> {
        let roster = self.store.players()?;
        if roster.iter().any(|p| p.id == player.id) {
            return Err(RecordingError::PlayerExists(player.id));
        }

        if player.role != Role::Player && !roster.is_empty() {
            match actor {
                Some(actor) if actor.role.can_assign_roles() => {}
                Some(actor) => return Err(Self::forbid(actor, "assign roles")),
                None => {
                    return Err(RecordingError::Forbidden {
                        role: Role::Player,
                        action: "assign roles",
                    })
                }
            }
        }

        self.store.save_player(&player)?;
        info!("Registered {} ({}) as {}", player.name, player.id, player.role);
        Ok(player)
    }

    /// Update a player's federation ranking. Players may update their own.
    pub fn set_federation_points(
        &self,
        actor: &Actor,
        player_id: &PlayerId,
        points: u32,
    ) -> Result<Player, RecordingError> {
        if !actor.can_edit_player(player_id) {
            return Err(Self::forbid(actor, "update federation points"));
        }

        let mut player = self.load_player(player_id)?;
        let previous = player.federation_points;
        player.federation_points = points;
        self.store.save_player(&player)?;

        info!("{} ranking points: {} -> {}", player.id, previous, points);
        Ok(player)
    }

    /// Change a player's role. Admins only.
    pub fn set_role(
        &self,
        actor: &Actor,
        player_id: &PlayerId,
        role: Role,
    ) -> Result<Player, RecordingError> {
        if !actor.role.can_assign_roles() {
            return Err(Self::forbid(actor, "assign roles"));
        }

        let mut player = self.load_player(player_id)?;
        player.role = role;
        self.store.save_player(&player)?;

        info!("{} set role of {} to {}", actor.player_id, player.id, role);
        Ok(player)
    }

    /// Take a player out of the active roster.
    pub fn deactivate_player(
        &self,
        actor: &Actor,
        player_id: &PlayerId,
    ) -> Result<Player, RecordingError> {
        self.set_active(actor, player_id, false)
    }

    /// Bring a player back into the active roster.
    pub fn activate_player(
        &self,
        actor: &Actor,
        player_id: &PlayerId,
    ) -> Result<Player, RecordingError> {
        self.set_active(actor, player_id, true)
    }

    fn set_active(
        &self,
        actor: &Actor,
        player_id: &PlayerId,
        active: bool,
    ) -> Result<Player, RecordingError> {
        Self::require_manager(actor, "change the active roster")?;

        let mut player = self.load_player(player_id)?;
        player.is_active = active;
        self.store.save_player(&player)?;

        info!(
            "{} {} {}",
            actor.player_id,
            if active { "activated" } else { "deactivated" },
            player.id
        );
        Ok(player)
    }

    /// Store a new draft game created by `actor`.
    pub fn create_game(&self, actor: &Actor, game: Game) -> Result<Game, RecordingError> {
        Self::require_manager(actor, "create games")?;

        let game = game.with_creator(actor.player_id.clone());
        self.store.save_game(&game)?;
        info!(
            "{} created game {} ({}, {}) against {}",
            actor.player_id,
            game.id,
            game.round_name(),
            game.phase,
            game.opponent
        );
        Ok(game)
    }

    /// Players who confirmed they will play.
    pub fn confirmed_players(&self, game_id: &GameId) -> Result<Vec<Player>, RecordingError> {
        self.load_game(game_id)?;
        self.players_with(game_id, |s| s == AvailabilityStatus::Confirmed)
    }

    /// Players who confirmed or answered maybe.
    pub fn available_players(&self, game_id: &GameId) -> Result<Vec<Player>, RecordingError> {
        self.load_game(game_id)?;
        self.players_with(game_id, |s| s.is_available())
    }

    pub fn availability_summary(
        &self,
        game_id: &GameId,
    ) -> Result<AvailabilitySummary, RecordingError> {
        self.load_game(game_id)?;
        let answers = self.store.availabilities(game_id)?;
        Ok(AvailabilitySummary::from_availabilities(&answers))
    }

    /// Balanced pairs from the game's confirmed players.
    pub fn suggest_pairs(&self, game_id: &GameId) -> Result<Vec<PairSuggestion>, RecordingError> {
        let confirmed = self.confirmed_players(game_id)?;
        let suggestions = balance_pairs(&confirmed);

        if confirmed.len() % 2 == 1 {
            debug!(
                "Odd number of confirmed players ({}), one left without a pair",
                confirmed.len()
            );
        }
        info!(
            "Suggested {} pairs from {} confirmed players for game {}",
            suggestions.len(),
            confirmed.len(),
            game_id
        );
        Ok(suggestions)
    }

    /// Validate a hand-picked composition and store it in court order.
    pub fn compose_pairs(
        &self,
        actor: &Actor,
        game_id: &GameId,
        slots: &[PairSlot],
    ) -> Result<PairingConfirmation, RecordingError> {
        Self::require_manager(actor, "compose pairs")?;

        let game = self.load_game(game_id)?;
        if game.status.is_terminal() {
            return Err(RecordingError::GameClosed(game.id));
        }

        let roster = self.active_roster()?;
        let ordered = self.rules.pairing.validate_manual_pairs(slots, &roster)?;

        let pairs: Vec<Pair> = ordered
            .iter()
            .zip(1u32..)
            .map(|(suggestion, order)| Pair::from_suggestion(game.id.clone(), suggestion, order))
            .collect();

        self.store.replace_pairs(&game.id, &pairs)?;
        info!("{} composed {} pairs for game {}", actor.player_id, pairs.len(), game.id);

        Ok(PairingConfirmation {
            game_id: game.id,
            pairs,
        })
    }

    /// Store the balanced suggestion for the game as its pairs.
    pub fn accept_suggestions(
        &self,
        actor: &Actor,
        game_id: &GameId,
    ) -> Result<PairingConfirmation, RecordingError> {
        Self::require_manager(actor, "compose pairs")?;

        let slots: Vec<PairSlot> = self
            .suggest_pairs(game_id)?
            .into_iter()
            .map(|s| PairSlot::new(s.player1, s.player2))
            .collect();
        self.compose_pairs(actor, game_id, &slots)
    }

    /// Resolve every submitted pair result, award team points and conclude the game.
    ///
    /// Nothing is written unless every entry and the points rule succeed.
    pub fn record_results(
        &self,
        actor: &Actor,
        game_id: &GameId,
        submission: &ResultSubmission,
    ) -> Result<RecordingConfirmation, RecordingError> {
        Self::require_manager(actor, "record results")?;

        let mut game = self.load_game(game_id)?;
        if game.status == GameStatus::Concluded || !self.store.results(&game.id)?.is_empty() {
            return Err(RecordingError::AlreadyRecorded(game.id));
        }
        if submission.entries.is_empty() && !submission.no_show {
            return Err(RecordingError::NoResults(game.id));
        }

        let pairs: HashMap<PairId, Pair> = self
            .store
            .pairs(&game.id)?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let mut seen = HashSet::new();
        let mut results = Vec::with_capacity(submission.entries.len());
        for entry in &submission.entries {
            let pair = pairs
                .get(&entry.pair_id)
                .ok_or_else(|| RecordingError::UnknownPair {
                    pair: entry.pair_id.clone(),
                    game: game.id.clone(),
                })?;
            if !seen.insert(&pair.id) {
                return Err(RecordingError::DuplicateEntry(pair.id.clone()));
            }

            let outcome = resolve_match(entry.set1, entry.set2, entry.set3).map_err(|source| {
                RecordingError::PairResult {
                    pair_order: pair.pair_order,
                    source,
                }
            })?;

            results.push(
                MatchResult::new(
                    game.id.clone(),
                    pair.id.clone(),
                    entry.set1,
                    entry.set2,
                    entry.set3,
                    outcome,
                )
                .with_notes(entry.notes.clone()),
            );
        }

        let outcomes: Vec<_> = results.iter().map(MatchResult::outcome).collect();
        let team_points = self.rules.points.team_points(
            game.phase,
            &outcomes,
            submission.no_show,
            submission.manual_points,
        )?;

        game.conclude(team_points, submission.no_show)?;
        self.store.commit_results(&game, &results)?;

        let summary = summarize_results(&results);
        info!(
            "Recorded {} results for game {} ({}): {} sets won, {} lost, team points {:?}",
            results.len(),
            game.id,
            game.phase,
            summary.total_sets_won,
            summary.total_sets_lost,
            team_points
        );

        Ok(RecordingConfirmation {
            game_id: game.id,
            team_points,
            summary,
            results_stored: results.len(),
        })
    }

    /// Open or close the availability call, or cancel the game.
    pub fn transition(
        &self,
        actor: &Actor,
        game_id: &GameId,
        next: GameStatus,
    ) -> Result<Game, RecordingError> {
        Self::require_manager(actor, "change game status")?;
        if next == GameStatus::Concluded {
            return Err(RecordingError::ConcludeWithoutResults);
        }

        let mut game = self.load_game(game_id)?;
        let previous = game.status;
        game.transition(next)?;
        self.store.save_game(&game)?;

        info!("Game {} moved from {} to {}", game.id, previous, next);
        Ok(game)
    }

    /// Totals over the stored results of a game.
    pub fn summary(&self, game_id: &GameId) -> Result<GameSummary, RecordingError> {
        self.load_game(game_id)?;
        let results = self.store.results(game_id)?;
        Ok(summarize_results(&results))
    }
}
