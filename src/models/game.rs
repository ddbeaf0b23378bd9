//! Fixture (game) model: competition phase, round naming and status lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use super::{EntityId, GameId, PlayerId};
use crate::scoring::ScoringError;

/// Round number reserved for training sessions.
pub const TRAINING_ROUND: u32 = 0;

/// Round number reserved for tournament games.
pub const TOURNAMENT_ROUND: u32 = 999;

/// Stage of a tournament fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TournamentStage {
    Open,
    QuarterFinal,
    SemiFinal,
    Final,
}

/// Competition category of a fixture. Governs the team points rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Phase {
    League,
    Tournament(TournamentStage),
    Training,
}

impl Phase {
    /// Display label as used by the club.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::League => "Liga de Clubes",
            Phase::Tournament(TournamentStage::Open) => "Torneio",
            Phase::Tournament(TournamentStage::QuarterFinal) => "Quartos de Final",
            Phase::Tournament(TournamentStage::SemiFinal) => "Meia Final",
            Phase::Tournament(TournamentStage::Final) => "Final",
            Phase::Training => "Treino",
        }
    }

    /// Parse a phase label, failing on anything outside the known vocabulary.
    pub fn from_label(label: &str) -> Result<Self, ScoringError> {
        match label.trim() {
            "Liga de Clubes" => Ok(Phase::League),
            "Torneio" => Ok(Phase::Tournament(TournamentStage::Open)),
            "Quartos de Final" => Ok(Phase::Tournament(TournamentStage::QuarterFinal)),
            "Meia Final" => Ok(Phase::Tournament(TournamentStage::SemiFinal)),
            "Final" => Ok(Phase::Tournament(TournamentStage::Final)),
            "Treino" => Ok(Phase::Training),
            other => Err(ScoringError::UnknownPhase(other.to_string())),
        }
    }

    pub fn is_tournament(&self) -> bool {
        matches!(self, Phase::Tournament(_))
    }
}

impl FromStr for Phase {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::from_label(s)
    }
}

impl TryFrom<String> for Phase {
    type Error = ScoringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Phase::from_label(&value)
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> Self {
        phase.label().to_string()
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Kind of round, derived from the round number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundKind {
    Training,
    Tournament,
    League(u32),
}

impl RoundKind {
    pub fn from_round_number(round_number: u32) -> Self {
        match round_number {
            TRAINING_ROUND => RoundKind::Training,
            TOURNAMENT_ROUND => RoundKind::Tournament,
            n => RoundKind::League(n),
        }
    }

    /// Human-readable round name ("Treino", "Torneios", "Jornada N").
    pub fn name(&self) -> String {
        match self {
            RoundKind::Training => "Treino".to_string(),
            RoundKind::Tournament => "Torneios".to_string(),
            RoundKind::League(n) => format!("Jornada {}", n),
        }
    }

    /// Phases selectable for a new game of this round kind.
    pub fn phase_options(&self) -> Vec<Phase> {
        match self {
            RoundKind::Training => vec![Phase::Training],
            RoundKind::Tournament => vec![
                Phase::Tournament(TournamentStage::Open),
                Phase::Tournament(TournamentStage::QuarterFinal),
                Phase::Tournament(TournamentStage::SemiFinal),
                Phase::Tournament(TournamentStage::Final),
            ],
            RoundKind::League(_) => vec![Phase::League],
        }
    }
}

/// Lifecycle status of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Draft,
    /// Availability call is open
    CallOpen,
    /// Availability call is closed, squad is settled
    CallClosed,
    Concluded,
    Cancelled,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::Concluded | GameStatus::Cancelled)
    }

    /// Returns true if the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: GameStatus) -> bool {
        use GameStatus::*;
        match (self, next) {
            (Draft, CallOpen) => true,
            (CallOpen, CallClosed) | (CallClosed, CallOpen) => true,
            (CallOpen, Concluded) | (CallClosed, Concluded) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::Draft => write!(f, "draft"),
            GameStatus::CallOpen => write!(f, "call_open"),
            GameStatus::CallClosed => write!(f, "call_closed"),
            GameStatus::Concluded => write!(f, "concluded"),
            GameStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Errors raised by the fixture lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameStateError {
    #[error("Cannot move game from {from} to {to}")]
    InvalidTransition { from: GameStatus, to: GameStatus },
}

/// A scheduled fixture between the team and an opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Unique identifier (derived from round + date + opponent + phase)
    pub id: GameId,

    pub round_number: u32,

    pub game_date: DateTime<Utc>,

    pub opponent: String,

    pub location: String,

    pub phase: Phase,

    #[serde(default)]
    pub status: GameStatus,

    /// Points awarded to the team; set once, on conclusion
    #[serde(default)]
    pub team_points: Option<i32>,

    /// The opponent did not show up
    #[serde(default)]
    pub no_show: bool,

    #[serde(default)]
    pub created_by: Option<PlayerId>,
}

impl Game {
    /// Create a new draft Game with auto-generated ID.
    pub fn new(
        round_number: u32,
        game_date: DateTime<Utc>,
        opponent: String,
        location: String,
        phase: Phase,
    ) -> Self {
        let id = EntityId::generate(&[
            &round_number.to_string(),
            &game_date.to_rfc3339(),
            &opponent,
            phase.label(),
        ]);

        Self {
            id,
            round_number,
            game_date,
            opponent,
            location,
            phase,
            status: GameStatus::Draft,
            team_points: None,
            no_show: false,
            created_by: None,
        }
    }

    /// Builder method to set the creating player.
    pub fn with_creator(mut self, player_id: PlayerId) -> Self {
        self.created_by = Some(player_id);
        self
    }

    pub fn round_kind(&self) -> RoundKind {
        RoundKind::from_round_number(self.round_number)
    }

    pub fn round_name(&self) -> String {
        self.round_kind().name()
    }

    /// Move the game to `next`, enforcing the lifecycle.
    pub fn transition(&mut self, next: GameStatus) -> Result<(), GameStateError> {
        if !self.status.can_transition_to(next) {
            return Err(GameStateError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Conclude the game, recording team points and the no-show flag.
    pub fn conclude(&mut self, team_points: Option<i32>, no_show: bool) -> Result<(), GameStateError> {
        self.transition(GameStatus::Concluded)?;
        self.team_points = team_points;
        self.no_show = no_show;
        Ok(())
    }
}
