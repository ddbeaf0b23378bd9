//! Set scores, match outcomes and stored match results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{EntityId, GameId, PairId, ResultId};
use crate::scoring::ScoringError;

/// Games won in one set, from the pair's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetScore {
    pub own: u32,
    pub opponent: u32,
}

impl SetScore {
    pub fn new(own: u32, opponent: u32) -> Self {
        Self { own, opponent }
    }

    /// True when the pair took more games than the opponent.
    pub fn is_won(&self) -> bool {
        self.own > self.opponent
    }
}

impl FromStr for SetScore {
    type Err = ScoringError;

    /// Parse `"6-4"` (own first).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ScoringError::InvalidScoreFormat(s.to_string());
        let (own, opponent) = s.trim().split_once('-').ok_or_else(bad)?;
        let own = own.trim().parse().map_err(|_| bad())?;
        let opponent = opponent.trim().parse().map_err(|_| bad())?;
        Ok(Self { own, opponent })
    }
}

impl std::fmt::Display for SetScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.own, self.opponent)
    }
}

/// Sets won and lost by one pair in one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub sets_won: u32,
    pub sets_lost: u32,
}

impl MatchOutcome {
    pub fn new(sets_won: u32, sets_lost: u32) -> Self {
        Self {
            sets_won,
            sets_lost,
        }
    }

    pub fn is_win(&self) -> bool {
        self.sets_won > self.sets_lost
    }
}

impl FromStr for MatchOutcome {
    type Err = ScoringError;

    /// Parse `"2-1"` (sets won first).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let score: SetScore = s.parse()?;
        Ok(Self::new(score.own, score.opponent))
    }
}

/// A pair's recorded result for one game. Written once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Unique identifier (derived from game + pair)
    pub id: ResultId,

    pub game_id: GameId,

    pub pair_id: PairId,

    pub set1: SetScore,

    pub set2: SetScore,

    /// Only present when the first two sets were split
    #[serde(default)]
    pub set3: Option<SetScore>,

    pub sets_won: u32,

    pub sets_lost: u32,

    #[serde(default)]
    pub notes: Option<String>,

    /// When this record was created
    pub created_at: DateTime<Utc>,
}

impl MatchResult {
    /// Create a new result from already-resolved sets.
    pub fn new(
        game_id: GameId,
        pair_id: PairId,
        set1: SetScore,
        set2: SetScore,
        set3: Option<SetScore>,
        outcome: MatchOutcome,
    ) -> Self {
        let id = EntityId::generate(&["result", game_id.as_str(), pair_id.as_str()]);

        Self {
            id,
            game_id,
            pair_id,
            set1,
            set2,
            set3,
            sets_won: outcome.sets_won,
            sets_lost: outcome.sets_lost,
            notes: None,
            created_at: Utc::now(),
        }
    }

    /// Builder method to attach free-text notes.
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn outcome(&self) -> MatchOutcome {
        MatchOutcome::new(self.sets_won, self.sets_lost)
    }
}

/// Aggregate outcome of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcome {
    Win,
    Loss,
}

impl std::fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameOutcome::Win => write!(f, "win"),
            GameOutcome::Loss => write!(f, "loss"),
        }
    }
}

/// Totals over every pair's result in one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub total_sets_won: u32,
    pub total_sets_lost: u32,
    pub pairs_with_results: usize,
    pub outcome: GameOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_score_parse() {
        let score: SetScore = "6-4".parse().unwrap();
        assert_eq!(score, SetScore::new(6, 4));
        assert!(score.is_won());

        let score: SetScore = " 3 - 6 ".parse().unwrap();
        assert_eq!(score, SetScore::new(3, 6));
        assert!(!score.is_won());
    }

    #[test]
    fn test_set_score_parse_rejects_garbage() {
        for input in ["6", "6:4", "a-b", "-1-6", "6-"] {
            let err = input.parse::<SetScore>().unwrap_err();
            assert_eq!(err, ScoringError::InvalidScoreFormat(input.to_string()));
        }
    }

    #[test]
    fn test_set_score_display() {
        assert_eq!(SetScore::new(7, 6).to_string(), "7-6");
    }

    #[test]
    fn test_outcome_parse() {
        let outcome: MatchOutcome = "2-1".parse().unwrap();
        assert_eq!(outcome, MatchOutcome::new(2, 1));
        assert!(outcome.is_win());
    }

    #[test]
    fn test_match_result_creation() {
        let result = MatchResult::new(
            EntityId::from("game-1"),
            EntityId::from("pair-1"),
            SetScore::new(6, 2),
            SetScore::new(6, 3),
            None,
            MatchOutcome::new(2, 0),
        )
        .with_notes(Some("   ".to_string()));

        assert_eq!(result.outcome(), MatchOutcome::new(2, 0));
        assert!(result.set3.is_none());
        assert!(result.notes.is_none());
    }

    #[test]
    fn test_match_result_serialization() {
        let result = MatchResult::new(
            EntityId::from("game-1"),
            EntityId::from("pair-1"),
            SetScore::new(6, 2),
            SetScore::new(3, 6),
            Some(SetScore::new(7, 6)),
            MatchOutcome::new(2, 1),
        );

        let json = serde_json::to_string(&result).unwrap();
        let deserialized: MatchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, deserialized);
    }
}
