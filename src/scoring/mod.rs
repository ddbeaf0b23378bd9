//! Match scoring and points engine.
//!
//! Pure functions over plain values:
//! - Tennis set validation and best-of-three match resolution
//! - Team points by competition phase
//! - Ranking-balanced pair suggestions and manual pair validation
//!
//! Nothing here performs I/O or holds state.

mod pairing;
mod points;
mod sets;

pub use pairing::{balance_pairs, validate_manual_pairs, PairLimits};
pub use points::{aggregate_outcomes, summarize_results, team_points, PointsRules};
pub use sets::{is_valid_set, resolve_match, AfterTwoSets};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{PlayerId, SetScore};

/// Errors raised by the scoring engine. None of them are retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("Set {set} has an invalid score: {score}")]
    InvalidSetScore { set: u8, score: SetScore },

    #[error("Set 3 is required when the first two sets are split 1-1")]
    MissingThirdSet,

    #[error("Set 3 must not be played when the first two sets decide the match")]
    UnexpectedThirdSet,

    #[error("Pair {slot} must have two players or be empty")]
    IncompletePair { slot: usize },

    #[error("At least {min} complete pairs are required, found {found}")]
    TooFewPairs { found: usize, min: usize },

    #[error("At most {max} pairs are allowed, found {found}")]
    TooManyPairs { found: usize, max: usize },

    #[error("Player {0} cannot appear in more than one pair")]
    DuplicatePlayer(PlayerId),

    #[error("Player {0} is not in the roster")]
    UnknownPlayer(PlayerId),

    #[error("Unknown phase: {0:?}")]
    UnknownPhase(String),

    #[error("Tournament games require manually entered points")]
    MissingManualPoints,

    #[error("Manual points cannot be negative: {0}")]
    NegativeManualPoints(i32),

    #[error("Invalid score {0:?}, expected a form like 6-4")]
    InvalidScoreFormat(String),
}

/// All tunable scoring rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    #[serde(default)]
    pub points: PointsRules,

    #[serde(default)]
    pub pairing: PairLimits,
}
