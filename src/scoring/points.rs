//! Team points awarded for a concluded fixture.

use serde::{Deserialize, Serialize};

use super::ScoringError;
use crate::models::{GameOutcome, GameSummary, MatchOutcome, MatchResult, Phase};

/// Point values for league fixtures and the manual-entry policy for tournaments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsRules {
    /// Awarded when the team wins more sets than it loses
    #[serde(default = "default_league_win")]
    pub league_win: i32,

    /// Awarded for every other played league fixture
    #[serde(default = "default_league_loss")]
    pub league_loss: i32,

    /// Awarded when the team did not show up
    #[serde(default)]
    pub no_show: i32,

    /// Accept negative manually entered tournament points
    #[serde(default)]
    pub allow_negative_manual: bool,
}

fn default_league_win() -> i32 {
    3
}

fn default_league_loss() -> i32 {
    1
}

impl Default for PointsRules {
    fn default() -> Self {
        Self {
            league_win: default_league_win(),
            league_loss: default_league_loss(),
            no_show: 0,
            allow_negative_manual: false,
        }
    }
}

impl PointsRules {
    /// Points for a fixture in `phase`.
    ///
    /// Returns `Ok(None)` for training, which never awards points.
    pub fn team_points(
        &self,
        phase: Phase,
        outcomes: &[MatchOutcome],
        no_show: bool,
        manual_points: Option<i32>,
    ) -> Result<Option<i32>, ScoringError> {
        match phase {
            Phase::League => {
                if no_show {
                    return Ok(Some(self.no_show));
                }
                // An aggregate tie counts as a loss; there is no draw.
                let total = aggregate_outcomes(outcomes);
                if total.is_win() {
                    Ok(Some(self.league_win))
                } else {
                    Ok(Some(self.league_loss))
                }
            }
            Phase::Tournament(_) => {
                let points = manual_points.ok_or(ScoringError::MissingManualPoints)?;
                if points < 0 && !self.allow_negative_manual {
                    return Err(ScoringError::NegativeManualPoints(points));
                }
                Ok(Some(points))
            }
            Phase::Training => Ok(None),
        }
    }
}

/// Points for a fixture under the default rules (3 win, 1 loss, 0 no-show).
pub fn team_points(
    phase: Phase,
    outcomes: &[MatchOutcome],
    no_show: bool,
    manual_points: Option<i32>,
) -> Result<Option<i32>, ScoringError> {
    PointsRules::default().team_points(phase, outcomes, no_show, manual_points)
}

/// Sum sets won and lost over several matches, saturating at `u32::MAX`.
pub fn aggregate_outcomes(outcomes: &[MatchOutcome]) -> MatchOutcome {
    outcomes
        .iter()
        .fold(MatchOutcome::default(), |acc, o| MatchOutcome {
            sets_won: acc.sets_won.saturating_add(o.sets_won),
            sets_lost: acc.sets_lost.saturating_add(o.sets_lost),
        })
}

/// Summarize the stored results of one game.
pub fn summarize_results(results: &[MatchResult]) -> GameSummary {
    let outcomes: Vec<MatchOutcome> = results.iter().map(MatchResult::outcome).collect();
    let total = aggregate_outcomes(&outcomes);

    GameSummary {
        total_sets_won: total.sets_won,
        total_sets_lost: total.sets_lost,
        pairs_with_results: results.len(),
        outcome: if total.is_win() {
            GameOutcome::Win
        } else {
            GameOutcome::Loss
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityId, SetScore, TournamentStage};

    fn outcome(won: u32, lost: u32) -> MatchOutcome {
        MatchOutcome::new(won, lost)
    }

    #[test]
    fn test_league_win() {
        let points = team_points(Phase::League, &[outcome(2, 1)], false, None).unwrap();
        assert_eq!(points, Some(3));
    }

    #[test]
    fn test_league_no_show() {
        let points = team_points(Phase::League, &[outcome(2, 1)], true, None).unwrap();
        assert_eq!(points, Some(0));
    }

    #[test]
    fn test_league_loss() {
        let points = team_points(Phase::League, &[outcome(1, 2)], false, None).unwrap();
        assert_eq!(points, Some(1));
    }

    #[test]
    fn test_league_aggregates_across_pairs() {
        // Two pairs lose 0-2, one wins 2-0: 2 sets won, 4 lost.
        let outcomes = [outcome(0, 2), outcome(0, 2), outcome(2, 0)];
        assert_eq!(team_points(Phase::League, &outcomes, false, None).unwrap(), Some(1));

        // Two pairs win 2-1, one loses 0-2: 4 won, 4 lost is still a loss.
        let outcomes = [outcome(2, 1), outcome(2, 1), outcome(0, 2)];
        assert_eq!(team_points(Phase::League, &outcomes, false, None).unwrap(), Some(1));

        let outcomes = [outcome(2, 0), outcome(2, 1), outcome(0, 2)];
        assert_eq!(team_points(Phase::League, &outcomes, false, None).unwrap(), Some(3));
    }

    #[test]
    fn test_aggregate_saturates() {
        let total = aggregate_outcomes(&[outcome(u32::MAX, 0), outcome(1, 2), outcome(0, 1)]);
        assert_eq!(total, outcome(u32::MAX, 3));

        let points = team_points(Phase::League, &[outcome(u32::MAX, 0), outcome(2, 0)], false, None);
        assert_eq!(points, Ok(Some(3)));
    }

    #[test]
    fn test_league_ignores_manual_points() {
        let points = team_points(Phase::League, &[outcome(2, 0)], false, Some(10)).unwrap();
        assert_eq!(points, Some(3));
    }

    #[test]
    fn test_tournament_passes_manual_points_through() {
        for stage in [
            TournamentStage::Open,
            TournamentStage::QuarterFinal,
            TournamentStage::SemiFinal,
            TournamentStage::Final,
        ] {
            let points = team_points(Phase::Tournament(stage), &[], false, Some(7)).unwrap();
            assert_eq!(points, Some(7));
        }
    }

    #[test]
    fn test_tournament_requires_manual_points() {
        let err = team_points(
            Phase::Tournament(TournamentStage::Open),
            &[outcome(2, 0)],
            false,
            None,
        )
        .unwrap_err();
        assert_eq!(err, ScoringError::MissingManualPoints);
    }

    #[test]
    fn test_tournament_negative_points_policy() {
        let phase = Phase::Tournament(TournamentStage::Final);
        assert_eq!(
            team_points(phase, &[], false, Some(-2)),
            Err(ScoringError::NegativeManualPoints(-2))
        );

        let rules = PointsRules {
            allow_negative_manual: true,
            ..PointsRules::default()
        };
        assert_eq!(rules.team_points(phase, &[], false, Some(-2)), Ok(Some(-2)));
    }

    #[test]
    fn test_training_awards_nothing() {
        assert_eq!(team_points(Phase::Training, &[outcome(2, 0)], false, None), Ok(None));
        assert_eq!(team_points(Phase::Training, &[], true, Some(5)), Ok(None));
    }

    #[test]
    fn test_custom_league_values() {
        let rules = PointsRules {
            league_win: 2,
            league_loss: 0,
            no_show: -1,
            allow_negative_manual: false,
        };
        assert_eq!(rules.team_points(Phase::League, &[outcome(2, 0)], false, None), Ok(Some(2)));
        assert_eq!(rules.team_points(Phase::League, &[outcome(0, 2)], false, None), Ok(Some(0)));
        assert_eq!(rules.team_points(Phase::League, &[], true, None), Ok(Some(-1)));
    }

    #[test]
    fn test_team_points_idempotent() {
        let outcomes = [outcome(2, 1), outcome(1, 2), outcome(2, 0)];
        assert_eq!(
            team_points(Phase::League, &outcomes, false, None),
            team_points(Phase::League, &outcomes, false, None)
        );
    }

    #[test]
    fn test_summarize_results() {
        let result = |pair: &str, won, lost| {
            MatchResult::new(
                EntityId::from("game-1"),
                EntityId::from(pair),
                SetScore::new(6, 0),
                SetScore::new(6, 0),
                None,
                outcome(won, lost),
            )
        };
        let results = vec![result("p1", 2, 0), result("p2", 1, 2), result("p3", 2, 1)];

        let summary = summarize_results(&results);

        assert_eq!(summary.total_sets_won, 5);
        assert_eq!(summary.total_sets_lost, 3);
        assert_eq!(summary.pairs_with_results, 3);
        assert_eq!(summary.outcome, GameOutcome::Win);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize_results(&[]);
        assert_eq!(summary.pairs_with_results, 0);
        assert_eq!(summary.outcome, GameOutcome::Loss);
    }
}
