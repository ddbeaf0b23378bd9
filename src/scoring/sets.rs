//! Tennis set validation and best-of-three match resolution.

use super::ScoringError;
use crate::models::{MatchOutcome, SetScore};

/// Returns true if `own`–`opponent` is a finished set.
///
/// Accepted results are 6–0 through 6–4, 7–5 and 7–6, in either direction.
/// A tied set (6–6) is never finished; there is no separate tiebreak score.
pub fn is_valid_set(own: u32, opponent: u32) -> bool {
    if own < 6 && opponent < 6 {
        return false;
    }

    matches!(
        (own, opponent),
        (6, 0..=4) | (0..=4, 6) | (7, 5 | 6) | (5 | 6, 7)
    )
}

/// State of a match once the two mandatory sets are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterTwoSets {
    /// 2–0 or 0–2: no third set may be played
    Decided(MatchOutcome),
    /// 1–1: a third set is required
    Level,
}

impl AfterTwoSets {
    fn from_sets(set1: SetScore, set2: SetScore) -> Self {
        match (set1.is_won(), set2.is_won()) {
            (true, true) => AfterTwoSets::Decided(MatchOutcome::new(2, 0)),
            (false, false) => AfterTwoSets::Decided(MatchOutcome::new(0, 2)),
            _ => AfterTwoSets::Level,
        }
    }
}

fn check_set(set: u8, score: SetScore) -> Result<(), ScoringError> {
    if is_valid_set(score.own, score.opponent) {
        Ok(())
    } else {
        Err(ScoringError::InvalidSetScore { set, score })
    }
}

/// Derive sets won and lost for one pair from its set scores.
pub fn resolve_match(
    set1: SetScore,
    set2: SetScore,
    set3: Option<SetScore>,
) -> Result<MatchOutcome, ScoringError> {
    check_set(1, set1)?;
    check_set(2, set2)?;

    match (AfterTwoSets::from_sets(set1, set2), set3) {
        (AfterTwoSets::Decided(outcome), None) => Ok(outcome),
        (AfterTwoSets::Decided(_), Some(_)) => Err(ScoringError::UnexpectedThirdSet),
        (AfterTwoSets::Level, None) => Err(ScoringError::MissingThirdSet),
        (AfterTwoSets::Level, Some(decider)) => {
            check_set(3, decider)?;
            if decider.is_won() {
                Ok(MatchOutcome::new(2, 1))
            } else {
                Ok(MatchOutcome::new(1, 2))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FINISHED: [(u32, u32); 7] = [(6, 0), (6, 1), (6, 2), (6, 3), (6, 4), (7, 5), (7, 6)];

    fn set(own: u32, opponent: u32) -> SetScore {
        SetScore::new(own, opponent)
    }

    #[test]
    fn test_valid_set_examples() {
        assert!(is_valid_set(6, 4));
        assert!(!is_valid_set(6, 5));
        assert!(is_valid_set(7, 5));
        assert!(!is_valid_set(7, 7));
        assert!(!is_valid_set(6, 6));
        assert!(!is_valid_set(8, 6));
        assert!(!is_valid_set(5, 3));
        assert!(!is_valid_set(0, 0));
    }

    #[test]
    fn test_valid_set_boundary_exhaustive() {
        for a in 0..=12 {
            for b in 0..=12 {
                let expected = FINISHED.contains(&(a, b)) || FINISHED.contains(&(b, a));
                assert_eq!(is_valid_set(a, b), expected, "{}-{}", a, b);
                assert_eq!(is_valid_set(a, b), is_valid_set(b, a), "symmetry {}-{}", a, b);
            }
        }
    }

    #[test]
    fn test_straight_sets_win() {
        let outcome = resolve_match(set(6, 2), set(6, 3), None).unwrap();
        assert_eq!(outcome, MatchOutcome::new(2, 0));
    }

    #[test]
    fn test_straight_sets_loss() {
        let outcome = resolve_match(set(4, 6), set(5, 7), None).unwrap();
        assert_eq!(outcome, MatchOutcome::new(0, 2));
    }

    #[test]
    fn test_three_set_win() {
        let outcome = resolve_match(set(6, 2), set(3, 6), Some(set(7, 6))).unwrap();
        assert_eq!(outcome, MatchOutcome::new(2, 1));
    }

    #[test]
    fn test_three_set_loss() {
        let outcome = resolve_match(set(2, 6), set(6, 3), Some(set(6, 7))).unwrap();
        assert_eq!(outcome, MatchOutcome::new(1, 2));
    }

    #[test]
    fn test_missing_third_set() {
        let err = resolve_match(set(6, 2), set(3, 6), None).unwrap_err();
        assert_eq!(err, ScoringError::MissingThirdSet);
    }

    #[test]
    fn test_unexpected_third_set() {
        let err = resolve_match(set(6, 2), set(6, 3), Some(set(6, 0))).unwrap_err();
        assert_eq!(err, ScoringError::UnexpectedThirdSet);

        let err = resolve_match(set(0, 6), set(3, 6), Some(set(6, 0))).unwrap_err();
        assert_eq!(err, ScoringError::UnexpectedThirdSet);
    }

    #[test]
    fn test_invalid_set_named() {
        let err = resolve_match(set(6, 5), set(6, 3), None).unwrap_err();
        assert_eq!(
            err,
            ScoringError::InvalidSetScore {
                set: 1,
                score: set(6, 5)
            }
        );

        let err = resolve_match(set(6, 1), set(8, 6), None).unwrap_err();
        assert_eq!(
            err,
            ScoringError::InvalidSetScore {
                set: 2,
                score: set(8, 6)
            }
        );

        let err = resolve_match(set(6, 1), set(1, 6), Some(set(6, 6))).unwrap_err();
        assert_eq!(
            err,
            ScoringError::InvalidSetScore {
                set: 3,
                score: set(6, 6)
            }
        );
    }

    #[test]
    fn test_decisiveness_over_all_valid_pairs() {
        let sets: Vec<SetScore> = FINISHED
            .iter()
            .flat_map(|&(a, b)| [set(a, b), set(b, a)])
            .collect();

        for &s1 in &sets {
            for &s2 in &sets {
                let decided = s1.is_won() == s2.is_won();
                if decided {
                    assert_eq!(
                        resolve_match(s1, s2, Some(set(6, 0))),
                        Err(ScoringError::UnexpectedThirdSet)
                    );
                } else {
                    assert_eq!(resolve_match(s1, s2, None), Err(ScoringError::MissingThirdSet));
                }
            }
        }
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let first = resolve_match(set(6, 2), set(3, 6), Some(set(7, 5)));
        let second = resolve_match(set(6, 2), set(3, 6), Some(set(7, 5)));
        assert_eq!(first, second);
    }
}
