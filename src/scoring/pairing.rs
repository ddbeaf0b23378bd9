//! Pair composition: automatic balancing by ranking and manual validation.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::ScoringError;
use crate::models::{PairSlot, PairSuggestion, Player, PlayerId};

/// How many complete pairs a game may field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairLimits {
    #[serde(default = "default_min_pairs")]
    pub min_pairs: usize,

    #[serde(default = "default_max_pairs")]
    pub max_pairs: usize,
}

fn default_min_pairs() -> usize {
    2
}

fn default_max_pairs() -> usize {
    3
}

impl Default for PairLimits {
    fn default() -> Self {
        Self {
            min_pairs: default_min_pairs(),
            max_pairs: default_max_pairs(),
        }
    }
}

impl PairLimits {
    /// Check a hand-picked composition and return it ordered strongest first.
    pub fn validate_manual_pairs(
        &self,
        slots: &[PairSlot],
        roster: &[Player],
    ) -> Result<Vec<PairSuggestion>, ScoringError> {
        let mut complete = Vec::new();
        for (index, slot) in slots.iter().enumerate() {
            if slot.is_empty() {
                continue;
            }
            match slot.players() {
                Some(players) => complete.push(players),
                None => return Err(ScoringError::IncompletePair { slot: index + 1 }),
            }
        }

        if complete.len() < self.min_pairs {
            return Err(ScoringError::TooFewPairs {
                found: complete.len(),
                min: self.min_pairs,
            });
        }
        if complete.len() > self.max_pairs {
            return Err(ScoringError::TooManyPairs {
                found: complete.len(),
                max: self.max_pairs,
            });
        }

        let mut seen: HashSet<&PlayerId> = HashSet::new();
        for &(first, second) in &complete {
            for id in [first, second] {
                if !seen.insert(id) {
                    return Err(ScoringError::DuplicatePlayer(id.clone()));
                }
            }
        }

        let by_id: HashMap<&PlayerId, &Player> = roster.iter().map(|p| (&p.id, p)).collect();
        let lookup = |id: &PlayerId| {
            by_id
                .get(id)
                .copied()
                .ok_or_else(|| ScoringError::UnknownPlayer(id.clone()))
        };

        let mut pairs = complete
            .into_iter()
            .map(|(first, second)| -> Result<PairSuggestion, ScoringError> {
                Ok(PairSuggestion::from_players(lookup(first)?, lookup(second)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        order_by_strength(&mut pairs);
        Ok(pairs)
    }
}

/// Suggest pairs by matching the strongest remaining player with the weakest.
///
/// With an odd roster the middle-ranked player is left out. The result is a
/// heuristic balance, not a global optimum, and is ordered strongest first.
pub fn balance_pairs(players: &[Player]) -> Vec<PairSuggestion> {
    let mut seen: HashSet<PlayerId> = HashSet::new();
    let mut ranked: Vec<&Player> = players
        .iter()
        .filter(|p| seen.insert(p.id.clone()))
        .collect();
    ranked.sort_by(|a, b| b.federation_points.cmp(&a.federation_points));

    let n = ranked.len();
    let mut pairs: Vec<PairSuggestion> = (0..n / 2)
        .map(|i| PairSuggestion::from_players(ranked[i], ranked[n - 1 - i]))
        .collect();

    order_by_strength(&mut pairs);
    pairs
}

/// Validate a manual composition under the default limits (2 to 3 pairs).
pub fn validate_manual_pairs(
    slots: &[PairSlot],
    roster: &[Player],
) -> Result<Vec<PairSuggestion>, ScoringError> {
    PairLimits::default().validate_manual_pairs(slots, roster)
}

fn order_by_strength(pairs: &mut [PairSuggestion]) {
    pairs.sort_by(|a, b| b.total_points.cmp(&a.total_points));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityId;
    use pretty_assertions::assert_eq;

    fn player(id: &str, points: u32) -> Player {
        Player::new(id, points).with_id(id)
    }

    fn suggestion(a: &str, b: &str, total: u64) -> PairSuggestion {
        PairSuggestion {
            player1: EntityId::from(a),
            player2: EntityId::from(b),
            total_points: total,
        }
    }

    fn roster() -> Vec<Player> {
        vec![
            player("A", 1500),
            player("B", 1000),
            player("C", 1200),
            player("D", 900),
            player("E", 1450),
            player("F", 1100),
        ]
    }

    fn is_non_increasing(pairs: &[PairSuggestion]) -> bool {
        pairs.windows(2).all(|w| w[0].total_points >= w[1].total_points)
    }

    #[test]
    fn test_balance_four_players() {
        let players = vec![
            player("A", 1500),
            player("B", 1000),
            player("C", 1200),
            player("D", 900),
        ];

        let pairs = balance_pairs(&players);

        assert_eq!(
            pairs,
            vec![suggestion("A", "D", 2400), suggestion("C", "B", 2200)]
        );
    }

    #[test]
    fn test_balance_odd_roster_drops_middle() {
        let players = vec![
            player("A", 1500),
            player("B", 1300),
            player("C", 1200),
            player("D", 1000),
            player("E", 800),
        ];

        let pairs = balance_pairs(&players);

        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.player1.as_str() != "C" && p.player2.as_str() != "C"));
        assert_eq!(
            pairs,
            vec![suggestion("A", "E", 2300), suggestion("B", "D", 2300)]
        );
    }

    #[test]
    fn test_balance_conservation_and_order() {
        for n in 0..=roster().len() {
            let players: Vec<Player> = roster().into_iter().take(n).collect();
            let pairs = balance_pairs(&players);

            assert_eq!(pairs.len(), n / 2);
            assert!(is_non_increasing(&pairs));

            let mut ids = HashSet::new();
            for pair in &pairs {
                assert!(ids.insert(pair.player1.clone()));
                assert!(ids.insert(pair.player2.clone()));
            }
        }
    }

    #[test]
    fn test_balance_ignores_repeated_player() {
        let players = vec![player("A", 1500), player("A", 1500), player("B", 900)];
        let pairs = balance_pairs(&players);
        assert_eq!(pairs, vec![suggestion("A", "B", 2400)]);
    }

    #[test]
    fn test_balance_at_ranking_limit() {
        let players = vec![player("A", u32::MAX), player("B", 1)];

        let pairs = balance_pairs(&players);

        assert_eq!(pairs, vec![suggestion("A", "B", u64::from(u32::MAX) + 1)]);

        let slots = vec![PairSlot::new("A", "B")];
        let limits = PairLimits {
            min_pairs: 1,
            max_pairs: 3,
        };
        let manual = limits.validate_manual_pairs(&slots, &players).unwrap();
        assert_eq!(manual[0].total_points, u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_balance_idempotent() {
        assert_eq!(balance_pairs(&roster()), balance_pairs(&roster()));
    }

    #[test]
    fn test_balance_too_few_players() {
        assert!(balance_pairs(&[]).is_empty());
        assert!(balance_pairs(&[player("A", 100)]).is_empty());
    }

    #[test]
    fn test_manual_pairs_ordered() {
        let slots = vec![
            PairSlot::new("B", "D"),
            PairSlot::empty(),
            PairSlot::new("A", "C"),
        ];

        let pairs = validate_manual_pairs(&slots, &roster()).unwrap();

        assert_eq!(
            pairs,
            vec![suggestion("A", "C", 2700), suggestion("B", "D", 1900)]
        );
    }

    #[test]
    fn test_manual_three_pairs() {
        let slots = vec![
            PairSlot::new("B", "D"),
            PairSlot::new("E", "F"),
            PairSlot::new("A", "C"),
        ];

        let pairs = validate_manual_pairs(&slots, &roster()).unwrap();

        assert_eq!(pairs.len(), 3);
        assert!(is_non_increasing(&pairs));
        assert_eq!(pairs[0].total_points, 2700);
    }

    #[test]
    fn test_manual_incomplete_pair() {
        let slots = vec![
            PairSlot::new("A", "B"),
            PairSlot {
                player1: None,
                player2: Some(EntityId::from("C")),
            },
            PairSlot::new("D", "E"),
        ];

        let err = validate_manual_pairs(&slots, &roster()).unwrap_err();
        assert_eq!(err, ScoringError::IncompletePair { slot: 2 });
    }

    #[test]
    fn test_manual_too_few_pairs() {
        let slots = vec![PairSlot::new("A", "B"), PairSlot::empty(), PairSlot::empty()];

        let err = validate_manual_pairs(&slots, &roster()).unwrap_err();
        assert_eq!(err, ScoringError::TooFewPairs { found: 1, min: 2 });
    }

    #[test]
    fn test_manual_too_many_pairs() {
        let mut players = roster();
        players.push(player("G", 700));
        players.push(player("H", 600));
        let slots = vec![
            PairSlot::new("A", "B"),
            PairSlot::new("C", "D"),
            PairSlot::new("E", "F"),
            PairSlot::new("G", "H"),
        ];

        let err = validate_manual_pairs(&slots, &players).unwrap_err();
        assert_eq!(err, ScoringError::TooManyPairs { found: 4, max: 3 });
    }

    #[test]
    fn test_manual_duplicate_across_pairs() {
        let slots = vec![PairSlot::new("A", "B"), PairSlot::new("C", "A")];

        let err = validate_manual_pairs(&slots, &roster()).unwrap_err();
        assert_eq!(err, ScoringError::DuplicatePlayer(EntityId::from("A")));
    }

    #[test]
    fn test_manual_same_player_twice_in_pair() {
        let slots = vec![PairSlot::new("A", "A"), PairSlot::new("C", "D")];

        let err = validate_manual_pairs(&slots, &roster()).unwrap_err();
        assert_eq!(err, ScoringError::DuplicatePlayer(EntityId::from("A")));
    }

    #[test]
    fn test_manual_unknown_player() {
        let slots = vec![PairSlot::new("A", "B"), PairSlot::new("C", "Z")];

        let err = validate_manual_pairs(&slots, &roster()).unwrap_err();
        assert_eq!(err, ScoringError::UnknownPlayer(EntityId::from("Z")));
    }

    #[test]
    fn test_custom_limits() {
        let limits = PairLimits {
            min_pairs: 1,
            max_pairs: 1,
        };

        let ok = limits.validate_manual_pairs(&[PairSlot::new("A", "B")], &roster());
        assert_eq!(ok, Ok(vec![suggestion("A", "B", 2500)]));

        let err = limits
            .validate_manual_pairs(&[PairSlot::new("A", "B"), PairSlot::new("C", "D")], &roster())
            .unwrap_err();
        assert_eq!(err, ScoringError::TooManyPairs { found: 2, max: 1 });
    }
}
