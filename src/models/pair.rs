//! Pair model: two players fielded together for one game.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{EntityId, GameId, PairId, Player, PlayerId};

/// A pair as stored for a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    /// Unique identifier
    pub id: PairId,

    /// Game this pair plays in
    pub game_id: GameId,

    pub player1_id: PlayerId,

    pub player2_id: PlayerId,

    /// Sum of both players' ranking points, refreshed by [`rank_pairs`] on read
    pub total_points: u64,

    /// Court order, 1 is the strongest pair
    pub pair_order: u32,
}

impl Pair {
    /// Create a stored pair from an ordered suggestion.
    pub fn from_suggestion(game_id: GameId, suggestion: &PairSuggestion, pair_order: u32) -> Self {
        let id = EntityId::generate(&[
            game_id.as_str(),
            suggestion.player1.as_str(),
            suggestion.player2.as_str(),
        ]);

        Self {
            id,
            game_id,
            player1_id: suggestion.player1.clone(),
            player2_id: suggestion.player2.clone(),
            total_points: suggestion.total_points,
            pair_order,
        }
    }

    pub fn contains(&self, player_id: &PlayerId) -> bool {
        &self.player1_id == player_id || &self.player2_id == player_id
    }
}

/// Recompute each pair's total from the roster and renumber the court order.
///
/// Pairs whose players left the roster keep their last known total. Equal
/// totals keep their previous relative order.
pub fn rank_pairs(pairs: &mut [Pair], roster: &[Player]) {
    let points: HashMap<&PlayerId, u32> = roster
        .iter()
        .map(|p| (&p.id, p.federation_points))
        .collect();

    for pair in pairs.iter_mut() {
        if let (Some(&a), Some(&b)) = (points.get(&pair.player1_id), points.get(&pair.player2_id)) {
            pair.total_points = u64::from(a) + u64::from(b);
        }
    }

    pairs.sort_by_key(|p| p.pair_order);
    pairs.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    for (pair, order) in pairs.iter_mut().zip(1u32..) {
        pair.pair_order = order;
    }
}

/// A candidate pair with its combined ranking, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairSuggestion {
    pub player1: PlayerId,
    pub player2: PlayerId,
    pub total_points: u64,
}

impl PairSuggestion {
    pub fn from_players(player1: &Player, player2: &Player) -> Self {
        Self {
            player1: player1.id.clone(),
            player2: player2.id.clone(),
            total_points: u64::from(player1.federation_points)
                + u64::from(player2.federation_points),
        }
    }
}

/// One slot of a hand-picked pair composition. Either side may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairSlot {
    #[serde(default)]
    pub player1: Option<PlayerId>,
    #[serde(default)]
    pub player2: Option<PlayerId>,
}

impl PairSlot {
    pub fn new(player1: impl Into<PlayerId>, player2: impl Into<PlayerId>) -> Self {
        Self {
            player1: Some(player1.into()),
            player2: Some(player2.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.player1.is_none() && self.player2.is_none()
    }

    /// Both players, if the slot is filled.
    pub fn players(&self) -> Option<(&PlayerId, &PlayerId)> {
        match (&self.player1, &self.player2) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_totals() {
        let a = Player::new("A", 1500);
        let b = Player::new("B", 900);
        let suggestion = PairSuggestion::from_players(&a, &b);

        assert_eq!(suggestion.total_points, 2400);
        assert_eq!(suggestion.player1, a.id);
        assert_eq!(suggestion.player2, b.id);
    }

    #[test]
    fn test_suggestion_totals_at_ranking_limit() {
        let a = Player::new("A", u32::MAX);
        let b = Player::new("B", u32::MAX);

        let suggestion = PairSuggestion::from_players(&a, &b);

        assert_eq!(suggestion.total_points, 2 * u64::from(u32::MAX));
    }

    fn stored(a: &str, b: &str, total: u64, order: u32) -> Pair {
        let suggestion = PairSuggestion {
            player1: EntityId::from(a),
            player2: EntityId::from(b),
            total_points: total,
        };
        Pair::from_suggestion(EntityId::from("game-1"), &suggestion, order)
    }

    #[test]
    fn test_rank_pairs_uses_current_points() {
        let roster = vec![
            Player::new("A", 100).with_id("A"),
            Player::new("B", 1000).with_id("B"),
            Player::new("C", 1200).with_id("C"),
            Player::new("D", 900).with_id("D"),
        ];
        let mut pairs = vec![stored("A", "D", 2400, 1), stored("C", "B", 2200, 2)];

        rank_pairs(&mut pairs, &roster);

        let ranked: Vec<(u32, u64)> = pairs.iter().map(|p| (p.pair_order, p.total_points)).collect();
        assert_eq!(ranked, vec![(1, 2200), (2, 1000)]);
        assert_eq!(pairs[0].player1_id, EntityId::from("C"));
    }

    #[test]
    fn test_rank_pairs_keeps_total_of_missing_player_and_ties() {
        let roster = vec![
            Player::new("A", 500).with_id("A"),
            Player::new("B", 500).with_id("B"),
            Player::new("C", 600).with_id("C"),
            Player::new("D", 400).with_id("D"),
        ];
        let mut pairs = vec![
            stored("X", "Y", 3000, 3),
            stored("C", "D", 1, 2),
            stored("A", "B", 1, 1),
        ];

        rank_pairs(&mut pairs, &roster);

        let ranked: Vec<(&str, u32, u64)> = pairs
            .iter()
            .map(|p| (p.player1_id.as_str(), p.pair_order, p.total_points))
            .collect();
        assert_eq!(ranked, vec![("X", 1, 3000), ("A", 2, 1000), ("C", 3, 1000)]);
    }

    #[test]
    fn test_pair_from_suggestion() {
        let suggestion = PairSuggestion {
            player1: EntityId::from("a"),
            player2: EntityId::from("b"),
            total_points: 2000,
        };
        let pair = Pair::from_suggestion(EntityId::from("game-1"), &suggestion, 1);

        assert_eq!(pair.pair_order, 1);
        assert_eq!(pair.total_points, 2000);
        assert!(pair.contains(&EntityId::from("a")));
        assert!(!pair.contains(&EntityId::from("c")));

        let again = Pair::from_suggestion(EntityId::from("game-1"), &suggestion, 2);
        assert_eq!(pair.id, again.id);
    }

    #[test]
    fn test_slot_states() {
        assert!(PairSlot::empty().is_empty());
        assert!(PairSlot::empty().players().is_none());

        let half = PairSlot {
            player1: Some(EntityId::from("a")),
            player2: None,
        };
        assert!(!half.is_empty());
        assert!(half.players().is_none());

        let full = PairSlot::new("a", "b");
        assert_eq!(full.players().map(|(a, _)| a.as_str()), Some("a"));
    }
}
