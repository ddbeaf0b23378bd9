//! Availability poll answers for a game.

use serde::{Deserialize, Serialize};

use super::{AvailabilityId, EntityId, GameId, PlayerId};

/// A player's answer to a game's availability call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    #[default]
    NoResponse,
    Confirmed,
    Unavailable,
    Maybe,
}

impl AvailabilityStatus {
    /// Confirmed or maybe.
    pub fn is_available(&self) -> bool {
        matches!(self, AvailabilityStatus::Confirmed | AvailabilityStatus::Maybe)
    }
}

/// One player's availability for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub id: AvailabilityId,
    pub game_id: GameId,
    pub player_id: PlayerId,
    #[serde(default)]
    pub status: AvailabilityStatus,
}

impl Availability {
    pub fn new(game_id: GameId, player_id: PlayerId, status: AvailabilityStatus) -> Self {
        let id = EntityId::generate(&["availability", game_id.as_str(), player_id.as_str()]);
        Self {
            id,
            game_id,
            player_id,
            status,
        }
    }
}

/// Count of answers per status for one game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySummary {
    pub no_response: u32,
    pub confirmed: u32,
    pub unavailable: u32,
    pub maybe: u32,
    pub total: u32,
}

impl AvailabilitySummary {
    pub fn from_availabilities<'a>(items: impl IntoIterator<Item = &'a Availability>) -> Self {
        let mut summary = Self::default();
        for item in items {
            match item.status {
                AvailabilityStatus::NoResponse => summary.no_response += 1,
                AvailabilityStatus::Confirmed => summary.confirmed += 1,
                AvailabilityStatus::Unavailable => summary.unavailable += 1,
                AvailabilityStatus::Maybe => summary.maybe += 1,
            }
            summary.total += 1;
        }
        summary
    }
}
