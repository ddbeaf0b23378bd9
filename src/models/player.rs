//! Player roster model and the acting caller's capability.

use serde::{Deserialize, Serialize};

use super::{EntityId, PlayerId};

/// What a club member is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular squad member
    #[default]
    Player,
    /// Manages games, pairs and results for the team
    Captain,
    /// Read-only access to the team, does not play
    Coordinator,
    /// Club-wide administration
    Admin,
}

impl Role {
    /// Returns true if this role may create pairs, record results and move games along.
    pub fn can_manage_games(&self) -> bool {
        matches!(self, Role::Captain | Role::Admin)
    }

    /// Only admins hand out roles.
    pub fn can_assign_roles(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Player => write!(f, "player"),
            Role::Captain => write!(f, "captain"),
            Role::Coordinator => write!(f, "coordinator"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Court side a player prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PreferredSide {
    Left,
    Right,
    #[default]
    Both,
}

/// A squad member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique identifier
    pub id: PlayerId,

    /// Display name
    pub name: String,

    /// Federation ranking points
    #[serde(default)]
    pub federation_points: u32,

    #[serde(default)]
    pub role: Role,

    #[serde(default)]
    pub preferred_side: PreferredSide,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Player {
    /// Create a new active player with an ID derived from the name.
    pub fn new(name: impl Into<String>, federation_points: u32) -> Self {
        let name = name.into();
        let id = EntityId::generate(&["player", &name]);

        Self {
            id,
            name,
            federation_points,
            role: Role::default(),
            preferred_side: PreferredSide::default(),
            is_active: true,
        }
    }

    /// Builder method to set an explicit ID.
    pub fn with_id(mut self, id: impl Into<PlayerId>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder method to set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Builder method to set the preferred side.
    pub fn with_side(mut self, side: PreferredSide) -> Self {
        self.preferred_side = side;
        self
    }

    /// The capability this player carries when acting.
    pub fn as_actor(&self) -> Actor {
        Actor {
            player_id: self.id.clone(),
            role: self.role,
        }
    }
}

/// The authenticated caller of a workflow operation.
///
/// Passed explicitly into every mutating call; nothing reads it from
/// ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub player_id: PlayerId,
    pub role: Role,
}

impl Actor {
    pub fn new(player_id: impl Into<PlayerId>, role: Role) -> Self {
        Self {
            player_id: player_id.into(),
            role,
        }
    }

    pub fn can_manage_games(&self) -> bool {
        self.role.can_manage_games()
    }

    /// A player may update their own record; managers may update anyone's.
    pub fn can_edit_player(&self, player_id: &PlayerId) -> bool {
        &self.player_id == player_id || self.can_manage_games()
    }
}
