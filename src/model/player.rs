use serde::{Deserialize, Serialize};

use super::identity::normalize_tag;

/// One lobby participant. The tag is the canonical identity; the nickname
/// is display-only and may be stale relative to the tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub nickname: String,
    pub tag: String,
}

impl Player {
    pub fn new(nickname: impl Into<String>, tag: impl Into<String>) -> Self {
        Self { nickname: nickname.into(), tag: tag.into() }
    }

    /// Normalized identity key used for all comparisons and cache lookups.
    pub fn identity_key(&self) -> String {
        normalize_tag(&self.tag)
    }
}

/// Exactly one player in the supported 1v1 scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub player: Player,
}

impl Team {
    pub fn solo(player: Player) -> Self {
        Self { player }
    }

    pub fn matches_identity(&self, configured_tag: &str) -> bool {
        self.player.identity_key() == normalize_tag(configured_tag)
    }
}

/// The two teams as assembled from one raw buffer. Immutable after assembly;
/// roles (mine vs opponent) are assigned later by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbySnapshot {
    pub team_one: Team,
    pub team_two: Team,
}

/// A snapshot with roles decided. Explicit fields instead of stored
/// selector functions: `mine` and `opponent` are fixed at resolve time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMatchup {
    pub mine: Team,
    pub opponent: Team,
}

impl ResolvedMatchup {
    /// Opponent identity key for cache lookups and writes.
    pub fn opponent_key(&self) -> String {
        self.opponent.player.identity_key()
    }
}
