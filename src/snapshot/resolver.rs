//! Role assignment: which assembled team is the local user's.

use tracing::warn;

use crate::error::SnapshotError;
use crate::model::{LobbySnapshot, Player, ResolvedMatchup, Team, display_name};

use super::{assemble_teams, scan_identity_tokens};

/// Decide which team belongs to the configured local identity.
///
/// Comparison is on normalized tags. Neither team matching is a hard
/// failure: a guessed side would key cache writes to the wrong opponent.
pub fn resolve_teams(
    snapshot: LobbySnapshot,
    local_tag: &str,
) -> Result<ResolvedMatchup, SnapshotError> {
    let LobbySnapshot { team_one, team_two } = snapshot;

    if team_one.matches_identity(local_tag) {
        Ok(ResolvedMatchup { mine: team_one, opponent: team_two })
    } else if team_two.matches_identity(local_tag) {
        Ok(ResolvedMatchup { mine: team_two, opponent: team_one })
    } else {
        warn!(identity = local_tag, "local identity not present in lobby");
        Err(SnapshotError::IdentityNotFound { identity: local_tag.to_string() })
    }
}

/// Fallback path: scan and assemble straight from the raw buffer when the
/// caller holds no pre-assembled teams.
pub fn resolve_from_buffer(
    buffer: &[u8],
    local_tag: &str,
) -> Result<ResolvedMatchup, SnapshotError> {
    let tokens = scan_identity_tokens(buffer);
    let snapshot = assemble_teams(&tokens)?;
    resolve_teams(snapshot, local_tag)
}

/// Build a synthetic matchup from a manually supplied opponent, bypassing
/// the scanner and assembler. Used for controlled testing and for flows
/// where no snapshot is available.
pub fn manual_matchup(
    local_tag: &str,
    opponent_nickname: &str,
    opponent_tag: &str,
) -> ResolvedMatchup {
    ResolvedMatchup {
        mine: Team::solo(Player::new(display_name(local_tag), local_tag)),
        opponent: Team::solo(Player::new(opponent_nickname, opponent_tag)),
    }
}
