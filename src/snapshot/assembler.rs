//! Token sequence → two single-player teams.
//!
//! A supported 1v1 snapshot scans to exactly six tokens in two runs of
//! three: nickname, an internal duplicate, and the canonical battle tag.
//! Which slot holds what is empirical observation of an undocumented
//! layout, not a documented format; the selection below is preserved
//! exactly as observed.

use tracing::debug;

use crate::error::SnapshotError;
use crate::model::{LobbySnapshot, Player, Team, display_name};

// Slot offsets within each run of three.
const NICKNAME_SLOT: usize = 0;
const DUPLICATE_SLOT: usize = 1;
const TAG_SLOT: usize = 2;
const RUN_LEN: usize = 3;

/// Group scanned tokens into the two teams of a 1v1 lobby.
///
/// The shape gate is the empirically observed one: an even token count
/// whose integer third equals two. Anything else is an unsupported lobby
/// (team mode, corrupted snapshot, wrong file).
pub fn assemble_teams(tokens: &[String]) -> Result<LobbySnapshot, SnapshotError> {
    if tokens.len() % 2 != 0 || tokens.len() / RUN_LEN != 2 {
        return Err(SnapshotError::Format { token_count: tokens.len() });
    }

    Ok(LobbySnapshot {
        team_one: team_from_run(&tokens[..RUN_LEN]),
        team_two: team_from_run(&tokens[RUN_LEN..2 * RUN_LEN]),
    })
}

fn team_from_run(run: &[String]) -> Team {
    let tag = &run[TAG_SLOT];
    if run[DUPLICATE_SLOT] != *tag {
        // Encoding noise in the duplicate slot; the tag slot is authoritative.
        debug!(duplicate = %run[DUPLICATE_SLOT], tag = %tag, "duplicate-slot token mismatch");
    }
    let nickname = display_name(&run[NICKNAME_SLOT]).to_string();
    Team::solo(Player::new(nickname, tag.clone()))
}
