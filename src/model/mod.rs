mod identity;
mod player;
mod profile;
mod record;

pub use identity::{display_name, normalize_tag};
pub use player::{LobbySnapshot, Player, ResolvedMatchup, Team};
pub use profile::{BuildOrderPattern, LadderStats, MapCount, OpponentProfile, WinRate};
pub use record::{BuildOrderStep, CacheStats, MatchRecord, Outcome};
