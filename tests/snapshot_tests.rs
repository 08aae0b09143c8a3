// Lobby snapshot pipeline tests: scanner -> assembler -> resolver
//
// The two-runs-of-three layout and the first/third slot selection mirror
// empirical observation of an undocumented binary format. These tests pin
// that behavior down; they are format-fragile on purpose.

mod common;

use rivaltrack::error::SnapshotError;
use rivaltrack::model::normalize_tag;
use rivaltrack::snapshot::{assemble_teams, resolve_from_buffer, scan_identity_tokens};

/// A buffer shaped like a real capture: structural bytes surrounding each
/// of the six identity strings.
fn lobby_buffer() -> Vec<u8> {
    let mut buf = vec![0x00, 0x09, 0x02];
    for token in [
        "NickAlpha#123", "NickAlpha#123", "Alpha#123",
        "NickBravo#456", "NickBravo#456", "Bravo#456",
    ] {
        buf.extend_from_slice(&[0x00, 0x04, 0xd2, 0x07]);
        buf.extend_from_slice(token.as_bytes());
    }
    buf.extend_from_slice(&[0xff, 0x00]);
    buf
}

#[test]
fn test_scan_preserves_order_through_noise() {
    let tokens = scan_identity_tokens(&lobby_buffer());
    assert_eq!(tokens.len(), 6);
    assert_eq!(tokens[0], "NickAlpha#123");
    assert_eq!(tokens[2], "Alpha#123");
    assert_eq!(tokens[5], "Bravo#456");
}

#[test]
fn test_scan_of_garbage_is_empty_not_an_error() {
    assert!(scan_identity_tokens(&[]).is_empty());
    assert!(scan_identity_tokens(&[0xde, 0xad, 0xbe, 0xef]).is_empty());
}

#[test]
fn test_assembly_from_scanned_buffer() {
    let tokens = scan_identity_tokens(&lobby_buffer());
    let snap = assemble_teams(&tokens).unwrap();

    // First and third token of each run; the second (internal duplicate)
    // is skipped.
    assert_eq!(snap.team_one.player.nickname, "NickAlpha");
    assert_eq!(snap.team_one.player.tag, "Alpha#123");
    assert_eq!(snap.team_two.player.nickname, "NickBravo");
    assert_eq!(snap.team_two.player.tag, "Bravo#456");
}

#[test]
fn test_team_mode_token_counts_rejected() {
    // 2v2 and up scan to more runs; every non-1v1 count must fail and
    // carry the observed count for diagnostics.
    for n in [0usize, 3, 4, 5, 7, 9, 12] {
        let tokens: Vec<String> = (0..n).map(|i| format!("Player{i}#123")).collect();
        match assemble_teams(&tokens) {
            Err(SnapshotError::Format { token_count }) => assert_eq!(token_count, n),
            other => panic!("count {n}: expected Format error, got {other:?}"),
        }
    }
}

#[test]
fn test_normalization_properties() {
    for tag in ["Alpha#123", "alpha_123", "ALPHA#123", "WeIrD_999"] {
        assert_eq!(normalize_tag(&normalize_tag(tag)), normalize_tag(tag));
    }
    assert_eq!(normalize_tag("Foo_123"), normalize_tag("Foo#123"));
}

#[test]
fn test_pipe_delimited_buffer_end_to_end() {
    let buf = b"noise|Alpha#123|Alpha#123|Alpha#123|Bravo#456|Bravo#456|Bravo#456";
    let resolved = resolve_from_buffer(buf, "Alpha#123").unwrap();

    assert_eq!(resolved.mine.player.nickname, "Alpha");
    assert_eq!(resolved.mine.player.tag, "Alpha#123");
    assert_eq!(resolved.opponent.player.nickname, "Bravo");
    assert_eq!(resolved.opponent.player.tag, "Bravo#456");
    assert_eq!(resolved.opponent_key(), "bravo#456");
}

#[test]
fn test_unknown_identity_is_a_hard_failure() {
    let buf = lobby_buffer();
    match resolve_from_buffer(&buf, "Charlie#789") {
        Err(SnapshotError::IdentityNotFound { identity }) => {
            assert_eq!(identity, "Charlie#789");
        }
        other => panic!("expected IdentityNotFound, got {other:?}"),
    }
}
