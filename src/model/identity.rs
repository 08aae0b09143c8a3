/// Normalize a battle tag into the canonical cache key.
///
/// Underscores stand in for `#` in some capture paths, and tags compare
/// case-insensitively everywhere, so the key form is lowercase with `#`.
/// Idempotent: `normalize_tag(normalize_tag(x)) == normalize_tag(x)`.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim()
        .chars()
        .map(|c| if c == '_' { '#' } else { c.to_ascii_lowercase() })
        .collect()
}

/// Display name of a tag: the part before the `#` discriminator.
pub fn display_name(tag: &str) -> &str {
    tag.split(['#', '_']).next().unwrap_or(tag)
}
