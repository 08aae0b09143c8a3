//! Identity-token extraction from a raw lobby buffer.
//!
//! The lobby blob intermixes structural bytes with ASCII identity text, so
//! the scan treats the buffer one byte per character with no charset
//! translation. A token is `letter, 2-20 alphanumerics, '#', 3-6 digits`.

const NAME_MIN: usize = 3; // leading letter + at least 2 more
const NAME_MAX: usize = 21; // leading letter + at most 20 more
const DIGITS_MIN: usize = 3;
const DIGITS_MAX: usize = 6;

/// Scan a buffer for every identity-tag substring, in order, without
/// deduplication. Empty or non-matching buffers yield an empty vec; shape
/// validation belongs to the assembler, not here.
///
/// Single linear pass: alphanumeric runs are located once, and a run is a
/// candidate name only when it butts directly against `#` followed by a
/// digit group of plausible length.
pub fn scan_identity_tokens(buffer: &[u8]) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < buffer.len() {
        if !buffer[i].is_ascii_alphanumeric() {
            i += 1;
            continue;
        }

        let run_start = i;
        while i < buffer.len() && buffer[i].is_ascii_alphanumeric() {
            i += 1;
        }
        let run_end = i;

        if run_end >= buffer.len() || buffer[run_end] != b'#' {
            continue;
        }

        let mut j = run_end + 1;
        while j < buffer.len() && buffer[j].is_ascii_digit() {
            j += 1;
        }
        let digit_count = j - (run_end + 1);
        if digit_count < DIGITS_MIN {
            i = j;
            continue;
        }
        let digits_taken = digit_count.min(DIGITS_MAX);

        // Leftmost valid name start inside the run: within the length cap
        // and beginning with a letter.
        let mut start = run_end.saturating_sub(NAME_MAX).max(run_start);
        while start < run_end && !buffer[start].is_ascii_alphabetic() {
            start += 1;
        }

        if run_end - start >= NAME_MIN {
            let end = run_end + 1 + digits_taken;
            tokens.push(buffer[start..end].iter().map(|&b| b as char).collect());
        }

        i = j;
    }

    tokens
}
