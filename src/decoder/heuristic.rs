//! Heuristic tier: scanning raw bytes for readable text.
//!
//! Most `attributedBody` blobs are NeXT typedstream archives, which a
//! property-list parser rejects. In those archives the string payload
//! follows the byte sequence `84 01 2B 46` and runs until the next `86` or
//! `84` control byte. When that marker is missing the best remaining
//! evidence is the longest printable run that reads like prose.
//!
//! Bytes are mapped one-to-one onto Latin-1 characters so no input is ever
//! rejected.

use std::sync::LazyLock;

use regex::Regex;

use super::contains_reserved_token;
use crate::config::DecoderConfig;

/// Marker, payload, terminator.
static MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\x{84}\x{01}\+F(.+?)(?:\x{86}|\x{84})").expect("marker pattern is valid")
});

/// Maximal runs of printable ASCII plus newline, carriage return and tab.
static PRINTABLE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x20-\x7E\n\r\t]+").expect("printable pattern is valid"));

/// Extracts text from bytes that did not parse as a property list.
pub fn extract(bytes: &[u8], config: &DecoderConfig) -> Option<String> {
    let text = latin1(bytes);
    marker_payload(&text).or_else(|| longest_printable_run(&text, config))
}

/// Maps every byte to the Latin-1 character with the same code point.
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Returns `true` for printable ASCII, `\n`, `\r` and `\t`.
fn is_printable(c: char) -> bool {
    matches!(c, ' '..='~' | '\n' | '\r' | '\t')
}

/// Payload between the typedstream string marker and its terminator.
///
/// Non-printable characters are dropped and the result is trimmed; an
/// empty result counts as no match.
pub fn marker_payload(text: &str) -> Option<String> {
    let caps = MARKER_PATTERN.captures(text)?;
    let cleaned: String = caps.get(1)?.as_str().chars().filter(|&c| is_printable(c)).collect();
    let trimmed = cleaned.trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Longest printable run that passes the content filters.
///
/// A run is rejected when it contains a reserved token, is shorter than
/// `min_run_len` (before or after trimming), or has an
/// alphanumeric-or-whitespace ratio below `min_alnum_ratio`. Ties keep the
/// earliest run.
pub fn longest_printable_run(text: &str, config: &DecoderConfig) -> Option<String> {
    let mut best: Option<&str> = None;

    for run in PRINTABLE_RUN.find_iter(text).map(|m| m.as_str()) {
        if run.len() < config.min_run_len || contains_reserved_token(run) {
            continue;
        }

        let trimmed = run.trim();
        if trimmed.len() < config.min_run_len {
            continue;
        }

        if alnum_ratio(run) < config.min_alnum_ratio {
            continue;
        }

        if best.is_none_or(|current| trimmed.len() > current.len()) {
            best = Some(trimmed);
        }
    }

    best.map(str::to_string)
}

/// Share of ASCII alphanumeric or whitespace characters in `run`.
fn alnum_ratio(run: &str) -> f64 {
    let total = run.chars().count();
    if total == 0 {
        return 0.0;
    }
    let good = run
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace())
        .count();
    good as f64 / total as f64
}
