//! Recovery of plain text from rich-text message bodies.
//!
//! When Messages stores a message as rich text, the `text` column is empty
//! and the content lives in `attributedBody`: a serialized object graph
//! holding the string alongside archiver bookkeeping (class names such as
//! `NSMutableAttributedString`, `$null` placeholders, attribute keys).
//!
//! Decoding is an explicit two-tier fallback chain:
//!
//! 1. **Structured** ([`keyed`]) - parse the bytes as a keyed property-list
//!    archive and pick the string value out of the root dictionary or the
//!    `$objects` table.
//! 2. **Heuristic** ([`heuristic`]) - treat the bytes as Latin-1 text, look
//!    for the marker that precedes the payload in typedstream archives, and
//!    otherwise keep the longest printable run that looks like prose.
//!
//! Neither tier can fail: malformed input simply yields
//! [`DecodeOutcome::NoText`].
//!
//! # Example
//!
//! ```rust
//! use imsg_export::decoder::{BodyDecoder, DecodeOutcome};
//!
//! let blob = b"\x04\x0bstreamtyped\x81\xe8\x03\x84\x01+Fmeet at 5?\x86\x84\x02iI";
//! let decoder = BodyDecoder::new();
//!
//! assert_eq!(
//!     decoder.decode_outcome(blob),
//!     DecodeOutcome::Heuristic("meet at 5?".to_string())
//! );
//! assert_eq!(decoder.decode(None), None);
//! ```

pub mod heuristic;
pub mod keyed;

use crate::config::DecoderConfig;

/// Archiver bookkeeping strings that never represent message content.
///
/// The structured tier compares `$objects` entries against this set for
/// exact equality; the heuristic tier rejects any printable run that
/// contains one of them.
pub const RESERVED_TOKENS: &[&str] = &[
    "$null",
    "NSAttributedString",
    "NSMutableAttributedString",
    "NSString",
    "NSMutableString",
    "NSObject",
    "NSDictionary",
    "NSNumber",
    "NSValue",
    "streamtyped",
    "__kIMMessagePartAttributeName",
];

/// Returns `true` if `s` is exactly one of the [`RESERVED_TOKENS`].
pub fn is_reserved_token(s: &str) -> bool {
    RESERVED_TOKENS.contains(&s)
}

/// Returns `true` if any of the [`RESERVED_TOKENS`] occurs inside `s`.
pub fn contains_reserved_token(s: &str) -> bool {
    RESERVED_TOKENS.iter().any(|token| s.contains(token))
}

/// Result of decoding one body, tagged with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Text taken from a parsed property-list archive.
    Structured(String),
    /// Text recovered by scanning the raw bytes.
    Heuristic(String),
    /// Neither tier found anything that looks like content.
    NoText,
}

impl DecodeOutcome {
    /// Returns the recovered text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            DecodeOutcome::Structured(text) | DecodeOutcome::Heuristic(text) => Some(text),
            DecodeOutcome::NoText => None,
        }
    }

    /// Consumes the outcome and returns the recovered text, if any.
    pub fn into_text(self) -> Option<String> {
        match self {
            DecodeOutcome::Structured(text) | DecodeOutcome::Heuristic(text) => Some(text),
            DecodeOutcome::NoText => None,
        }
    }

    /// Returns `true` if no text was recovered.
    pub fn is_no_text(&self) -> bool {
        matches!(self, DecodeOutcome::NoText)
    }

    /// Short label of the tier, used in trace logs.
    pub fn tier(&self) -> &'static str {
        match self {
            DecodeOutcome::Structured(_) => "structured",
            DecodeOutcome::Heuristic(_) => "heuristic",
            DecodeOutcome::NoText => "none",
        }
    }
}

/// Decoder for `attributedBody` blobs.
///
/// The decoder is stateless apart from its thresholds and is `Send + Sync`,
/// so one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct BodyDecoder {
    config: DecoderConfig,
}

impl BodyDecoder {
    /// Creates a decoder with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder with custom thresholds.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Runs the fallback chain and reports which tier produced the text.
    pub fn decode_outcome(&self, bytes: &[u8]) -> DecodeOutcome {
        if bytes.is_empty() {
            return DecodeOutcome::NoText;
        }

        let outcome = if let Some(text) = keyed::extract(bytes) {
            DecodeOutcome::Structured(text)
        } else if let Some(text) = heuristic::extract(bytes, &self.config) {
            DecodeOutcome::Heuristic(text)
        } else {
            DecodeOutcome::NoText
        };

        tracing::trace!(tier = outcome.tier(), len = bytes.len(), "decoded body");
        outcome
    }

    /// Decodes an optional body into text.
    ///
    /// Returns `None` for an absent or empty body and when nothing
    /// recoverable was found.
    pub fn decode(&self, bytes: Option<&[u8]>) -> Option<String> {
        bytes.and_then(|b| self.decode_outcome(b).into_text())
    }
}

/// Decodes a body with the default thresholds.
///
/// ```rust
/// use imsg_export::decoder::decode_body;
///
/// assert_eq!(decode_body(None), None);
/// assert_eq!(decode_body(Some(b"")), None);
/// ```
pub fn decode_body(bytes: Option<&[u8]>) -> Option<String> {
    BodyDecoder::new().decode(bytes)
}
