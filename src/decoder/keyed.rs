//! Structured tier: keyed property-list archives.
//!
//! A keyed archive is a dictionary with an `$objects` table holding every
//! archived value in order. For a plain string the table looks like
//! `["$null", "NSString", "<the text>", "NSAttributedString", ...]`, so the
//! first string that is not bookkeeping is the message.

use std::io::Cursor;

use plist::Value;

use super::is_reserved_token;

/// Top-level key that holds the string directly in flattened archives.
pub const STRING_VALUE_KEY: &str = "NSString";

/// Key of the object table in keyed archives.
pub const OBJECT_TABLE_KEY: &str = "$objects";

/// Extracts text from a property-list archive.
///
/// Returns `None` when the bytes are not a property list, the root is not
/// a dictionary, or no non-reserved, non-empty string is present.
pub fn extract(bytes: &[u8]) -> Option<String> {
    let root = Value::from_reader(Cursor::new(bytes)).ok()?;
    let dict = root.as_dictionary()?;

    if let Some(text) = dict.get(STRING_VALUE_KEY).and_then(Value::as_string) {
        if !text.is_empty() {
            return Some(text.to_owned());
        }
    }

    dict.get(OBJECT_TABLE_KEY)
        .and_then(Value::as_array)?
        .iter()
        .filter_map(Value::as_string)
        .find(|s| !s.is_empty() && !is_reserved_token(s))
        .map(str::to_owned)
}
