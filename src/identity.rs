//! Phone-number canonicalization and contact name resolution.
//!
//! Conversation identifiers in the archive come in every shape a phone
//! number can take: `+16824380581`, `6824380581`, `(682) 438-0581`,
//! `16824380581`. Contacts are just as inconsistent. Rather than parsing
//! numbers properly, the [`NameDirectory`] indexes each contact under every
//! plausible digit-only variant at build time, and probes every plausible
//! variant at lookup time.
//!
//! # Overview
//!
//! | Phase | Keys derived from digits `d` |
//! |-------|------------------------------|
//! | ingest | `d`, last 10, `1+d` (10 digits), `d[1..]` (11 digits, leading 1) |
//! | resolve | `d`, last 10, last 11, `1+d`, `d[1..]`, `d[2..]` (12 digits, leading 1) |
//!
//! Emails are never looked up: they are already human-readable.
//!
//! # Example
//!
//! ```rust
//! use imsg_export::identity::NameDirectory;
//!
//! let mut directory = NameDirectory::new();
//! directory.ingest("Alex", "(682) 438-0581");
//!
//! assert_eq!(directory.resolve("+16824380581"), "Alex");
//! assert_eq!(directory.resolve("user@example.com"), "user@example.com");
//! assert_eq!(directory.resolve("5550001234"), "5550001234");
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Fewest digits a contact phone number needs to be indexed.
pub const MIN_PHONE_DIGITS: usize = 10;

/// Length of a national (NANP) number without country code.
const NATIONAL_LEN: usize = 10;

/// A single contact as delivered by a contact source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Display name.
    pub name: String,
    /// Phone number in any formatting.
    pub phone: String,
}

impl ContactRecord {
    /// Creates a new contact record.
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }
}

/// Key that produced a successful lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// The canonical key found in the directory.
    pub key: &'a str,
    /// The display name stored under it.
    pub name: &'a str,
}

/// Mapping from canonical digit keys to display names.
///
/// Built once per run, then only read. Collisions are last-write-wins:
/// two contacts sharing a number variant end up with whichever was
/// ingested later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameDirectory {
    entries: HashMap<String, String>,
}

impl NameDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes one contact under every key variant of its phone number.
    ///
    /// Returns `false` (and inserts nothing) when the name is blank or the
    /// number has fewer than [`MIN_PHONE_DIGITS`] digits.
    pub fn ingest(&mut self, raw_name: &str, raw_phone: &str) -> bool {
        let name = raw_name.trim();
        if name.is_empty() {
            return false;
        }

        let digits = digits_only(raw_phone);
        if digits.len() < MIN_PHONE_DIGITS {
            return false;
        }

        for key in ingest_keys(&digits) {
            self.entries.insert(key, name.to_string());
        }
        true
    }

    /// Indexes a [`ContactRecord`].
    pub fn ingest_record(&mut self, record: &ContactRecord) -> bool {
        self.ingest(&record.name, &record.phone)
    }

    /// Resolves an identifier to a display name, or returns it unchanged.
    pub fn resolve<'a>(&'a self, identifier: &'a str) -> &'a str {
        self.resolve_match(identifier)
            .map_or(identifier, |found| found.name)
    }

    /// Resolves an identifier and reports which key matched.
    ///
    /// Returns `None` for emails, identifiers without digits, and misses.
    pub fn resolve_match(&self, identifier: &str) -> Option<Resolution<'_>> {
        if identifier.contains('@') {
            return None;
        }

        let digits = digits_only(identifier);
        if digits.is_empty() {
            return None;
        }

        lookup_keys(&digits).into_iter().find_map(|key| {
            self.entries
                .get_key_value(key.as_str())
                .map(|(key, name)| Resolution { key, name })
        })
    }

    /// Returns the name stored under an exact canonical key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of keys (not contacts) in the directory.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no keys are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(key, name)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<ContactRecord> for NameDirectory {
    fn from_iter<I: IntoIterator<Item = ContactRecord>>(iter: I) -> Self {
        let mut directory = NameDirectory::new();
        for record in iter {
            directory.ingest_record(&record);
        }
        directory
    }
}

/// Strips everything except ASCII digits.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Last `n` characters of a digit string (all of it when shorter).
fn last_n(digits: &str, n: usize) -> &str {
    &digits[digits.len().saturating_sub(n)..]
}

/// Keys a contact number is stored under. Expects at least 10 digits.
pub fn ingest_keys(digits: &str) -> Vec<String> {
    let mut keys = vec![digits.to_string(), last_n(digits, NATIONAL_LEN).to_string()];

    if digits.len() == NATIONAL_LEN {
        keys.push(format!("1{digits}"));
    }
    if digits.len() == NATIONAL_LEN + 1 && digits.starts_with('1') {
        keys.push(digits[1..].to_string());
    }

    keys
}

/// Keys probed for an identifier, in priority order.
pub fn lookup_keys(digits: &str) -> Vec<String> {
    let len = digits.len();
    let mut keys = vec![digits.to_string(), last_n(digits, NATIONAL_LEN).to_string()];

    if len >= NATIONAL_LEN + 1 {
        keys.push(last_n(digits, NATIONAL_LEN + 1).to_string());
    }
    if len == NATIONAL_LEN {
        keys.push(format!("1{digits}"));
    }
    if len == NATIONAL_LEN + 1 && digits.starts_with('1') {
        keys.push(digits[1..].to_string());
    }
    if len == NATIONAL_LEN + 2 && digits.starts_with('1') {
        keys.push(digits[2..].to_string());
    }

    keys
}
