//! File-system-safe conversation labels.
//!
//! A conversation label doubles as a folder name and a document name, so
//! characters that are reserved on common file systems are stripped. Two
//! conversations may clean to the same label (two people both called
//! "Alex"); [`LabelRegistry`] hands out ` (2)`, ` (3)` suffixes so no
//! document overwrites another.

use std::collections::HashMap;

/// Label used when cleaning leaves nothing.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Removes `< > : " / \ | ? *` and control characters `0x00-0x1F`, then
/// trims. A result that is empty or only dots (`.`, `..`) becomes `Unknown`.
///
/// ```rust
/// use imsg_export::core::naming::clean_label;
///
/// assert_eq!(clean_label("  A/B: Team  "), "AB Team");
/// assert_eq!(clean_label("???"), "Unknown");
/// assert_eq!(clean_label(" .. "), "Unknown");
/// ```
pub fn clean_label(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|&c| !is_reserved(c)).collect();
    let trimmed = cleaned.trim();

    if trimmed.chars().all(|c| c == '.') {
        UNKNOWN_LABEL.to_string()
    } else {
        trimmed.to_string()
    }
}

fn is_reserved(c: char) -> bool {
    matches!(
        c,
        '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | '\x00'..='\x1f'
    )
}

/// Tracks labels already used in one output directory.
///
/// Comparison is case-insensitive, since the default macOS file system is.
#[derive(Debug, Clone, Default)]
pub struct LabelRegistry {
    seen: HashMap<String, usize>,
}

impl LabelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `label`, or `label (n)` if it was handed out before.
    pub fn claim(&mut self, label: &str) -> String {
        let mut n = *self.seen.get(&label.to_lowercase()).unwrap_or(&0);
        loop {
            n += 1;
            let candidate = if n == 1 {
                label.to_string()
            } else {
                format!("{label} ({n})")
            };
            let key = candidate.to_lowercase();
            if !self.seen.contains_key(&key) {
                self.seen.insert(label.to_lowercase(), n);
                self.seen.insert(key, 1);
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_label_strips_reserved() {
        assert_eq!(clean_label("a<b>c:d\"e/f\\g|h?i*j"), "abcdefghij");
        assert_eq!(clean_label("tab\there\nnew"), "tabherenew");
        assert_eq!(clean_label("  Alex  "), "Alex");
    }

    #[test]
    fn test_clean_label_keeps_unicode_and_plus() {
        assert_eq!(clean_label("+16824380581"), "+16824380581");
        assert_eq!(clean_label("Zoë 🎉"), "Zoë 🎉");
        assert_eq!(clean_label("user@example.com"), "user@example.com");
    }

    #[test]
    fn test_clean_label_empty() {
        assert_eq!(clean_label(""), "Unknown");
        assert_eq!(clean_label(" / "), "Unknown");
    }

    #[test]
    fn test_clean_label_dot_names() {
        assert_eq!(clean_label("."), "Unknown");
        assert_eq!(clean_label(".."), "Unknown");
        assert_eq!(clean_label(" ../ "), "Unknown");
        assert_eq!(clean_label("..."), "Unknown");
        assert_eq!(clean_label("Dr. Who"), "Dr. Who");
        assert_eq!(clean_label(".hidden"), ".hidden");
    }

    #[test]
    fn test_registry_suffixes_duplicates() {
        let mut registry = LabelRegistry::new();
        assert_eq!(registry.claim("Alex"), "Alex");
        assert_eq!(registry.claim("Sam"), "Sam");
        assert_eq!(registry.claim("Alex"), "Alex (2)");
        assert_eq!(registry.claim("alex"), "alex (3)");
    }

    #[test]
    fn test_registry_literal_suffix_collision() {
        let mut registry = LabelRegistry::new();
        assert_eq!(registry.claim("Alex (2)"), "Alex (2)");
        assert_eq!(registry.claim("Alex"), "Alex");
        assert_eq!(registry.claim("Alex"), "Alex (3)");
    }
}
