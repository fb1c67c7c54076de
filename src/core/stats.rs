//! Export run statistics.

use serde::{Deserialize, Serialize};

/// Counters accumulated over one export run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportStats {
    /// Conversations written.
    pub chats: usize,
    /// Messages written.
    pub messages: usize,
    /// Attachment files copied.
    pub attachments: usize,
    /// Conversations whose label differs from the raw identifier
    /// (group name or resolved contact).
    pub matched: usize,
}

impl ExportStats {
    /// Creates zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of conversations with a human-readable name (0.0 - 100.0).
    ///
    /// ```rust
    /// use imsg_export::core::ExportStats;
    ///
    /// let stats = ExportStats { chats: 8, matched: 6, ..ExportStats::new() };
    /// assert_eq!(stats.match_rate(), 75.0);
    /// assert_eq!(ExportStats::new().match_rate(), 0.0);
    /// ```
    pub fn match_rate(&self) -> f64 {
        if self.chats == 0 {
            return 0.0;
        }
        (self.matched as f64 / self.chats as f64) * 100.0
    }

    /// Number of conversations still shown by number or id.
    pub fn unmatched(&self) -> usize {
        self.chats.saturating_sub(self.matched)
    }

    /// Adds another run's counters to this one.
    pub fn absorb(&mut self, other: ExportStats) {
        self.chats += other.chats;
        self.messages += other.messages;
        self.attachments += other.attachments;
        self.matched += other.matched;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_rate() {
        let stats = ExportStats {
            chats: 4,
            matched: 1,
            ..ExportStats::new()
        };
        assert!((stats.match_rate() - 25.0).abs() < f64::EPSILON);
        assert_eq!(stats.unmatched(), 3);
    }

    #[test]
    fn test_absorb() {
        let mut total = ExportStats::new();
        total.absorb(ExportStats {
            chats: 1,
            messages: 10,
            attachments: 2,
            matched: 1,
        });
        total.absorb(ExportStats {
            chats: 1,
            messages: 5,
            attachments: 0,
            matched: 0,
        });
        assert_eq!(
            total,
            ExportStats {
                chats: 2,
                messages: 15,
                attachments: 2,
                matched: 1,
            }
        );
    }
}
