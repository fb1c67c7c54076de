//! Progress reporting for long-running operations.
//!
//! Contact enumeration and export both report through a push-based
//! callback so the library never prints on its own.
//!
//! # Example
//!
//! ```rust
//! use imsg_export::progress::{Progress, ProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|progress| {
//!     if let Some(pct) = progress.percentage() {
//!         println!("{}: {:.1}%", progress.stage, pct);
//!     }
//! });
//!
//! for done in (50..=200).step_by(50) {
//!     callback(Progress::new(Stage::Contacts, done).with_total(200));
//! }
//! ```

use std::fmt;
use std::sync::Arc;

/// Which operation a [`Progress`] update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Enumerating people in the address book.
    #[default]
    Contacts,
    /// Writing conversations.
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Contacts => write!(f, "contacts"),
            Stage::Export => write!(f, "export"),
        }
    }
}

/// Progress information for a long-running operation.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    /// Operation being reported.
    pub stage: Stage,

    /// Items (people or conversations) processed so far.
    pub items_processed: usize,

    /// Total items, if known.
    pub total_items: Option<usize>,

    /// Label of the item just finished, if any.
    pub current: Option<String>,
}

impl Progress {
    /// Creates a new progress instance.
    pub fn new(stage: Stage, items_processed: usize) -> Self {
        Self {
            stage,
            items_processed,
            total_items: None,
            current: None,
        }
    }

    /// Sets the total item count.
    #[must_use]
    pub fn with_total(mut self, total_items: usize) -> Self {
        self.total_items = Some(total_items);
        self
    }

    /// Sets the label of the current item.
    #[must_use]
    pub fn with_current(mut self, label: impl Into<String>) -> Self {
        self.current = Some(label.into());
        self
    }

    /// Returns the progress as a percentage (0.0 - 100.0).
    ///
    /// ```rust
    /// use imsg_export::progress::{Progress, Stage};
    ///
    /// let progress = Progress::new(Stage::Export, 5).with_total(20);
    /// assert_eq!(progress.percentage(), Some(25.0));
    /// assert_eq!(Progress::new(Stage::Export, 5).percentage(), None);
    /// ```
    pub fn percentage(&self) -> Option<f64> {
        self.total_items.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.items_processed as f64 / total as f64) * 100.0
            }
        })
    }

    /// Returns whether all known items are processed.
    pub fn is_complete(&self) -> bool {
        self.total_items
            .is_some_and(|total| self.items_processed >= total)
    }
}

/// Thread-safe callback receiving [`Progress`] updates.
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Creates a no-op progress callback.
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Creates a callback that prints `processed/total` lines to stderr.
pub fn stderr_progress() -> ProgressCallback {
    Arc::new(|progress| match progress.total_items {
        Some(total) => eprintln!(
            "   {}: {}/{}",
            progress.stage, progress.items_processed, total
        ),
        None => eprintln!("   {}: {}", progress.stage, progress.items_processed),
    })
}
