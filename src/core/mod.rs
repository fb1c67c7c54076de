//! Building blocks shared by the export pipeline.
//!
//! This module contains:
//! - [`naming`] - Folder labels: cleaning and de-duplication
//! - `attachments` - Home expansion and collision-free copying (`archive` feature)
//! - [`stats`] - Run totals
//! - [`output`] - Format writers (HTML, CSV, JSON, JSONL)
//!
//! # Quick Start
//!
//! ```rust
//! use imsg_export::core::{LabelRegistry, clean_label, to_html};
//! use imsg_export::Message;
//! use imsg_export::config::OutputConfig;
//!
//! let mut labels = LabelRegistry::new();
//! let label = labels.claim(&clean_label("Book/Club"));
//! assert_eq!(label, "BookClub");
//!
//! let page = to_html(&label, &[Message::new("Alex", "see you at 7")], &OutputConfig::new());
//! assert!(page.contains("see you at 7"));
//! ```

#[cfg(feature = "archive")]
pub mod attachments;
pub mod naming;
pub mod output;
pub mod stats;

pub use naming::{LabelRegistry, UNKNOWN_LABEL, clean_label};
pub use stats::ExportStats;

// Re-export Message from the crate root
pub use crate::Message;

pub use output::{to_html, write_html};

// Conditionally re-export output writers
#[cfg(feature = "csv-output")]
pub use output::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use output::{to_json, to_jsonl, write_json, write_jsonl};
