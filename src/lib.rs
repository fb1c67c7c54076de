//! # imsg-export
//!
//! A Rust library and CLI for exporting macOS Messages conversations into
//! per-contact documents.
//!
//! ## Overview
//!
//! The Messages archive (`~/Library/Messages/chat.db`) keeps every
//! conversation, but two things make it hard to read directly:
//! - **Rich-text bodies**: many messages have an empty `text` column and
//!   keep their content inside a serialized `attributedBody` blob.
//! - **Raw identifiers**: conversations are keyed by phone numbers and
//!   emails, in whatever shape the carrier reported them.
//!
//! imsg-export recovers the text with a two-tier [`decoder`], maps phone
//! numbers to names with a [`NameDirectory`](identity::NameDirectory) built
//! from the Contacts app or a CSV file, and writes one folder per
//! conversation with its document and copied attachments.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imsg_export::prelude::*;
//!
//! fn main() -> Result<()> {
//!     // Build the name directory from a CSV address book
//!     let (directory, _) = load_directory(&CsvContactSource::new("contacts.csv"))?;
//!
//!     // Export every conversation as HTML
//!     let db = ChatDatabase::open("/Users/me/Library/Messages/chat.db")?;
//!     let report = Exporter::new(&db, &directory, ExportConfig::new("export")).run()?;
//!
//!     println!("{} conversations", report.stats.chats);
//!     Ok(())
//! }
//! ```
//!
//! ## Decoding a Single Body
//!
//! ```rust
//! use imsg_export::decoder::decode_body;
//!
//! let blob = b"\x04\x0bstreamtyped\x84\x01+\x0bhello there\x86";
//! assert_eq!(decode_body(Some(blob)), Some("hello there".to_string()));
//! ```
//!
//! ## Module Structure
//!
//! - [`decoder`] - Rich-text body recovery ([`BodyDecoder`](decoder::BodyDecoder))
//! - [`identity`] - Phone canonicalization ([`NameDirectory`](identity::NameDirectory))
//! - [`contacts`] - Contact sources (Contacts app, CSV)
//! - [`archive`] - Read-only `chat.db` access (`archive` feature)
//! - [`export`] - The export pipeline ([`Exporter`](export::Exporter))
//! - [`core`] - Labels, attachment copying, stats, and document writers
//! - [`config`] - Configuration types
//! - [`format`] - [`OutputFormat`](format::OutputFormat) selection
//! - [`progress`] - Progress callbacks
//! - [`cli`] - CLI arguments (`cli` feature)
//! - [`error`] - Unified error types ([`ExportError`], [`Result`])
//! - [`prelude`] - Convenient re-exports

#[cfg(feature = "archive")]
pub mod archive;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod contacts;
pub mod core;
pub mod decoder;
pub mod error;
#[cfg(feature = "archive")]
pub mod export;
pub mod format;
pub mod identity;
pub mod message;
pub mod progress;

// Re-export the main types at the crate root for convenience
pub use error::{ExportError, Result};
pub use message::Message;

/// Convenient re-exports for common usage.
///
/// ```rust
/// use imsg_export::prelude::*;
/// ```
pub mod prelude {
    // Core message types
    pub use crate::Message;
    pub use crate::message::{Attachment, AttachmentKind, DisplayZone};

    // Error types
    pub use crate::error::{ExportError, Result};

    // Configuration
    pub use crate::config::{ContactsConfig, DecoderConfig, ExportConfig, OutputConfig};
    pub use crate::format::OutputFormat;

    // Decoding
    pub use crate::decoder::{BodyDecoder, DecodeOutcome, decode_body};

    // Identity
    pub use crate::identity::{ContactRecord, NameDirectory};

    // Contact sources
    #[cfg(feature = "csv-output")]
    pub use crate::contacts::CsvContactSource;
    pub use crate::contacts::{ContactSource, MacContactsSource, load_directory};

    // Archive and pipeline
    #[cfg(feature = "archive")]
    pub use crate::archive::ChatDatabase;
    #[cfg(feature = "archive")]
    pub use crate::export::{ExportReport, Exporter};

    // Stats and progress
    pub use crate::core::ExportStats;
    pub use crate::progress::{Progress, ProgressCallback};
}
