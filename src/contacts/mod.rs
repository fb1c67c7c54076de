//! Contact sources that feed the [`NameDirectory`].
//!
//! A source produces `(name, phone)` pairs; [`load_directory`] folds them
//! into a directory, dropping records the canonicalizer rejects.
//!
//! | Source | Availability | Notes |
//! |--------|--------------|-------|
//! | [`MacContactsSource`] | macOS | Drives the Contacts app through `osascript` |
//! | [`CsvContactSource`] | everywhere (`csv-output`) | `name`/`phone` columns |
//!
//! # Example
//!
//! ```rust
//! use imsg_export::contacts::{ContactSource, load_directory};
//! use imsg_export::identity::ContactRecord;
//! use imsg_export::Result;
//!
//! struct Fixed;
//!
//! impl ContactSource for Fixed {
//!     fn name(&self) -> &'static str {
//!         "fixed"
//!     }
//!
//!     fn fetch(&self) -> Result<Vec<ContactRecord>> {
//!         Ok(vec![ContactRecord::new("Alex", "682-438-0581")])
//!     }
//! }
//!
//! let (directory, accepted) = load_directory(&Fixed)?;
//! assert_eq!(accepted, 1);
//! assert_eq!(directory.resolve("+16824380581"), "Alex");
//! # Ok::<(), imsg_export::ExportError>(())
//! ```

#[cfg(feature = "csv-output")]
mod csv_file;
mod macos;

#[cfg(feature = "csv-output")]
pub use csv_file::CsvContactSource;
pub use macos::{MacContactsSource, parse_contact_lines};

use crate::error::Result;
use crate::identity::{ContactRecord, NameDirectory};

/// Something that can enumerate contacts.
pub trait ContactSource {
    /// Human-readable source name, used in errors and logs.
    fn name(&self) -> &'static str;

    /// Returns every contact the source can read.
    ///
    /// Implementations should skip partial failures and only return an
    /// error when nothing could be read.
    fn fetch(&self) -> Result<Vec<ContactRecord>>;
}

/// Reads all records from `source` into a new directory.
///
/// Returns the directory and the number of records it accepted.
pub fn load_directory(source: &dyn ContactSource) -> Result<(NameDirectory, usize)> {
    let records = source.fetch()?;
    let mut directory = NameDirectory::new();
    let accepted = records
        .iter()
        .filter(|record| directory.ingest_record(record))
        .count();

    tracing::debug!(
        source = source.name(),
        fetched = records.len(),
        accepted,
        keys = directory.len(),
        "loaded contacts"
    );
    Ok((directory, accepted))
}
