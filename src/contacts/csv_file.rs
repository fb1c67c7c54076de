//! Contacts from a CSV file.

use std::path::{Path, PathBuf};

use super::ContactSource;
use crate::error::{ExportError, Result};
use crate::identity::ContactRecord;

const SOURCE_NAME: &str = "CSV";

/// Reads contacts from a CSV file with a header row.
///
/// The `name` and `phone` columns are located by header (case-insensitive);
/// without them the first two columns are used. Rows missing either value
/// are skipped.
#[derive(Debug, Clone)]
pub struct CsvContactSource {
    path: PathBuf,
}

impl CsvContactSource {
    /// Creates a source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContactSource for CsvContactSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn fetch(&self) -> Result<Vec<ContactRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let headers = reader.headers()?.clone();
        let column = |wanted: &str, fallback: usize| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(wanted))
                .unwrap_or(fallback)
        };
        let name_col = column("name", 0);
        let phone_col = column("phone", 1);

        if name_col == phone_col || headers.len() < 2 {
            return Err(ExportError::contact_source(
                SOURCE_NAME,
                format!("{} needs a name and a phone column", self.path.display()),
            ));
        }

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            match (row.get(name_col), row.get(phone_col)) {
                (Some(name), Some(phone)) if !name.is_empty() && !phone.is_empty() => {
                    records.push(ContactRecord::new(name, phone));
                }
                _ => {}
            }
        }
        Ok(records)
    }
}
