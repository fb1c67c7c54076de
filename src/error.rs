//! Unified error types for imsg-export.
//!
//! The two core components ([`decoder`](crate::decoder) and
//! [`identity`](crate::identity)) never fail: an undecodable body is "no
//! text" and an unknown number resolves to itself. Everything around them
//! (reading the archive, talking to the contacts store, writing documents)
//! reports failures through the single [`ExportError`] enum defined here.
//!
//! # Error Handling Philosophy
//!
//! - **Library users** get typed errors they can match on
//! - **Application users** get clear, actionable error messages
//! - **Developers** get source error chains for debugging

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for imsg-export operations.
///
/// # Example
///
/// ```rust
/// use imsg_export::error::Result;
/// use imsg_export::Message;
///
/// fn my_function() -> Result<Vec<Message>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ExportError>;

/// The error type for all fallible imsg-export operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    /// An I/O error occurred.
    ///
    /// This typically happens when:
    /// - The output directory cannot be created
    /// - Permission denied
    /// - Disk is full (when writing documents)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The Messages database could not be queried.
    #[cfg(feature = "archive")]
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The Messages database does not exist at the expected location.
    ///
    /// On macOS the terminal running the export also needs Full Disk
    /// Access, otherwise the file looks missing.
    #[error("Messages database not found at {}", path.display())]
    DatabaseNotFound {
        /// The path that was checked
        path: PathBuf,
    },

    /// CSV reading or writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[cfg(feature = "json-output")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A contact source failed as a whole.
    ///
    /// Individual chunk failures are logged and skipped; this is returned
    /// only when nothing could be read at all.
    #[error("Contact source '{source_name}' failed: {message}")]
    ContactSource {
        /// Name of the source (e.g. "macOS Contacts", "CSV")
        source_name: &'static str,
        /// Description of what went wrong
        message: String,
    },

    /// An external command did not finish in time.
    #[error("Timed out after {seconds}s while {what}")]
    Timeout {
        /// What was being waited for
        what: String,
        /// The timeout that elapsed
        seconds: u64,
    },

    /// Input or configuration did not match the expected structure.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// The format that was expected
        format: &'static str,
        /// Description of what's wrong
        message: String,
    },
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ExportError {
    /// Creates a missing-database error.
    pub fn database_not_found(path: impl Into<PathBuf>) -> Self {
        ExportError::DatabaseNotFound { path: path.into() }
    }

    /// Creates a contact source error.
    pub fn contact_source(source_name: &'static str, message: impl Into<String>) -> Self {
        ExportError::ContactSource {
            source_name,
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(what: impl Into<String>, seconds: u64) -> Self {
        ExportError::Timeout {
            what: what.into(),
            seconds,
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        ExportError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ExportError::Io(_))
    }

    /// Returns `true` if the database file was missing.
    pub fn is_database_not_found(&self) -> bool {
        matches!(self, ExportError::DatabaseNotFound { .. })
    }

    /// Returns `true` if this is a contact source error.
    pub fn is_contact_source(&self) -> bool {
        matches!(self, ExportError::ContactSource { .. })
    }

    /// Returns `true` if this is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExportError::Timeout { .. })
    }

    /// Returns `true` if this is an invalid format error.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, ExportError::InvalidFormat { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
