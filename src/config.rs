//! Configuration types for decoding, contact loading and export.
//!
//! These are plain builder-style structs with no CLI framework
//! dependency, so the library can be driven without the binary.
//!
//! - [`DecoderConfig`] - thresholds for the heuristic body scan
//! - [`ContactsConfig`] - chunking and timeouts for the Contacts app
//! - [`OutputConfig`] - optional columns/fields in structured documents
//! - [`ExportConfig`] - output location, document format, attachments
//!
//! # Example
//!
//! ```rust
//! use imsg_export::config::{DecoderConfig, ExportConfig};
//! use imsg_export::format::OutputFormat;
//!
//! let decoder = DecoderConfig::new().with_min_alnum_ratio(0.8);
//! let export = ExportConfig::new("/tmp/export")
//!     .with_format(OutputFormat::Jsonl)
//!     .with_copy_attachments(false);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::format::OutputFormat;
use crate::message::DisplayZone;

/// Thresholds for the heuristic tier of the body decoder.
///
/// The defaults keep short messages such as "ok!" and drop binary noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Minimum length of a printable run, before and after trimming (default: 3)
    pub min_run_len: usize,

    /// Minimum share of alphanumeric-or-whitespace characters in a run (default: 0.7)
    pub min_alnum_ratio: f64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            min_run_len: 3,
            min_alnum_ratio: 0.7,
        }
    }
}

impl DecoderConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum printable run length.
    #[must_use]
    pub fn with_min_run_len(mut self, len: usize) -> Self {
        self.min_run_len = len.max(1);
        self
    }

    /// Sets the minimum alphanumeric-or-whitespace ratio.
    #[must_use]
    pub fn with_min_alnum_ratio(mut self, ratio: f64) -> Self {
        self.min_alnum_ratio = ratio.clamp(0.0, 1.0);
        self
    }
}

/// Configuration for enumerating the macOS Contacts app.
///
/// Contacts are fetched through AppleScript in chunks; large address books
/// can take minutes, so every call is bounded by a timeout and a failed
/// chunk only loses that chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactsConfig {
    /// People fetched per AppleScript call (default: 50)
    pub chunk_size: usize,

    /// Timeout for counting people (default: 10s)
    pub count_timeout: Duration,

    /// Timeout for one chunk (default: 90s)
    pub chunk_timeout: Duration,
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            chunk_size: 50,
            count_timeout: Duration::from_secs(10),
            chunk_timeout: Duration::from_secs(90),
        }
    }
}

impl ContactsConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Sets the timeout used when counting people.
    #[must_use]
    pub fn with_count_timeout(mut self, timeout: Duration) -> Self {
        self.count_timeout = timeout;
        self
    }

    /// Sets the per-chunk timeout.
    #[must_use]
    pub fn with_chunk_timeout(mut self, timeout: Duration) -> Self {
        self.chunk_timeout = timeout;
        self
    }
}

/// Which optional fields the structured writers (CSV, JSON, JSONL) emit,
/// and the zone wall-clock times are shown in.
///
/// HTML documents always show timestamps and attachments. The zone applies
/// to HTML and CSV; JSON timestamps are always RFC 3339 in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Include the send time (default: true)
    pub include_timestamps: bool,

    /// Include copied attachment paths (default: true)
    pub include_attachments: bool,

    /// Include archive row ids (default: false)
    pub include_ids: bool,

    /// Zone for human-readable times (default: local)
    #[serde(default)]
    pub zone: DisplayZone,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            include_timestamps: true,
            include_attachments: true,
            include_ids: false,
            zone: DisplayZone::Local,
        }
    }
}

impl OutputConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only sender and content.
    pub fn minimal() -> Self {
        Self {
            include_timestamps: false,
            include_attachments: false,
            include_ids: false,
            zone: DisplayZone::Local,
        }
    }

    /// Enables or disables timestamps.
    #[must_use]
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.include_timestamps = enabled;
        self
    }

    /// Enables or disables attachment paths.
    #[must_use]
    pub fn with_attachments(mut self, enabled: bool) -> Self {
        self.include_attachments = enabled;
        self
    }

    /// Enables or disables row ids.
    #[must_use]
    pub fn with_ids(mut self, enabled: bool) -> Self {
        self.include_ids = enabled;
        self
    }

    /// Sets the zone for human-readable times.
    #[must_use]
    pub fn with_zone(mut self, zone: DisplayZone) -> Self {
        self.zone = zone;
        self
    }
}

/// Configuration for an export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Root directory; one folder per conversation is created beneath it
    pub output_dir: PathBuf,

    /// Document format (default: HTML)
    pub format: OutputFormat,

    /// Copy attachment files next to each document (default: true)
    pub copy_attachments: bool,

    /// Optional fields for structured formats
    pub output: OutputConfig,

    /// Decoder thresholds
    pub decoder: DecoderConfig,
}

impl ExportConfig {
    /// Creates a configuration writing HTML documents under `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            format: OutputFormat::default(),
            copy_attachments: true,
            output: OutputConfig::default(),
            decoder: DecoderConfig::default(),
        }
    }

    /// Sets the document format.
    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Enables or disables attachment copying.
    #[must_use]
    pub fn with_copy_attachments(mut self, enabled: bool) -> Self {
        self.copy_attachments = enabled;
        self
    }

    /// Sets the optional fields for structured formats.
    #[must_use]
    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }

    /// Sets the decoder thresholds.
    #[must_use]
    pub fn with_decoder(mut self, decoder: DecoderConfig) -> Self {
        self.decoder = decoder;
        self
    }
}
