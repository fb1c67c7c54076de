//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`default_output_dir`] - Where exports land when `--output` is omitted
//!
//! The output format is the library's [`OutputFormat`], parsed through its
//! [`FromStr`](std::str::FromStr) implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::archive::default_database_path;
use crate::config::{ContactsConfig, ExportConfig, OutputConfig};
use crate::format::OutputFormat;
use crate::message::DisplayZone;

/// Folder created on the desktop when `--output` is omitted.
pub const DEFAULT_EXPORT_FOLDER: &str = "iMessage_Export";

/// Export macOS Messages conversations into per-contact documents,
/// resolving phone numbers to contact names.
#[derive(Parser, Debug, Clone)]
#[command(name = "imsg-export")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    imsg-export
    imsg-export -o ~/Documents/messages
    imsg-export --format json --ids
    imsg-export --contacts contacts.csv --no-attachments
    imsg-export --db ./chat.db --no-contacts -f csv

Full Disk Access is required to read ~/Library/Messages/chat.db.")]
pub struct Args {
    /// Path to the Messages database [default: ~/Library/Messages/chat.db]
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Output directory [default: ~/Desktop/iMessage_Export]
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Document format (html, json, jsonl, csv)
    #[arg(short, long, default_value = "html")]
    pub format: OutputFormat,

    /// Read contacts from a CSV file instead of the Contacts app
    #[arg(long, value_name = "CSV", conflicts_with = "no_contacts")]
    pub contacts: Option<PathBuf>,

    /// Skip contact lookup and keep raw phone numbers and emails
    #[arg(long)]
    pub no_contacts: bool,

    /// Do not copy attachments
    #[arg(long)]
    pub no_attachments: bool,

    /// People fetched from the Contacts app per request
    #[arg(
        long,
        value_name = "N",
        default_value_t = 50,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub chunk_size: u32,

    /// Seconds to wait for each Contacts request
    #[arg(long, value_name = "SECS", default_value_t = 90)]
    pub contacts_timeout: u64,

    /// Include message IDs in JSON and CSV output
    #[arg(long)]
    pub ids: bool,

    /// Show times in UTC instead of the local time zone
    #[arg(long)]
    pub utc: bool,

    /// Log debug details to stderr (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Database path, falling back to the standard location.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.db.clone().or_else(default_database_path)
    }

    /// Output directory, falling back to [`default_output_dir`].
    pub fn output_dir(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(default_output_dir)
    }

    /// Contacts app settings derived from the flags.
    pub fn contacts_config(&self) -> ContactsConfig {
        ContactsConfig::new()
            .with_chunk_size(self.chunk_size as usize)
            .with_chunk_timeout(Duration::from_secs(self.contacts_timeout))
    }

    /// Export settings derived from the flags.
    pub fn export_config(&self) -> ExportConfig {
        ExportConfig::new(self.output_dir())
            .with_format(self.format)
            .with_copy_attachments(!self.no_attachments)
            .with_output(
                OutputConfig::new()
                    .with_attachments(!self.no_attachments)
                    .with_ids(self.ids)
                    .with_zone(self.zone()),
            )
    }

    /// Zone for times in HTML and CSV documents.
    pub fn zone(&self) -> DisplayZone {
        if self.utc {
            DisplayZone::Utc
        } else {
            DisplayZone::Local
        }
    }
}

/// `~/Desktop/iMessage_Export`, or `./iMessage_Export` without a home
/// directory.
pub fn default_output_dir() -> PathBuf {
    dirs::desktop_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Desktop")))
        .unwrap_or_default()
        .join(DEFAULT_EXPORT_FOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("imsg-export").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.format, OutputFormat::Html);
        assert_eq!(args.chunk_size, 50);
        assert!(!args.no_contacts);
        assert!(args.output_dir().ends_with(DEFAULT_EXPORT_FOLDER));

        let config = args.export_config();
        assert!(config.copy_attachments);
        assert!(config.output.include_attachments);
        assert!(!config.output.include_ids);
        assert_eq!(config.output.zone, DisplayZone::Local);
    }

    #[test]
    fn test_utc_flag() {
        assert_eq!(parse(&["--utc"]).export_config().output.zone, DisplayZone::Utc);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(parse(&["-f", "json"]).format, OutputFormat::Json);
        assert_eq!(parse(&["--format", "NDJSON"]).format, OutputFormat::Jsonl);
        assert!(Args::try_parse_from(["imsg-export", "-f", "pdf"]).is_err());
    }

    #[test]
    fn test_flags_flow_into_config() {
        let args = parse(&["-o", "/tmp/out", "--no-attachments", "--ids", "--chunk-size", "20"]);
        let config = args.export_config();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert!(!config.copy_attachments);
        assert!(!config.output.include_attachments);
        assert!(config.output.include_ids);
        assert_eq!(args.contacts_config().chunk_size, 20);
    }

    #[test]
    fn test_db_override() {
        let args = parse(&["--db", "/tmp/chat.db"]);
        assert_eq!(args.database_path(), Some(PathBuf::from("/tmp/chat.db")));
    }

    #[test]
    fn test_chunk_size_must_be_positive() {
        assert!(Args::try_parse_from(["imsg-export", "--chunk-size", "0"]).is_err());
    }

    #[test]
    fn test_contacts_conflicts_with_no_contacts() {
        assert!(
            Args::try_parse_from(["imsg-export", "--contacts", "c.csv", "--no-contacts"]).is_err()
        );
    }
}
