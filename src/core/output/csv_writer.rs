//! CSV output writer.

use std::fs::File;
use std::path::Path;

use crate::Message;
use crate::config::OutputConfig;
use crate::error::Result;

const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes messages to CSV with semicolon delimiter.
///
/// # Format
/// - Delimiter: `;`
/// - Columns: depend on [`OutputConfig`]
///   - Always: `Sender`, `Content`
///   - With ids: leading `ID`
///   - With timestamps: `Timestamp` after `Sender`
///   - With attachments: trailing `Attachments` (paths joined by `, `)
/// - Encoding: UTF-8
pub fn write_csv(messages: &[Message], output_path: &Path, config: &OutputConfig) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(file);

    writer.write_record(build_header(config))?;
    for msg in messages {
        writer.write_record(build_record(msg, config))?;
    }

    writer.flush()?;
    Ok(())
}

/// Converts messages to a CSV string.
pub fn to_csv(messages: &[Message], config: &OutputConfig) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    writer.write_record(build_header(config))?;
    for msg in messages {
        writer.write_record(build_record(msg, config))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn build_header(config: &OutputConfig) -> Vec<&'static str> {
    let mut header = Vec::new();

    if config.include_ids {
        header.push("ID");
    }
    header.push("Sender");
    if config.include_timestamps {
        header.push("Timestamp");
    }
    header.push("Content");
    if config.include_attachments {
        header.push("Attachments");
    }

    header
}

fn build_record(msg: &Message, config: &OutputConfig) -> Vec<String> {
    let mut record = Vec::new();

    if config.include_ids {
        record.push(msg.id.map(|id| id.to_string()).unwrap_or_default());
    }
    record.push(msg.sender.clone());
    if config.include_timestamps {
        record.push(
            msg.timestamp
                .map(|ts| config.zone.format(ts, CSV_TIMESTAMP_FORMAT))
                .unwrap_or_default(),
        );
    }
    record.push(msg.content.clone());
    if config.include_attachments {
        record.push(
            msg.attachments
                .iter()
                .map(|a| a.relative_path.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        );
    }

    record
}
