//! JSON Lines (JSONL) output writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::json_writer::JsonMessage;
use crate::Message;
use crate::config::OutputConfig;
use crate::error::Result;

/// Writes messages as JSON Lines, one object per line:
/// ```jsonl
/// {"sender":"Alex","content":"Hello","from_me":false}
/// {"sender":"You","content":"Hi","from_me":true}
/// ```
pub fn write_jsonl(messages: &[Message], output_path: &Path, config: &OutputConfig) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);

    for msg in messages {
        let line = serde_json::to_string(&JsonMessage::from_message(msg, config))?;
        writeln!(writer, "{line}")?;
    }

    writer.flush()?;
    Ok(())
}

/// Converts messages to a JSONL string.
pub fn to_jsonl(messages: &[Message], config: &OutputConfig) -> Result<String> {
    let mut out = String::new();
    for msg in messages {
        out.push_str(&serde_json::to_string(&JsonMessage::from_message(msg, config))?);
        out.push('\n');
    }
    Ok(out)
}
