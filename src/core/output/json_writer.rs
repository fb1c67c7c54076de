//! JSON output writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::Message;
use crate::config::OutputConfig;
use crate::error::Result;
use crate::message::Attachment;

/// Message structure for JSON and JSONL output.
/// Only includes the optional fields enabled in [`OutputConfig`].
#[derive(Serialize)]
pub(super) struct JsonMessage<'a> {
    sender: &'a str,
    content: &'a str,
    from_me: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    #[serde(skip_serializing_if = "no_attachments")]
    attachments: &'a [Attachment],
}

impl<'a> JsonMessage<'a> {
    pub(super) fn from_message(msg: &'a Message, config: &OutputConfig) -> Self {
        Self {
            sender: &msg.sender,
            content: &msg.content,
            from_me: msg.is_from_me,
            timestamp: if config.include_timestamps {
                msg.timestamp
                    .map(|ts| ts.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            } else {
                None
            },
            id: if config.include_ids { msg.id } else { None },
            attachments: if config.include_attachments {
                &msg.attachments
            } else {
                &[]
            },
        }
    }
}

fn no_attachments(attachments: &&[Attachment]) -> bool {
    attachments.is_empty()
}

/// Writes messages to a JSON file as an array.
///
/// # Format
/// ```json
/// [
///   {"sender": "Alex", "content": "Hello", "from_me": false},
///   {"sender": "You", "content": "Hi", "from_me": true}
/// ]
/// ```
pub fn write_json(messages: &[Message], output_path: &Path, config: &OutputConfig) -> Result<()> {
    let json = to_json(messages, config)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Converts messages to a pretty-printed JSON array.
pub fn to_json(messages: &[Message], config: &OutputConfig) -> Result<String> {
    let json_messages: Vec<JsonMessage<'_>> = messages
        .iter()
        .map(|m| JsonMessage::from_message(m, config))
        .collect();

    Ok(serde_json::to_string_pretty(&json_messages)?)
}
