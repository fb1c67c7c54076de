//! The export pipeline.
//!
//! For every conversation in the archive, busiest first:
//!
//! 1. name it: the group name if set, else the resolved contact name, else
//!    the raw identifier; clean it for the file system and make it unique;
//! 2. load its messages, oldest first, and recover each body (plain text,
//!    else the rich-text decoder), decoding in parallel;
//! 3. copy attachments into `<label>/attachments/`;
//! 4. write `<label>/<label>_chat.<ext>`.
//!
//! Database and file-system errors abort the run. A missing or
//! uncopyable attachment only loses that attachment.
//!
//! # Example
//!
//! ```rust,no_run
//! use imsg_export::archive::ChatDatabase;
//! use imsg_export::config::ExportConfig;
//! use imsg_export::export::Exporter;
//! use imsg_export::identity::NameDirectory;
//!
//! let db = ChatDatabase::open("/Users/me/Library/Messages/chat.db")?;
//! let directory = NameDirectory::new();
//! let report = Exporter::new(&db, &directory, ExportConfig::new("/tmp/export")).run()?;
//! println!("{} chats, {} messages", report.stats.chats, report.stats.messages);
//! # Ok::<(), imsg_export::ExportError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::Message;
use crate::archive::{ChatDatabase, Conversation, RawMessage};
use crate::config::ExportConfig;
use crate::core::attachments::{ATTACHMENTS_DIR, copy_into, expand_home};
use crate::core::naming::{LabelRegistry, clean_label};
use crate::core::stats::ExportStats;
use crate::decoder::BodyDecoder;
use crate::error::Result;
use crate::format::write_to_format;
use crate::identity::NameDirectory;
use crate::message::Attachment;
use crate::progress::{Progress, ProgressCallback, Stage};

/// Sender label for messages written by the archive owner.
pub const SELF_SENDER: &str = "You";

/// One written conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedConversation {
    /// Raw `chat_identifier`.
    pub chat_identifier: String,
    /// Folder name actually used (may carry a ` (n)` suffix).
    pub label: String,
    /// Path of the written document.
    pub document: PathBuf,
    /// Messages written.
    pub messages: usize,
    /// Attachments copied.
    pub attachments: usize,
}

/// Result of an export run.
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub stats: ExportStats,
    pub conversations: Vec<ExportedConversation>,
    /// Phone-number identifiers that stayed unresolved, in export order.
    /// Emails and named group chats are not listed.
    pub unmatched: Vec<String>,
}

/// Display name for a conversation and whether it differs from the raw
/// identifier.
pub fn conversation_name(
    conversation: &Conversation,
    directory: &NameDirectory,
) -> (String, bool) {
    let name = match &conversation.display_name {
        Some(name) => name.clone(),
        None => directory.resolve(&conversation.chat_identifier).to_string(),
    };
    let matched = name != conversation.chat_identifier;
    (name, matched)
}

/// Recovers the body of one message: non-empty plain text wins, otherwise
/// the rich-text body is decoded.
pub fn message_body(raw: &RawMessage, decoder: &BodyDecoder) -> Option<String> {
    raw.text
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| decoder.decode(raw.encoded_body.as_deref()))
}

/// Drives one export run over an open archive.
pub struct Exporter<'a> {
    db: &'a ChatDatabase,
    directory: &'a NameDirectory,
    config: ExportConfig,
    decoder: BodyDecoder,
    progress: Option<ProgressCallback>,
}

impl<'a> Exporter<'a> {
    /// Creates an exporter.
    pub fn new(db: &'a ChatDatabase, directory: &'a NameDirectory, config: ExportConfig) -> Self {
        let decoder = BodyDecoder::with_config(config.decoder);
        Self {
            db,
            directory,
            config,
            decoder,
            progress: None,
        }
    }

    /// Reports progress after every conversation.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Exports every conversation.
    pub fn run(&self) -> Result<ExportReport> {
        fs::create_dir_all(&self.config.output_dir)?;

        let conversations = self.db.conversations()?;
        let total = conversations.len();
        let mut labels = LabelRegistry::new();
        let mut report = ExportReport::default();

        for (index, conversation) in conversations.iter().enumerate() {
            let (name, matched) = conversation_name(conversation, self.directory);
            let sender = clean_label(&name);
            let label = labels.claim(&sender);

            let exported = self.export_conversation(conversation, &sender, &label)?;

            report.stats.chats += 1;
            report.stats.messages += exported.messages;
            report.stats.attachments += exported.attachments;
            if matched {
                report.stats.matched += 1;
            } else if conversation.display_name.is_none()
                && !conversation.chat_identifier.contains('@')
            {
                report.unmatched.push(conversation.chat_identifier.clone());
            }

            tracing::debug!(
                chat = %conversation.chat_identifier,
                label = %exported.label,
                messages = exported.messages,
                attachments = exported.attachments,
                "exported conversation"
            );

            if let Some(callback) = &self.progress {
                callback(
                    Progress::new(Stage::Export, index + 1)
                        .with_total(total)
                        .with_current(exported.label.clone()),
                );
            }
            report.conversations.push(exported);
        }

        Ok(report)
    }

    fn export_conversation(
        &self,
        conversation: &Conversation,
        sender: &str,
        label: &str,
    ) -> Result<ExportedConversation> {
        let folder = self.config.output_dir.join(label);
        fs::create_dir_all(&folder)?;

        let raw = self.db.messages(&conversation.chat_identifier)?;
        let decoder = &self.decoder;
        let bodies: Vec<Option<String>> = raw
            .par_iter()
            .map(|m| message_body(m, decoder))
            .collect();

        let mut messages = Vec::with_capacity(raw.len());
        let mut copied = 0;
        for (row, body) in raw.iter().zip(bodies) {
            let attachments = if row.has_attachments && self.config.copy_attachments {
                self.copy_attachments(row.id, &folder)?
            } else {
                Vec::new()
            };
            copied += attachments.len();

            let mut msg = Message::new(
                if row.is_from_me { SELF_SENDER } else { sender },
                body.unwrap_or_default(),
            )
            .with_optional_timestamp(row.timestamp())
            .from_me(row.is_from_me)
            .with_attachments(attachments);
            if let Ok(id) = u64::try_from(row.id) {
                msg = msg.with_id(id);
            }
            messages.push(msg);
        }

        let document = folder.join(self.config.format.document_name(label));
        write_to_format(
            sender,
            &messages,
            &document,
            self.config.format,
            &self.config.output,
        )?;

        Ok(ExportedConversation {
            chat_identifier: conversation.chat_identifier.clone(),
            label: label.to_string(),
            document,
            messages: messages.len(),
            attachments: copied,
        })
    }

    /// Copies the attachments of one message, skipping files that are
    /// missing or fail to copy.
    fn copy_attachments(&self, message_id: i64, folder: &Path) -> Result<Vec<Attachment>> {
        let target = folder.join(ATTACHMENTS_DIR);
        let mut copied = Vec::new();

        for row in self.db.attachments(message_id)? {
            let Some(stored) = row.filename.as_deref() else {
                continue;
            };
            let source = expand_home(stored);
            if !source.is_file() {
                tracing::debug!(path = %source.display(), "attachment missing, skipping");
                continue;
            }

            match copy_into(&source, &target) {
                Ok(dest) => {
                    let file_name = dest
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    copied.push(Attachment::new(
                        format!("{ATTACHMENTS_DIR}/{file_name}"),
                        row.mime_type.as_deref(),
                    ));
                }
                Err(e) => {
                    tracing::warn!(
                        path = %source.display(),
                        error = %e,
                        "attachment copy failed, skipping"
                    );
                }
            }
        }

        Ok(copied)
    }
}
