//! Exported message type.
//!
//! This module provides [`Message`], the rendered form of one archive row:
//! the resolved sender, the recovered body, and any attachments that were
//! copied next to the document. Every output writer consumes this type.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```
//! use imsg_export::Message;
//! use imsg_export::message::DisplayZone;
//!
//! let msg = Message::new("Alex", "see you at 5");
//! assert_eq!(msg.sender(), "Alex");
//! assert_eq!(msg.content(), "see you at 5");
//! assert_eq!(msg.display_timestamp(DisplayZone::Local), "Unknown");
//! ```
//!
//! ## Builder Pattern
//!
//! ```
//! use imsg_export::message::{Attachment, DisplayZone, Message};
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2024, 3, 9, 18, 5, 0).unwrap();
//! let msg = Message::new("You", "photo from today")
//!     .with_id(42)
//!     .with_timestamp(ts)
//!     .from_me(true)
//!     .with_attachment(Attachment::new("attachments/IMG_0001.jpg", Some("image/jpeg")));
//!
//! assert_eq!(msg.display_timestamp(DisplayZone::Utc), "Mar 09, 2024 at 06:05 PM");
//! assert!(msg.has_attachments());
//! ```

use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Format used for human-readable timestamps in documents.
pub const TIMESTAMP_FORMAT: &str = "%b %d, %Y at %I:%M %p";

/// Placeholder rendered when a message has no timestamp.
pub const UNKNOWN_TIMESTAMP: &str = "Unknown";

/// Time zone wall-clock timestamps are shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayZone {
    /// The machine's local time zone, as the Messages app shows it.
    #[default]
    Local,
    /// Coordinated Universal Time.
    Utc,
}

impl DisplayZone {
    /// Formats `ts` in this zone with a `strftime`-style pattern.
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use imsg_export::message::DisplayZone;
    ///
    /// let ts = Utc.with_ymd_and_hms(2024, 3, 9, 18, 5, 0).unwrap();
    /// assert_eq!(DisplayZone::Utc.format(ts, "%H:%M"), "18:05");
    /// ```
    pub fn format(self, ts: DateTime<Utc>, pattern: &str) -> String {
        match self {
            DisplayZone::Local => ts.with_timezone(&Local).format(pattern).to_string(),
            DisplayZone::Utc => ts.format(pattern).to_string(),
        }
    }
}

/// How an attachment is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    /// Shown inline as an image.
    Image,
    /// Shown inline as a video player.
    Video,
    /// Shown as a link.
    #[default]
    Other,
}

impl AttachmentKind {
    /// Classifies a MIME type. Anything mentioning `image` is an image,
    /// anything mentioning `video` a video.
    ///
    /// ```
    /// use imsg_export::message::AttachmentKind;
    ///
    /// assert_eq!(AttachmentKind::from_mime(Some("image/heic")), AttachmentKind::Image);
    /// assert_eq!(AttachmentKind::from_mime(Some("video/quicktime")), AttachmentKind::Video);
    /// assert_eq!(AttachmentKind::from_mime(None), AttachmentKind::Other);
    /// ```
    pub fn from_mime(mime: Option<&str>) -> Self {
        match mime {
            Some(m) if m.contains("image") => AttachmentKind::Image,
            Some(m) if m.contains("video") => AttachmentKind::Video,
            _ => AttachmentKind::Other,
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentKind::Image => write!(f, "image"),
            AttachmentKind::Video => write!(f, "video"),
            AttachmentKind::Other => write!(f, "file"),
        }
    }
}

/// An attachment copied alongside a conversation document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Path relative to the document, using `/` separators.
    pub relative_path: String,

    /// File name shown as link text.
    pub file_name: String,

    /// Rendering hint derived from the MIME type.
    pub kind: AttachmentKind,
}

impl Attachment {
    /// Creates an attachment from its relative path and MIME type.
    ///
    /// The file name is the last path component.
    pub fn new(relative_path: impl Into<String>, mime: Option<&str>) -> Self {
        let relative_path = relative_path.into();
        let file_name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&relative_path)
            .to_string();
        Self {
            relative_path,
            file_name,
            kind: AttachmentKind::from_mime(mime),
        }
    }
}

/// One exported message.
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `sender` | `String` | `You` or the resolved conversation name |
/// | `content` | `String` | Plain text or recovered rich-text body |
/// | `timestamp` | `Option<DateTime<Utc>>` | Send time, `None` when unknown |
/// | `id` | `Option<u64>` | Archive row id |
/// | `is_from_me` | `bool` | Sent by the archive owner |
/// | `attachments` | `Vec<Attachment>` | Copied attachments |
///
/// Optional fields are omitted from JSON when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Display name of the author.
    pub sender: String,

    /// Body text. Empty when nothing was recoverable.
    pub content: String,

    /// When the message was sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    /// Archive row id.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub id: Option<u64>,

    /// Whether the archive owner sent this message.
    #[serde(default)]
    pub is_from_me: bool,

    /// Attachments copied next to the document.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Creates a message with only sender and content.
    pub fn new(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            timestamp: None,
            id: None,
            is_from_me: false,
            attachments: Vec::new(),
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Sets the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Sets an optional timestamp.
    #[must_use]
    pub fn with_optional_timestamp(mut self, ts: Option<DateTime<Utc>>) -> Self {
        self.timestamp = ts;
        self
    }

    /// Sets the archive row id.
    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Marks the message as sent (or not) by the archive owner.
    #[must_use]
    pub fn from_me(mut self, is_from_me: bool) -> Self {
        self.is_from_me = is_from_me;
        self
    }

    /// Appends one attachment.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Replaces the attachment list.
    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    /// Returns the sender name.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Returns the message content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the timestamp, if known.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Returns the archive row id, if set.
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    /// Returns the attachments.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    // =========================================================================
    // Utility methods
    // =========================================================================

    /// Timestamp as `Mar 09, 2024 at 06:05 PM` in `zone`, or `Unknown`.
    pub fn display_timestamp(&self, zone: DisplayZone) -> String {
        self.timestamp.map_or_else(
            || UNKNOWN_TIMESTAMP.to_string(),
            |ts| zone.format(ts, TIMESTAMP_FORMAT),
        )
    }

    /// Returns `true` if any attachment was copied.
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// Returns `true` if the content is empty or whitespace-only.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new("", "")
    }
}
