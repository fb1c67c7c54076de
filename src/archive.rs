//! Read-only access to the Messages archive (`chat.db`).
//!
//! Only three tables matter for export:
//!
//! | Table | Used for |
//! |-------|----------|
//! | `chat` | conversation identifier and optional group name |
//! | `message` | text, rich-text body, date, direction |
//! | `attachment` | stored file path and MIME type |
//!
//! joined through `chat_message_join` and `message_attachment_join`.
//!
//! The database is opened through a `mode=ro` URI so a running Messages
//! app is never disturbed.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags, Row, params};
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
pub const APPLE_EPOCH_OFFSET: i64 = 978_307_200;

const NANOS_PER_SEC: i64 = 1_000_000_000;

// SMS and iMessage threads with one handle are separate `chat` rows that
// share a `chat_identifier`; they are merged into one conversation.
const CONVERSATIONS_SQL: &str = "
    SELECT MIN(c.ROWID) AS first_rowid,
           c.chat_identifier,
           MAX(NULLIF(c.display_name, '')),
           COUNT(DISTINCT m.ROWID) AS msg_count
    FROM chat c
    LEFT JOIN chat_message_join cmj ON c.ROWID = cmj.chat_id
    LEFT JOIN message m ON cmj.message_id = m.ROWID
    GROUP BY c.chat_identifier
    HAVING msg_count > 0
    ORDER BY msg_count DESC, first_rowid ASC";

const MESSAGES_SQL: &str = "
    SELECT DISTINCT m.ROWID, m.text, m.attributedBody, m.date, m.is_from_me,
           m.cache_has_attachments
    FROM message m
    JOIN chat_message_join cmj ON m.ROWID = cmj.message_id
    JOIN chat c ON cmj.chat_id = c.ROWID
    WHERE c.chat_identifier = ?1
    ORDER BY m.date ASC, m.ROWID ASC";

const ATTACHMENTS_SQL: &str = "
    SELECT a.filename, a.mime_type
    FROM message_attachment_join maj
    JOIN attachment a ON maj.attachment_id = a.ROWID
    WHERE maj.message_id = ?1";

/// One conversation with at least one message: every `chat` row sharing
/// a `chat_identifier`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Lowest `chat` row id among the merged rows.
    pub rowid: i64,
    /// Phone number, email or group id.
    pub chat_identifier: String,
    /// Group name, when the user set one on any merged row. Empty names
    /// are `None`.
    pub display_name: Option<String>,
    /// Distinct messages joined to the merged rows.
    pub message_count: usize,
}

/// One `message` row, undecoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawMessage {
    pub id: i64,
    /// Plain text; empty strings are `None`.
    pub text: Option<String>,
    /// Rich-text body (`attributedBody`).
    pub encoded_body: Option<Vec<u8>>,
    /// Nanoseconds since 2001-01-01 UTC, `0` when unknown.
    pub date: i64,
    pub is_from_me: bool,
    pub has_attachments: bool,
}

impl RawMessage {
    /// Send time, or `None` when the archive has no date.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        apple_timestamp(self.date)
    }
}

/// One attachment row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttachmentRow {
    /// Stored path, usually starting with `~/Library/Messages/Attachments`.
    pub filename: Option<String>,
    pub mime_type: Option<String>,
}

/// Converts an archive date (ns since 2001-01-01 UTC) to a timestamp.
///
/// ```rust
/// use imsg_export::archive::apple_timestamp;
///
/// assert_eq!(apple_timestamp(0), None);
/// let ts = apple_timestamp(1_000_000_000).unwrap();
/// assert_eq!(ts.to_rfc3339(), "2001-01-01T00:00:01+00:00");
/// ```
pub fn apple_timestamp(nanos: i64) -> Option<DateTime<Utc>> {
    if nanos == 0 {
        return None;
    }
    let secs = nanos.div_euclid(NANOS_PER_SEC);
    let subsec = nanos.rem_euclid(NANOS_PER_SEC) as u32;
    DateTime::from_timestamp(APPLE_EPOCH_OFFSET + secs, subsec)
}

/// `~/Library/Messages/chat.db`, if a home directory is known.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("Library").join("Messages").join("chat.db"))
}

/// Read-only handle on `chat.db`.
#[derive(Debug)]
pub struct ChatDatabase {
    conn: Connection,
    path: PathBuf,
}

impl ChatDatabase {
    /// Opens the archive read-only.
    ///
    /// Fails with [`ExportError::DatabaseNotFound`] when the file is absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ExportError::database_not_found(path));
        }

        let uri = format!("file:{}?mode=ro", path.display());
        let conn = Connection::open_with_flags(
            uri,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        tracing::debug!(path = %path.display(), "opened message archive");
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Path the archive was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All conversations with messages, busiest first, one per
    /// `chat_identifier`.
    pub fn conversations(&self) -> Result<Vec<Conversation>> {
        let mut stmt = self.conn.prepare(CONVERSATIONS_SQL)?;
        let rows = stmt.query_map([], |row| {
            Ok(Conversation {
                rowid: row.get(0)?,
                chat_identifier: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                display_name: non_empty(row.get(2)?),
                message_count: row.get::<_, i64>(3)? as usize,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Messages of one conversation across every `chat` row with this
    /// identifier, oldest first. A message joined to several of those rows
    /// is returned once.
    pub fn messages(&self, chat_identifier: &str) -> Result<Vec<RawMessage>> {
        let mut stmt = self.conn.prepare_cached(MESSAGES_SQL)?;
        let rows = stmt.query_map(params![chat_identifier], raw_message)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Attachment rows of one message.
    pub fn attachments(&self, message_id: i64) -> Result<Vec<AttachmentRow>> {
        let mut stmt = self.conn.prepare_cached(ATTACHMENTS_SQL)?;
        let rows = stmt.query_map(params![message_id], |row| {
            Ok(AttachmentRow {
                filename: row.get(0)?,
                mime_type: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn raw_message(row: &Row<'_>) -> rusqlite::Result<RawMessage> {
    Ok(RawMessage {
        id: row.get(0)?,
        text: non_empty(row.get(1)?),
        encoded_body: row.get(2)?,
        date: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
        is_from_me: row.get::<_, Option<i64>>(4)?.unwrap_or(0) != 0,
        has_attachments: row.get::<_, Option<i64>>(5)?.unwrap_or(0) != 0,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE chat (ROWID INTEGER PRIMARY KEY, chat_identifier TEXT, display_name TEXT);
             CREATE TABLE message (ROWID INTEGER PRIMARY KEY, text TEXT, attributedBody BLOB,
                 date INTEGER, is_from_me INTEGER, cache_has_attachments INTEGER);
             CREATE TABLE chat_message_join (chat_id INTEGER, message_id INTEGER);
             CREATE TABLE attachment (ROWID INTEGER PRIMARY KEY, filename TEXT, mime_type TEXT);
             CREATE TABLE message_attachment_join (message_id INTEGER, attachment_id INTEGER);

             INSERT INTO chat VALUES (1, '+16824380581', ''), (2, 'chat99', 'Book Club'), (3, 'idle', NULL);
             INSERT INTO message VALUES
                 (10, 'second', NULL, 2000000000, 0, 0),
                 (11, 'first', NULL, 1000000000, 1, 1),
                 (12, '', X'0102', 0, 0, NULL),
                 (20, 'a', NULL, 5, 0, 0),
                 (21, 'b', NULL, 6, 0, 0),
                 (22, 'c', NULL, 7, 1, 0),
                 (23, 'd', NULL, 8, 0, 0);
             INSERT INTO chat_message_join VALUES (1, 10), (1, 11), (1, 12), (2, 20), (2, 21), (2, 22), (2, 23);
             INSERT INTO attachment VALUES (100, '~/Library/Messages/Attachments/a.jpg', 'image/jpeg');
             INSERT INTO message_attachment_join VALUES (11, 100);",
        )
        .unwrap();
        (dir, path)
    }

    #[test]
    fn test_apple_timestamp() {
        assert_eq!(apple_timestamp(0), None);
        let expected = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 1).unwrap();
        assert_eq!(apple_timestamp(NANOS_PER_SEC), Some(expected));

        // 2024-03-09T18:05:00Z
        let ns = (1_710_007_500 - APPLE_EPOCH_OFFSET) * NANOS_PER_SEC;
        let ts = apple_timestamp(ns).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 9, 18, 5, 0).unwrap());
    }

    #[test]
    fn test_apple_timestamp_before_epoch() {
        let ts = apple_timestamp(-NANOS_PER_SEC / 2).unwrap();
        assert_eq!(ts.timestamp(), APPLE_EPOCH_OFFSET - 1);
        assert_eq!(ts.timestamp_subsec_nanos(), 500_000_000);
    }

    #[test]
    fn test_open_missing_database() {
        let err = ChatDatabase::open("/nonexistent/chat.db").unwrap_err();
        assert!(err.is_database_not_found());
    }

    #[test]
    fn test_conversations_ordered_by_count() {
        let (_dir, path) = fixture();
        let db = ChatDatabase::open(&path).unwrap();
        let chats = db.conversations().unwrap();

        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].chat_identifier, "chat99");
        assert_eq!(chats[0].display_name.as_deref(), Some("Book Club"));
        assert_eq!(chats[0].message_count, 4);
        assert_eq!(chats[1].chat_identifier, "+16824380581");
        assert_eq!(chats[1].display_name, None);
        assert_eq!(chats[1].message_count, 3);
    }

    #[test]
    fn test_messages_ordered_by_date() {
        let (_dir, path) = fixture();
        let db = ChatDatabase::open(&path).unwrap();
        let messages = db.messages("+16824380581").unwrap();

        let ids: Vec<i64> = messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![12, 11, 10]);

        assert_eq!(messages[0].text, None);
        assert_eq!(messages[0].encoded_body.as_deref(), Some(&[1u8, 2][..]));
        assert_eq!(messages[0].timestamp(), None);
        assert!(!messages[0].has_attachments);

        assert!(messages[1].is_from_me);
        assert!(messages[1].has_attachments);
        assert_eq!(messages[1].text.as_deref(), Some("first"));
    }

    #[test]
    fn test_threads_sharing_an_identifier_are_merged() {
        let (_dir, path) = fixture();
        {
            let conn = Connection::open(&path).unwrap();
            // an SMS thread next to the iMessage thread of chat 1
            conn.execute_batch(
                "INSERT INTO chat VALUES (4, '+16824380581', NULL);
                 INSERT INTO message VALUES (13, 'over sms', NULL, 1500000000, 0, 0);
                 INSERT INTO chat_message_join VALUES (4, 13), (4, 10);",
            )
            .unwrap();
        }

        let db = ChatDatabase::open(&path).unwrap();
        let chats = db.conversations().unwrap();
        let alex: Vec<&Conversation> = chats
            .iter()
            .filter(|c| c.chat_identifier == "+16824380581")
            .collect();
        assert_eq!(alex.len(), 1);
        assert_eq!(alex[0].rowid, 1);
        assert_eq!(alex[0].message_count, 4);

        let ids: Vec<i64> = db
            .messages("+16824380581")
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![12, 11, 13, 10]);
    }

    #[test]
    fn test_group_name_from_any_merged_row() {
        let (_dir, path) = fixture();
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "INSERT INTO chat VALUES (5, 'chat99', '');
                 INSERT INTO chat_message_join VALUES (5, 20);",
            )
            .unwrap();
        }

        let db = ChatDatabase::open(&path).unwrap();
        let chats = db.conversations().unwrap();
        assert_eq!(chats[0].chat_identifier, "chat99");
        assert_eq!(chats[0].display_name.as_deref(), Some("Book Club"));
        assert_eq!(chats[0].message_count, 4);
    }

    #[test]
    fn test_attachments_for_message() {
        let (_dir, path) = fixture();
        let db = ChatDatabase::open(&path).unwrap();

        let rows = db.attachments(11).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].mime_type.as_deref(), Some("image/jpeg"));
        assert!(db.attachments(10).unwrap().is_empty());
    }

    #[test]
    fn test_archive_is_read_only() {
        let (_dir, path) = fixture();
        let db = ChatDatabase::open(&path).unwrap();
        let result = db.conn.execute("DELETE FROM message", []);
        assert!(result.is_err());
    }
}
