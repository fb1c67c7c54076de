//! Shared fixtures: a miniature Messages archive.
//!
//! | chat | identifier | display name | messages |
//! |------|------------|--------------|----------|
//! | 1 | `+16824380581` | - | 4 (rich text, image, missing video) |
//! | 2 | `group42` | `Book/Club` | 3 |
//! | 3 | `5550001234` | - | 2 (one with no body at all) |
//! | 4 | `+12125550100` | `""` | 1 |
//! | 5 | `alex@example.com` | - | 1 |
//! | 6 | `idle` | - | 0 |

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};

const APPLE_EPOCH_OFFSET: i64 = 978_307_200;

/// 2024-03-09T18:05:00Z
pub const BASE_UNIX: i64 = 1_710_007_500;

/// Typedstream body whose payload is `meet at 5?`.
pub const RICH_BODY: &[u8] = b"\x04\x0bstreamtyped\x81\xe8\x03\x84\x01@\x84\x84\x84\x12NSAttributedString\x00\x84\x84\x08NSObject\x00\x85\x92\x84\x84\x84\x08NSString\x01\x94\x84\x01+Fmeet at 5?\x86\x84\x02iI\x01\x0a\x92\x84\x84\x84\x0cNSDictionary\x00";

pub struct Archive {
    pub db: PathBuf,
    pub photo: PathBuf,
}

pub fn apple_ns(unix: i64) -> i64 {
    (unix - APPLE_EPOCH_OFFSET) * 1_000_000_000
}

/// Writes `chat.db` and an attachment source file into `dir`.
pub fn build_archive(dir: &Path) -> Archive {
    let db = dir.join("chat.db");
    let media = dir.join("media");
    fs::create_dir_all(&media).unwrap();
    let photo = media.join("photo.jpg");
    fs::write(&photo, b"\xff\xd8\xff\xe0 jpeg").unwrap();

    let conn = Connection::open(&db).unwrap();
    conn.execute_batch(
        "CREATE TABLE chat (ROWID INTEGER PRIMARY KEY, chat_identifier TEXT, display_name TEXT);
         CREATE TABLE message (ROWID INTEGER PRIMARY KEY, text TEXT, attributedBody BLOB,
             date INTEGER, is_from_me INTEGER, cache_has_attachments INTEGER);
         CREATE TABLE chat_message_join (chat_id INTEGER, message_id INTEGER);
         CREATE TABLE attachment (ROWID INTEGER PRIMARY KEY, filename TEXT, mime_type TEXT);
         CREATE TABLE message_attachment_join (message_id INTEGER, attachment_id INTEGER);

         INSERT INTO chat VALUES
             (1, '+16824380581', NULL),
             (2, 'group42', 'Book/Club'),
             (3, '5550001234', NULL),
             (4, '+12125550100', ''),
             (5, 'alex@example.com', NULL),
             (6, 'idle', NULL);",
    )
    .unwrap();

    // Inserted out of order on purpose; export sorts by date.
    add_message(&conn, 1, 3, Some("On my way"), None, 120, true, true);
    add_message(&conn, 1, 1, Some("Hey"), None, 0, false, false);
    add_message(&conn, 1, 2, None, Some(RICH_BODY), 60, false, false);
    add_message(&conn, 1, 4, Some("clip"), None, 180, true, true);

    add_message(&conn, 2, 10, Some("Chapter 3 tonight"), None, 0, false, false);
    add_message(&conn, 2, 11, Some("I'm in"), None, 30, true, false);
    add_message(&conn, 2, 12, Some("<b>bold</b> & more"), None, 40, false, false);

    add_message(&conn, 3, 20, Some("ping"), None, 0, false, false);
    add_message(&conn, 3, 21, None, None, 10, false, false);

    add_message(&conn, 4, 30, Some("dinner?"), None, 0, false, false);
    add_message(&conn, 5, 40, Some("sent from mail"), None, 0, false, false);

    conn.execute(
        "INSERT INTO attachment VALUES (1, ?1, 'image/jpeg'), (2, '/nonexistent/media/gone.mov', 'video/quicktime')",
        params![photo.to_string_lossy()],
    )
    .unwrap();
    conn.execute_batch("INSERT INTO message_attachment_join VALUES (3, 1), (4, 2);")
        .unwrap();

    Archive { db, photo }
}

#[allow(clippy::too_many_arguments)]
fn add_message(
    conn: &Connection,
    chat: i64,
    id: i64,
    text: Option<&str>,
    body: Option<&[u8]>,
    offset: i64,
    from_me: bool,
    has_attachments: bool,
) {
    conn.execute(
        "INSERT INTO message VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![id, text, body, apple_ns(BASE_UNIX + offset), from_me, has_attachments],
    )
    .unwrap();
    conn.execute("INSERT INTO chat_message_join VALUES (?1, ?2)", params![chat, id])
        .unwrap();
}

/// Adds chat 7, an SMS thread with the same handle as chat 1: one new
/// message 90 s in, plus message 1 joined to both threads.
pub fn add_sms_thread(db: &Path) {
    let conn = Connection::open(db).unwrap();
    conn.execute_batch("INSERT INTO chat VALUES (7, '+16824380581', NULL);")
        .unwrap();
    add_message(&conn, 7, 5, Some("sent as SMS"), None, 90, false, false);
    conn.execute_batch("INSERT INTO chat_message_join VALUES (7, 1);")
        .unwrap();
}

/// Sets the group name of the chat with `identifier`.
pub fn rename_chat(db: &Path, identifier: &str, display_name: &str) {
    let conn = Connection::open(db).unwrap();
    conn.execute(
        "UPDATE chat SET display_name = ?1 WHERE chat_identifier = ?2",
        params![display_name, identifier],
    )
    .unwrap();
}

/// `name,phone` file: Alex under a formatted local number, Jordan under
/// the other number, one row too short to index.
pub fn write_contacts_csv(dir: &Path) -> PathBuf {
    let path = dir.join("contacts.csv");
    fs::write(
        &path,
        "name,phone\nAlex,(682) 438-0581\nJordan,+1 212 555 0100\nPat,555-1234\n",
    )
    .unwrap();
    path
}
