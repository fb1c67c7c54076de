//! HTML output writer.
//!
//! Produces one self-contained page per conversation, styled like the
//! Messages app: bubbles on the right for the archive owner, on the left
//! for everyone else, with a small `sender - timestamp` line above each.

use std::fs;
use std::path::Path;

use crate::Message;
use crate::config::OutputConfig;
use crate::error::Result;
use crate::message::{AttachmentKind, DisplayZone};

const STYLE: &str = "\
        body { font-family: -apple-system, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; background: #f5f5f5; }
        .message { margin: 10px 0; padding: 10px 15px; border-radius: 18px; max-width: 70%; clear: both; word-wrap: break-word; }
        .from-me { background: #007AFF; color: white; float: right; }
        .from-them { background: #E5E5EA; color: black; float: left; }
        .timestamp { font-size: 11px; color: #999; margin: 5px 10px; clear: both; }
        .attachment { max-width: 300px; border-radius: 10px; margin: 5px 0; }
        h1 { text-align: center; }
        .clear { clear: both; }
";

/// Writes one conversation as an HTML page.
pub fn write_html(
    title: &str,
    messages: &[Message],
    output_path: &Path,
    config: &OutputConfig,
) -> Result<()> {
    fs::write(output_path, to_html(title, messages, config))?;
    Ok(())
}

/// Renders one conversation as an HTML page.
///
/// Only [`OutputConfig::zone`] is read; pages always carry timestamps and
/// attachments.
///
/// ```rust
/// use imsg_export::Message;
/// use imsg_export::config::OutputConfig;
/// use imsg_export::core::output::to_html;
///
/// let page = to_html("Alex", &[Message::new("Alex", "1 < 2\nok")], &OutputConfig::new());
/// assert!(page.contains("<p>1 &lt; 2<br>ok</p>"));
/// ```
pub fn to_html(title: &str, messages: &[Message], config: &OutputConfig) -> String {
    let title = escape_text(title);
    let mut html = format!(
        "<!DOCTYPE html>
<html>
<head>
    <meta charset=\"UTF-8\">
    <title>{title}</title>
    <style>
{STYLE}    </style>
</head>
<body>
    <h1>{title}</h1>
"
    );

    for msg in messages {
        render_message(&mut html, msg, config.zone);
    }

    html.push_str("</body></html>");
    html
}

fn render_message(html: &mut String, msg: &Message, zone: DisplayZone) {
    let class = if msg.is_from_me { "from-me" } else { "from-them" };

    html.push_str(&format!(
        "<div class=\"timestamp\">{} - {}</div>\n",
        escape_text(&msg.sender),
        msg.display_timestamp(zone)
    ));
    html.push_str(&format!("<div class=\"message {class}\">\n"));

    if !msg.content.is_empty() {
        html.push_str(&format!(
            "<p>{}</p>\n",
            escape_text(&msg.content).replace('\n', "<br>")
        ));
    }

    for att in &msg.attachments {
        let src = encode_path(&att.relative_path);
        match att.kind {
            AttachmentKind::Image => {
                html.push_str(&format!("<img src=\"{src}\" class=\"attachment\"><br>\n"));
            }
            AttachmentKind::Video => html.push_str(&format!(
                "<video src=\"{src}\" class=\"attachment\" controls></video><br>\n"
            )),
            AttachmentKind::Other => html.push_str(&format!(
                "<a href=\"{src}\">📎 {}</a><br>\n",
                escape_text(&att.file_name)
            )),
        }
    }

    html.push_str("</div>\n<div class=\"clear\"></div>\n");
}

/// Escapes `&`, `<` and `>`.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Percent-encodes each segment of a `/`-separated relative path for use
/// in `src`/`href`. Only unreserved characters pass through, so the result
/// needs no further attribute escaping.
///
/// ```rust
/// use imsg_export::core::output::encode_path;
///
/// assert_eq!(encode_path("attachments/a #1?.jpg"), "attachments/a%20%231%3F.jpg");
/// ```
pub fn encode_path(path: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(path.len() + 8);
    for &b in path.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(char::from(b));
            }
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0F) as usize]));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Attachment;
    use chrono::{TimeZone, Utc};
    use tempfile::NamedTempFile;

    fn utc() -> OutputConfig {
        OutputConfig::new().with_zone(DisplayZone::Utc)
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a & b <i>"), "a &amp; b &lt;i&gt;");
        assert_eq!(escape_text("&lt;"), "&amp;lt;");
    }

    #[test]
    fn test_encode_path() {
        assert_eq!(encode_path("attachments/IMG_0001.HEIC"), "attachments/IMG_0001.HEIC");
        assert_eq!(encode_path("attachments/50% off.png"), "attachments/50%25%20off.png");
        assert_eq!(encode_path("attachments/a#b?c.jpg"), "attachments/a%23b%3Fc.jpg");
        assert_eq!(encode_path("attachments/c \"1\".pdf"), "attachments/c%20%221%22.pdf");
        assert_eq!(encode_path("attachments/Zoë.jpg"), "attachments/Zo%C3%AB.jpg");
    }

    #[test]
    fn test_page_structure() {
        let page = to_html("Book <Club>", &[], &utc());
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Book &lt;Club&gt;</title>"));
        assert!(page.contains("<h1>Book &lt;Club&gt;</h1>"));
        assert!(page.contains(".from-me { background: #007AFF"));
        assert!(page.ends_with("</body></html>"));
    }

    #[test]
    fn test_message_bubbles() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 18, 5, 0).unwrap();
        let messages = vec![
            Message::new("You", "hi").from_me(true).with_timestamp(ts),
            Message::new("Alex", "hey\nthere"),
        ];
        let page = to_html("Alex", &messages, &utc());

        assert!(page.contains("<div class=\"timestamp\">You - Mar 09, 2024 at 06:05 PM</div>"));
        assert!(page.contains("<div class=\"message from-me\">\n<p>hi</p>"));
        assert!(page.contains("<div class=\"timestamp\">Alex - Unknown</div>"));
        assert!(page.contains("<div class=\"message from-them\">\n<p>hey<br>there</p>"));
    }

    #[test]
    fn test_empty_body_has_no_paragraph() {
        let page = to_html("Alex", &[Message::new("Alex", "")], &utc());
        assert!(page.contains("<div class=\"message from-them\">\n</div>"));
        assert!(!page.contains("<p>"));
    }

    #[test]
    fn test_attachments() {
        let msg = Message::new("Alex", "")
            .with_attachment(Attachment::new("attachments/a.jpg", Some("image/jpeg")))
            .with_attachment(Attachment::new("attachments/b.mov", Some("video/quicktime")))
            .with_attachment(Attachment::new("attachments/c \"1\".pdf", Some("application/pdf")));
        let page = to_html("Alex", &[msg], &utc());

        assert!(page.contains("<img src=\"attachments/a.jpg\" class=\"attachment\"><br>"));
        assert!(page.contains("<video src=\"attachments/b.mov\" class=\"attachment\" controls></video><br>"));
        assert!(page.contains("<a href=\"attachments/c%20%221%22.pdf\">📎 c \"1\".pdf</a><br>"));
    }

    #[test]
    fn test_attachment_links_survive_url_syntax() {
        let msg = Message::new("Alex", "")
            .with_attachment(Attachment::new("attachments/track #2?.jpg", Some("image/jpeg")))
            .with_attachment(Attachment::new("attachments/100%.pdf", None));
        let page = to_html("Alex", &[msg], &utc());

        assert!(page.contains("<img src=\"attachments/track%20%232%3F.jpg\""));
        assert!(page.contains("<a href=\"attachments/100%25.pdf\">📎 100%.pdf</a>"));
    }

    #[test]
    fn test_timestamps_follow_zone() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 18, 5, 0).unwrap();
        let messages = [Message::new("Alex", "hi").with_timestamp(ts)];

        let local = to_html("Alex", &messages, &OutputConfig::new());
        let expected = messages[0].display_timestamp(DisplayZone::Local);
        assert!(local.contains(&format!("Alex - {expected}</div>")));

        let utc_page = to_html("Alex", &messages, &utc());
        assert!(utc_page.contains("Alex - Mar 09, 2024 at 06:05 PM</div>"));
    }

    #[test]
    fn test_write_html() {
        let file = NamedTempFile::new().unwrap();
        write_html("Alex", &[Message::new("Alex", "yo")], file.path(), &utc()).unwrap();
        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("<p>yo</p>"));
    }
}
