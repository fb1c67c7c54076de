//! Document writers.
//!
//! Every writer renders one conversation:
//! - [`write_html`] / [`to_html`] - browsable page with chat bubbles (always available)
//! - [`write_csv`] / [`to_csv`] - CSV with semicolon delimiter - requires `csv-output` feature
//! - [`write_json`] / [`to_json`] - JSON array of messages - requires `json-output` feature
//! - [`write_jsonl`] / [`to_jsonl`] - JSON Lines - requires `json-output` feature
//!
//! # Choosing a Format
//!
//! | Format | Use Case |
//! |--------|----------|
//! | HTML | Reading conversations in a browser, inline images and video |
//! | CSV | Spreadsheets |
//! | JSON | Structured data, APIs |
//! | JSONL | Streaming, search indexing |

mod html_writer;

#[cfg(feature = "csv-output")]
mod csv_writer;
#[cfg(feature = "json-output")]
mod json_writer;
#[cfg(feature = "json-output")]
mod jsonl_writer;

pub use html_writer::{encode_path, escape_text, to_html, write_html};

#[cfg(feature = "csv-output")]
pub use csv_writer::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use json_writer::{to_json, write_json};
#[cfg(feature = "json-output")]
pub use jsonl_writer::{to_jsonl, write_jsonl};
