//! macOS Contacts app via AppleScript.
//!
//! Enumerating a large address book through AppleScript is slow (minutes
//! for thousands of people), so people are fetched in index ranges, each
//! call bounded by a timeout. A failed or timed-out range is logged and
//! skipped; the rest of the book still loads.

use std::io::{self, Read};
use std::process::{Child, Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::ContactSource;
use crate::config::ContactsConfig;
use crate::error::{ExportError, Result};
use crate::identity::ContactRecord;
use crate::progress::{Progress, ProgressCallback, Stage};

const SOURCE_NAME: &str = "macOS Contacts";
const POLL_INTERVAL: Duration = Duration::from_millis(100);

const COUNT_SCRIPT: &str = r#"tell application "Contacts" to count people"#;

/// Reads `name|first phone` pairs from the Contacts app.
#[derive(Clone)]
pub struct MacContactsSource {
    config: ContactsConfig,
    program: String,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for MacContactsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MacContactsSource")
            .field("config", &self.config)
            .field("program", &self.program)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Default for MacContactsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MacContactsSource {
    /// Creates a source with default chunking and timeouts.
    pub fn new() -> Self {
        Self::with_config(ContactsConfig::default())
    }

    /// Creates a source with custom chunking and timeouts.
    pub fn with_config(config: ContactsConfig) -> Self {
        Self {
            config,
            program: "osascript".to_string(),
            progress: None,
        }
    }

    /// Overrides the script interpreter (default: `osascript`).
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Reports progress after every chunk.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ContactsConfig {
        &self.config
    }

    /// Number of people in the address book.
    ///
    /// A non-zero exit (Contacts access denied, app missing) counts as an
    /// empty book.
    pub fn count_people(&self) -> Result<usize> {
        let output = self.run_script(COUNT_SCRIPT, self.config.count_timeout, "counting contacts")?;
        if !output.status.success() {
            tracing::warn!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "contact count failed"
            );
            return Ok(0);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout.trim().parse::<usize>().map_err(|_| {
            ExportError::contact_source(
                SOURCE_NAME,
                format!("unexpected count output: '{}'", stdout.trim()),
            )
        })
    }

    /// Fetches people `start..=end` (1-based, inclusive).
    pub fn fetch_range(&self, start: usize, end: usize) -> Result<Vec<ContactRecord>> {
        let what = format!("reading contacts {start}-{end}");
        let output = self.run_script(&chunk_script(start, end), self.config.chunk_timeout, &what)?;
        if !output.status.success() {
            return Err(ExportError::contact_source(
                SOURCE_NAME,
                format!(
                    "chunk {start}-{end} exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(parse_contact_lines(&String::from_utf8_lossy(&output.stdout)))
    }

    fn run_script(&self, script: &str, timeout: Duration, what: &str) -> Result<Output> {
        let mut child = Command::new(&self.program)
            .arg("-e")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                let reason = format!("cannot run {}: {e}", self.program);
                ExportError::contact_source(SOURCE_NAME, reason)
            })?;

        match wait_with_timeout(&mut child, timeout)? {
            Some(output) => Ok(output),
            None => {
                let _ = child.kill();
                let _ = child.wait();
                Err(ExportError::timeout(what, timeout.as_secs()))
            }
        }
    }

    fn report(&self, done: usize, total: usize) {
        if let Some(callback) = &self.progress {
            callback(Progress::new(Stage::Contacts, done).with_total(total));
        }
    }
}

impl ContactSource for MacContactsSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn fetch(&self) -> Result<Vec<ContactRecord>> {
        let total = self.count_people()?;
        let mut records = Vec::new();
        if total == 0 {
            return Ok(records);
        }

        let chunk = self.config.chunk_size.max(1);
        for start in (1..=total).step_by(chunk) {
            let end = (start + chunk - 1).min(total);
            match self.fetch_range(start, end) {
                Ok(mut batch) => records.append(&mut batch),
                Err(e) if e.is_timeout() => {
                    tracing::warn!(start, end, "contact chunk timed out, skipping");
                }
                Err(e) => tracing::warn!(start, end, error = %e, "contact chunk failed, skipping"),
            }
            self.report(end, total);
        }

        Ok(records)
    }
}

/// AppleScript printing `name|first phone` for people `start..=end`.
fn chunk_script(start: usize, end: usize) -> String {
    format!(
        r#"
tell application "Contacts"
    set output to ""
    repeat with i from {start} to {end}
        try
            set p to person i
            set pName to name of p
            if (count of phones of p) > 0 then
                set output to output & pName & "|" & (value of item 1 of phones of p) & linefeed
            end if
        end try
    end repeat
    return output
end tell
"#
    )
}

/// Parses `name|phone` lines, skipping anything malformed.
///
/// ```rust
/// use imsg_export::contacts::parse_contact_lines;
///
/// let records = parse_contact_lines("Alex|(682) 438-0581\nno separator\n|123\n");
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].name, "Alex");
/// ```
pub fn parse_contact_lines(stdout: &str) -> Vec<ContactRecord> {
    stdout
        .lines()
        .filter_map(|line| line.split_once('|'))
        .map(|(name, phone)| (name.trim(), phone.trim()))
        .filter(|(name, phone)| !name.is_empty() && !phone.is_empty())
        .map(|(name, phone)| ContactRecord::new(name, phone))
        .collect()
}

/// Polls `child` until it exits or `timeout` elapses.
///
/// Both pipes are drained on reader threads while polling, so a script
/// printing more than the pipe buffer still runs to completion. Returns
/// `None` on timeout; the caller owns killing the process.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Option<Output>> {
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let start = Instant::now();

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(Output {
                status,
                stdout: collect(stdout)?,
                stderr: collect(stderr)?,
            }));
        }

        // Readers are left detached: a grandchild may still hold the pipe.
        if start.elapsed() >= timeout {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Reads `pipe` to the end on a background thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(reader: JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    reader
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("pipe reader panicked")))
}
