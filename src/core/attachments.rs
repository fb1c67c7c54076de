//! Copying attachment files next to a conversation document.
//!
//! The archive stores attachment paths such as
//! `~/Library/Messages/Attachments/ab/11/GUID/IMG_0001.HEIC`. Files are
//! copied into the conversation's `attachments/` folder; a name that is
//! already taken gets a numeric suffix (`IMG_0001_1.HEIC`, `IMG_0001_2.HEIC`).

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Name of the per-conversation attachment folder.
pub const ATTACHMENTS_DIR: &str = "attachments";

/// Expands a leading `~` to the home directory.
///
/// Paths without a leading `~`, and all paths when no home directory is
/// known, are returned unchanged.
pub fn expand_home(stored: &str) -> PathBuf {
    let rest = match stored.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(stored),
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(stored),
    }
}

/// First free path for `file_name` inside `dir`.
///
/// ```rust
/// use imsg_export::core::attachments::unique_destination;
///
/// let dir = tempfile::tempdir()?;
/// std::fs::write(dir.path().join("a.jpg"), b"x")?;
/// std::fs::write(dir.path().join("a_1.jpg"), b"x")?;
///
/// let dest = unique_destination(dir.path(), "a.jpg");
/// assert_eq!(dest.file_name().unwrap(), "a_2.jpg");
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn unique_destination(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|n| dir.join(format!("{stem}_{n}{ext}")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Copies `source` into `dir` under a collision-free name.
///
/// The modification time is carried over when the platform allows it.
/// Returns the destination path.
pub fn copy_into(source: &Path, dir: &Path) -> Result<PathBuf> {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());

    fs::create_dir_all(dir)?;
    let dest = unique_destination(dir, &file_name);
    fs::copy(source, &dest)?;

    if let Ok(modified) = fs::metadata(source).and_then(|m| m.modified()) {
        let _ = File::options()
            .write(true)
            .open(&dest)
            .and_then(|f| f.set_modified(modified));
    }

    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_leading_tilde() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(
            expand_home("~/Library/Messages/Attachments/a.jpg"),
            home.join("Library/Messages/Attachments/a.jpg")
        );
        assert_eq!(expand_home("~"), home);
    }

    #[test]
    fn test_expand_home_other_paths_unchanged() {
        assert_eq!(expand_home("/tmp/a.jpg"), PathBuf::from("/tmp/a.jpg"));
        assert_eq!(expand_home("~other/a.jpg"), PathBuf::from("~other/a.jpg"));
        assert_eq!(expand_home("dir/~/a.jpg"), PathBuf::from("dir/~/a.jpg"));
    }

    #[test]
    fn test_unique_destination_free_name() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(unique_destination(dir.path(), "a.jpg"), dir.path().join("a.jpg"));
    }

    #[test]
    fn test_unique_destination_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README"), b"x").unwrap();
        assert_eq!(
            unique_destination(dir.path(), "README"),
            dir.path().join("README_1")
        );
    }

    #[test]
    fn test_copy_into_renames_on_collision() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("IMG_0001.HEIC");
        fs::write(&source, b"image bytes").unwrap();

        let target = out_dir.path().join(ATTACHMENTS_DIR);
        let first = copy_into(&source, &target).unwrap();
        let second = copy_into(&source, &target).unwrap();

        assert_eq!(first, target.join("IMG_0001.HEIC"));
        assert_eq!(second, target.join("IMG_0001_1.HEIC"));
        assert_eq!(fs::read(&second).unwrap(), b"image bytes");
    }

    #[test]
    fn test_copy_into_missing_source() {
        let out_dir = tempfile::tempdir().unwrap();
        let result = copy_into(Path::new("/nonexistent/a.jpg"), out_dir.path());
        assert!(result.unwrap_err().is_io());
    }
}
