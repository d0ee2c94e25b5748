//! Filesystem helpers for atomic writes.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Writes `content` to `path` atomically: write a `.tmp` sibling, sync it,
/// rename into place, then sync the parent directory where supported.
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let temp_path = temp_sibling(path);

    let mut file = File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;

    // Ensure data is persisted to disk before rename
    file.sync_all()?;

    // Drop file handle before rename (Windows compatibility)
    drop(file);

    fs::rename(&temp_path, path)?;

    sync_parent_dir(path);

    Ok(())
}

/// Builds `<path>.tmp` by appending rather than replacing the extension, so
/// `.sentryscan_baseline.json` becomes `.sentryscan_baseline.json.tmp`.
fn temp_sibling(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    // Durability of the rename itself; failure here is not actionable.
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn atomic_write_creates_new_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");

        atomic_write(&path, "test content").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "test content");
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "old content").unwrap();

        atomic_write(&path, "new content").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new content");
    }

    #[test]
    fn atomic_write_does_not_leave_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");

        atomic_write(&path, "content").unwrap();

        assert!(path.exists());
        assert!(!temp_sibling(&path).exists());
    }

    #[test]
    fn temp_sibling_appends_instead_of_replacing_extension() {
        let temp = temp_sibling(Path::new("/x/.sentryscan_baseline.json"));
        assert_eq!(temp, Path::new("/x/.sentryscan_baseline.json.tmp"));
    }
}
