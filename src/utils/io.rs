//! Filesystem primitives with uniform error wrapping.
//!
//! Every helper takes an `operation` label that ends up in the error
//! details, so a failed scaffold names the step that broke.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

fn io_err(err: std::io::Error, operation: impl Into<String>) -> Error {
    Error::internal_io(err.to_string(), Some(operation.into()))
}

pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| io_err(e, operation))
}

pub fn write_file(path: &Path, content: &str, operation: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| io_err(e, operation))
}

/// Write `content` via a sibling temp file and rename over `path`.
///
/// The rename is atomic on POSIX filesystems: readers see either the old
/// content or the new content, never a torn write. Used for the master
/// flake, which other tooling may be reading concurrently.
pub fn write_file_atomic(path: &Path, content: &str, operation: &str) -> Result<()> {
    let (parent, filename) = match (path.parent(), path.file_name()) {
        (Some(parent), Some(filename)) => (parent, filename),
        _ => {
            return Err(Error::internal_io(
                format!("Invalid path: {}", path.display()),
                Some(operation.to_string()),
            ))
        }
    };

    let tmp_path = parent.join(format!("{}.tmp", filename.to_string_lossy()));
    fs::write(&tmp_path, content).map_err(|e| io_err(e, format!("{} (write temp)", operation)))?;
    fs::rename(&tmp_path, path).map_err(|e| io_err(e, format!("{} (rename)", operation)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn read_round_trips_written_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");

        write_file(&path, "content", "test").unwrap();
        assert_eq!(read_file(&path, "test").unwrap(), "content");
    }

    #[test]
    fn read_file_wraps_missing_file_errors() {
        let err = read_file(Path::new("/nonexistent/path.txt"), "test read").unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
        assert_eq!(
            err.details.get("context").and_then(|v| v.as_str()),
            Some("test read")
        );
    }

    #[test]
    fn atomic_write_replaces_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flake.nix");
        fs::write(&path, "old").unwrap();

        write_file_atomic(&path, "new", "test write").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!dir.path().join("flake.nix.tmp").exists());
    }

    #[test]
    fn atomic_write_rejects_bare_root_path() {
        let err = write_file_atomic(Path::new("/"), "x", "test write").unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
    }
}
