//! Reading and atomically replacing Markdown source files.

use std::path::{Path, PathBuf};

use tracing::debug;

use smartlinks_shared::{Result, SmartLinksError};

/// Read a source file fully.
pub fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| SmartLinksError::io(path, e))
}

/// Replace `path` with `contents` via a sibling temp file and a rename.
///
/// Readers see either the old or the new file, never a partial write. The
/// temp file is removed on every failure path.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let file_name = path.file_name().ok_or_else(|| {
        SmartLinksError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path"),
        )
    })?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let temp = TempFile::new(dir.join(format!(".{}.tmp", file_name.to_string_lossy())));

    std::fs::write(temp.path(), contents).map_err(|e| SmartLinksError::io(temp.path(), e))?;
    std::fs::rename(temp.path(), path).map_err(|e| SmartLinksError::io(path, e))?;
    temp.persisted();

    debug!(path = %path.display(), bytes = contents.len(), "wrote source file");
    Ok(())
}

/// Deletes its file on drop unless marked persisted.
struct TempFile {
    path: PathBuf,
    keep: bool,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self { path, keep: false }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn persisted(mut self) {
        self.keep = true;
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.keep {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
