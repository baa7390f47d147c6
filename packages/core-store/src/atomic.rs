//! Atomic file replacement.
//!
//! Content is written to a temporary file in the destination directory and
//! renamed over the final path. A reader sees either the old file or the new
//! one, never a partial write. A crash mid-write leaves the previous version in
//! place and at most an orphaned temp file.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};

/// Atomically replace `path` with `contents`.
///
/// The parent directory must already exist.
pub fn write_atomic(path: &Path, contents: &[u8], temp_prefix: &str) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::not_found("parent directory", path))?;
    if !dir.is_dir() {
        return Err(Error::not_found("directory", dir));
    }

    let mut temp = tempfile::Builder::new()
        .prefix(temp_prefix)
        .tempfile_in(dir)
        .map_err(|e| Error::io(dir, e))?;
    temp.write_all(contents)
        .map_err(|e| Error::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| Error::io(temp.path(), e))?;
    temp.persist(path).map_err(|e| Error::io(path, e.error))?;

    log::debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

/// Read a file as UTF-8, mapping a missing file to `NotFound`.
pub fn read_text(path: &Path, what: &str) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::not_found(what, path)),
        Err(e) => Err(Error::io(path, e)),
    }
}
