//! Atomic file writes for exported artifacts.
//!
//! Writes go to a temporary file in the destination directory, are fsynced,
//! and then renamed over the destination, so a crashed export never leaves a
//! truncated PDF behind. A copy fallback handles the rare case where the
//! rename crosses filesystems.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

/// Atomically write raw bytes to a file using temp file + fsync + rename.
pub fn write_bytes_atomic(path: &Utf8Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create parent directory: {parent}"))?;
    }

    let temp_dir = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    let mut temp_file = NamedTempFile::new_in(temp_dir)
        .with_context(|| format!("Failed to create temporary file in: {temp_dir}"))?;

    temp_file
        .write_all(bytes)
        .context("Failed to write content to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .context("Failed to fsync temporary file")?;

    match temp_file.persist(path.as_std_path()) {
        Ok(_) => Ok(()),
        Err(err) if is_cross_filesystem_error(&err.error) => {
            tracing::debug!(%path, "rename crossed filesystems, copying instead");
            cross_filesystem_replace(bytes, path)
        }
        Err(err) => {
            Err(err.error).with_context(|| format!("Failed to atomically write file: {path}"))
        }
    }
}

/// Atomically write UTF-8 text, normalizing line endings to LF.
pub fn write_text_atomic(path: &Utf8Path, content: &str) -> Result<()> {
    let normalized = normalize_line_endings(content);
    write_bytes_atomic(path, normalized.as_bytes())
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

/// EXDEV: rename attempted across filesystem boundaries.
#[cfg(unix)]
fn is_cross_filesystem_error(err: &std::io::Error) -> bool {
    err.raw_os_error() == Some(18)
}

#[cfg(not(unix))]
fn is_cross_filesystem_error(_err: &std::io::Error) -> bool {
    false
}

/// Fallback when rename cannot move the temp file: write a fresh temp file
/// next to the destination and persist from there.
fn cross_filesystem_replace(bytes: &[u8], target: &Utf8Path) -> Result<()> {
    let target_dir = target.parent().unwrap_or_else(|| Utf8Path::new("."));
    let mut target_temp = NamedTempFile::new_in(target_dir)
        .with_context(|| format!("Failed to create temp file in target directory: {target_dir}"))?;

    target_temp
        .write_all(bytes)
        .context("Failed to write content during cross-filesystem copy")?;

    target_temp
        .as_file()
        .sync_all()
        .context("Failed to fsync during cross-filesystem copy")?;

    target_temp
        .persist(target.as_std_path())
        .map_err(|e| anyhow::anyhow!(e.error))
        .with_context(|| "Failed to persist during cross-filesystem copy")?;

    Ok(())
}
