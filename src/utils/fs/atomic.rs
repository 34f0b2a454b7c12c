//! Atomic file write operations using temp-and-rename strategy.
//!
//! Readers of a file written here see either the previous content or the new
//! content, never a truncated mix. Concurrent writers of the same target each
//! use their own uniquely named temp file, so the last rename wins and no
//! writer can clobber another writer's half-written temp file.

use crate::utils::fs::dirs::ensure_dir;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Safely writes a string to a file using atomic operations.
///
/// Convenience wrapper around [`atomic_write`].
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// 1. Creates a uniquely named temp file next to the target
/// 2. Writes and syncs the content
/// 3. Renames the temp file over the target
///
/// The parent directory is created if missing. On failure the temp file is
/// removed and the target is left untouched.
///
/// # Examples
///
/// ```rust,no_run
/// use mdxe::utils::fs::atomic_write;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// atomic_write(Path::new("/tmp/mdxe-remote-cache/abc123"), b"export default 1")?;
/// # Ok(())
/// # }
/// ```
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    ensure_dir(parent)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".tmp-")
        .tempfile_in(parent)
        .with_context(|| format!("Failed to create temp file in: {}", parent.display()))?;

    temp.write_all(content)
        .with_context(|| format!("Failed to write to temp file: {}", temp.path().display()))?;
    temp.as_file().sync_all().with_context(|| "Failed to sync file to disk")?;

    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Async wrapper that runs [`atomic_write`] on the blocking thread pool.
pub async fn atomic_write_async(path: std::path::PathBuf, content: Vec<u8>) -> Result<()> {
    tokio::task::spawn_blocking(move || atomic_write(&path, &content))
        .await
        .context("Atomic write task panicked")?
}
