//! Path utilities for configuration discovery and user-supplied paths.

use std::path::{Path, PathBuf};

use crate::constants::CONFIG_FILE_NAME;

/// Walk up from `start` looking for `mdxe.toml`.
///
/// Returns the path of the first config file found, or `None` when the
/// filesystem root is reached.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());

    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Expand `~` and environment variables in a user-supplied path.
///
/// Falls back to the input unchanged when expansion fails (for example an
/// unset variable).
pub fn expand_path(input: &str) -> PathBuf {
    match shellexpand::full(input) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(input),
    }
}
