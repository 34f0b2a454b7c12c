//! File system utilities
//!
//! - **Atomic writes**: cache entries are written to a unique temp file and
//!   renamed into place, so concurrent readers never see partial content
//! - **Directory creation**: the cache root is created lazily on first write
//! - **Path helpers**: config discovery and `~`/env expansion

pub mod atomic;
pub mod dirs;
pub mod paths;

pub use atomic::{atomic_write, atomic_write_async, safe_write};
pub use dirs::ensure_dir;
pub use paths::{expand_path, find_config_file};
