//! Shared utilities
//!
//! - [`fs`] - Atomic writes, directory creation, and path helpers
//! - [`security`] - Remote host allow-list enforcement

pub mod fs;
pub mod security;

pub use fs::{atomic_write, ensure_dir, expand_path, find_config_file};
pub use security::{DomainAllowList, is_remote_url};
