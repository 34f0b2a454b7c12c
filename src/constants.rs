//! Global constants used throughout the MDXE codebase.
//!
//! Cache freshness windows, default registry and allow-list values, and the
//! local extension probe order live here so that configuration defaults and
//! tests agree on a single source of truth.

use std::time::Duration;

/// Name of the folder created under the platform temp directory for cached artifacts.
pub const CACHE_DIR_NAME: &str = "mdxe-remote-cache";

/// Environment variable that overrides the cache root.
pub const CACHE_DIR_ENV: &str = "MDXE_CACHE_DIR";

/// Environment variable that points at an explicit `mdxe.toml`.
pub const CONFIG_PATH_ENV: &str = "MDXE_CONFIG_PATH";

/// File name searched for when discovering project configuration.
pub const CONFIG_FILE_NAME: &str = "mdxe.toml";

/// How long a cache entry is served without a synchronous refetch (24 hours).
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Width of the stale-while-revalidate window at the end of the TTL (1 hour).
///
/// Entries older than `CACHE_TTL - CACHE_REFRESH_WINDOW` are still served, but
/// trigger a detached background refetch.
pub const CACHE_REFRESH_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Registry used to synthesize URLs for bare package specifiers.
pub const DEFAULT_REGISTRY_BASE: &str = "https://esm.sh";

/// Hosts that remote artifacts may be fetched from.
pub const DEFAULT_ALLOWED_DOMAINS: &[&str] = &["esm.sh", "cdn.skypack.dev", "unpkg.com"];

/// Extensions probed, in order, when a local specifier is resolved against a base directory.
pub const DEFAULT_LOCAL_EXTENSIONS: &[&str] = &[".tsx", ".jsx", ".ts", ".js"];

/// Case-insensitive substrings that mark a specifier or context as layout-like.
pub const DEFAULT_LAYOUT_TOKENS: &[&str] = &["layout", "theme"];

/// Frontmatter key prefixes reserved for linked-data metadata.
pub const LINKED_DATA_PREFIXES: &[char] = &['$', '@'];
