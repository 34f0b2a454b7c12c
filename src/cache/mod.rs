//! Content-addressed cache for remote artifacts
//!
//! Fetched artifact bodies are stored on the local filesystem keyed by the
//! SHA-256 of the URL they were fetched from, so that repeated compilations do
//! not hit the network.
//!
//! # Cache Directory Structure
//!
//! ```text
//! $TMPDIR/mdxe-remote-cache/
//! ├── 3f1a…c9        # sha256(url) in lowercase hex, no extension
//! └── 9b0e…41
//! ```
//!
//! The root can be overridden with the `MDXE_CACHE_DIR` environment variable or
//! `[cache].dir` in `mdxe.toml`.
//!
//! # Freshness
//!
//! An entry's age is measured from its file modification time:
//!
//! | Age                                   | State                         |
//! |---------------------------------------|-------------------------------|
//! | `<= ttl - refresh_window`             | [`Freshness::Fresh`]          |
//! | `> ttl - refresh_window` and `< ttl`  | [`Freshness::RefreshDue`]     |
//! | `>= ttl`                              | [`Freshness::Expired`]        |
//!
//! Refresh-due entries are still served; the fetcher schedules a detached
//! background refetch. Expired entries are reported as misses.
//!
//! # Concurrency
//!
//! Writes go through [`crate::utils::fs::atomic_write_async`], so concurrent
//! readers never observe a partially written entry and concurrent writers of
//! the same key are last-writer-wins.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::debug;

use crate::constants::{CACHE_DIR_ENV, CACHE_DIR_NAME, CACHE_REFRESH_WINDOW, CACHE_TTL};
use crate::utils::fs::atomic_write_async;

/// Where an entry sits in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Served without further action
    Fresh,
    /// Served, and a background refetch should be scheduled
    RefreshDue,
    /// Treated as a miss
    Expired,
}

impl Freshness {
    /// Classify an entry age.
    pub fn of(age: Duration, ttl: Duration, refresh_window: Duration) -> Self {
        if age >= ttl {
            Self::Expired
        } else if age > ttl.saturating_sub(refresh_window) {
            Self::RefreshDue
        } else {
            Self::Fresh
        }
    }
}

/// A cache hit.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Hex SHA-256 of the URL
    pub key: String,
    /// Location of the entry on disk
    pub path: PathBuf,
    /// Cached artifact body
    pub content: String,
    /// When the entry was last written
    pub fetched_at: DateTime<Utc>,
    /// Time since `fetched_at`
    pub age: Duration,
    /// Freshness at lookup time; never [`Freshness::Expired`]
    pub freshness: Freshness,
}

/// Filesystem cache of remote artifact bodies.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
    ttl: Duration,
    refresh_window: Duration,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

impl CacheStore {
    /// Cache rooted at `root` with the default TTL and refresh window.
    ///
    /// The directory is created lazily on the first store.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ttl: CACHE_TTL,
            refresh_window: CACHE_REFRESH_WINDOW,
        }
    }

    /// Override the freshness parameters.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration, refresh_window: Duration) -> Self {
        self.ttl = ttl;
        self.refresh_window = refresh_window.min(ttl);
        self
    }

    /// `$MDXE_CACHE_DIR`, or `mdxe-remote-cache` under the platform temp directory.
    pub fn default_root() -> PathBuf {
        match std::env::var(CACHE_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => std::env::temp_dir().join(CACHE_DIR_NAME),
        }
    }

    /// The cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entry lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cache key for a URL: lowercase hex SHA-256 of the exact URL string.
    #[must_use]
    pub fn key_for(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// On-disk location of the entry for `url`.
    #[must_use]
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.root.join(Self::key_for(url))
    }

    /// Look up a live entry for `url`.
    ///
    /// Missing, unreadable, empty, non-UTF-8, and expired entries all yield
    /// `None`; the caller refetches and overwrites them.
    pub async fn lookup(&self, url: &str) -> Option<CacheEntry> {
        let key = Self::key_for(url);
        let path = self.root.join(&key);

        let metadata = tokio::fs::metadata(&path).await.ok()?;
        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(e) => {
                debug!("Cache entry {} has no usable mtime: {}", path.display(), e);
                return None;
            }
        };
        // Clock skew can put the mtime in the future; treat that as just written
        let age = SystemTime::now().duration_since(modified).unwrap_or(Duration::ZERO);

        let freshness = Freshness::of(age, self.ttl, self.refresh_window);
        if freshness == Freshness::Expired {
            debug!("Cache entry for {} expired ({}s old)", url, age.as_secs());
            return None;
        }

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Failed to read cache entry {}: {}", path.display(), e);
                return None;
            }
        };
        let content = match String::from_utf8(bytes) {
            Ok(content) if !content.is_empty() => content,
            _ => {
                debug!("Ignoring empty or undecodable cache entry {}", path.display());
                return None;
            }
        };

        Some(CacheEntry {
            key,
            path,
            content,
            fetched_at: DateTime::<Utc>::from(modified),
            age,
            freshness,
        })
    }

    /// Atomically write the body fetched from `url`, returning the entry path.
    ///
    /// # Errors
    ///
    /// Fails if the cache directory cannot be created or the write cannot be
    /// completed. No partial entry is left behind on failure.
    pub async fn store(&self, url: &str, content: &str) -> Result<PathBuf> {
        let path = self.path_for(url);
        atomic_write_async(path.clone(), content.as_bytes().to_vec())
            .await
            .with_context(|| format!("Failed to cache artifact from {url}"))?;
        debug!("Cached {} at {}", url, path.display());
        Ok(path)
    }
}
