//! Temporary project with an isolated cache and a scripted network.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use crate::cache::CacheStore;
use crate::compiler::Compiler;
use crate::config::MdxeConfig;
use crate::fetcher::ArtifactFetcher;

use super::MockTransport;

/// A temp directory holding documents, local artifacts, and a cache root.
///
/// The directory is removed when the project is dropped.
#[derive(Debug)]
pub struct TestProject {
    temp: TempDir,
    /// Network stand-in shared by everything built from this project
    pub transport: Arc<MockTransport>,
    /// Configuration used by [`TestProject::compiler`]
    pub config: MdxeConfig,
}

impl TestProject {
    /// Empty project with default configuration and its own cache root.
    ///
    /// # Errors
    ///
    /// Fails if the temp directory cannot be created.
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("Failed to create temp project")?;
        let mut config = MdxeConfig::default();
        config.cache.dir = Some(temp.path().join("cache").display().to_string());

        Ok(Self {
            temp,
            transport: Arc::new(MockTransport::new()),
            config,
        })
    }

    /// Project root.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Cache root used by this project.
    pub fn cache_dir(&self) -> PathBuf {
        self.temp.path().join("cache")
    }

    /// Write `content` to `relative`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Fails on any filesystem error.
    pub fn write_file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.temp.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Cache store rooted in this project.
    pub fn cache(&self) -> CacheStore {
        CacheStore::new(self.cache_dir())
    }

    /// Fetcher over the project cache and the mock transport.
    pub fn fetcher(&self) -> ArtifactFetcher {
        ArtifactFetcher::new(self.cache(), self.transport.clone())
    }

    /// Compiler built from [`TestProject::config`] over the mock transport.
    ///
    /// # Errors
    ///
    /// Fails if a configured transform cannot be built.
    pub fn compiler(&self) -> Result<Compiler> {
        Compiler::with_transport(&self.config, self.transport.clone())
    }
}
