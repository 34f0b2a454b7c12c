//! Artifact fetching with caching and background revalidation
//!
//! [`ArtifactFetcher::fetch`] returns the source text for a specifier along one
//! of two disjoint paths:
//!
//! - **Local** (`./…`, `../…` with a base directory): each configured extension
//!   is appended in order and the first existing regular file is read. Local
//!   reads are never cached.
//! - **Remote** (URLs, and package names synthesized against the registry):
//!   the host is checked against the allow-list, then the [`CacheStore`] is
//!   consulted. Fresh entries are served directly. Entries in the refresh window
//!   are served too, and a detached task refetches them; that task's outcome is
//!   never observable to the caller. Misses fetch synchronously and populate the
//!   cache.
//!
//! A failed fetch never creates a cache entry.

pub mod transport;

pub use transport::{HttpResponse, ReqwestTransport, Transport};

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, Freshness};
use crate::constants::DEFAULT_LOCAL_EXTENSIONS;
use crate::core::MdxeError;
use crate::resolver::{Registry, SpecifierKind};
use crate::utils::DomainAllowList;

/// Retrieves artifact source text.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    cache: CacheStore,
    transport: Arc<dyn Transport>,
    allow_list: DomainAllowList,
    registry: Registry,
    extensions: Vec<String>,
}

impl ArtifactFetcher {
    /// Fetcher with the default allow-list, registry, and extension order.
    pub fn new(cache: CacheStore, transport: Arc<dyn Transport>) -> Self {
        Self {
            cache,
            transport,
            allow_list: DomainAllowList::default(),
            registry: Registry::default(),
            extensions: DEFAULT_LOCAL_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
        }
    }

    /// Replace the domain allow-list.
    #[must_use]
    pub fn with_allow_list(mut self, allow_list: DomainAllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    /// Replace the registry used for bare package specifiers.
    #[must_use]
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the ordered list of local extensions to probe.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// The underlying cache.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Fetch the source text for `specifier`.
    ///
    /// # Errors
    ///
    /// - [`MdxeError::LocalArtifactNotFound`] if no probed local file exists
    /// - [`MdxeError::UnresolvableSpecifier`] for a local specifier without a
    ///   base directory, or an unparseable package name
    /// - [`MdxeError::DomainNotAllowed`] if the remote host is not allowed
    /// - [`MdxeError::FetchError`] on transport failure or a non-2xx response
    pub async fn fetch(&self, specifier: &str, base_dir: Option<&Path>) -> Result<String, MdxeError> {
        match SpecifierKind::of(specifier) {
            SpecifierKind::Local => match base_dir {
                Some(base_dir) => self.fetch_local(specifier, base_dir).await,
                None => Err(MdxeError::UnresolvableSpecifier {
                    specifier: specifier.to_string(),
                }),
            },
            SpecifierKind::Url => self.fetch_remote(specifier).await,
            SpecifierKind::Package => {
                let url = self.registry.package_url(specifier, None)?;
                self.fetch_remote(&url).await
            }
        }
    }

    async fn fetch_local(&self, specifier: &str, base_dir: &Path) -> Result<String, MdxeError> {
        for extension in &self.extensions {
            let candidate = base_dir.join(format!("{specifier}{extension}"));
            match tokio::fs::metadata(&candidate).await {
                Ok(metadata) if metadata.is_file() => {
                    debug!("Resolved local artifact {} to {}", specifier, candidate.display());
                    return Ok(tokio::fs::read_to_string(&candidate).await?);
                }
                _ => continue,
            }
        }

        Err(MdxeError::LocalArtifactNotFound {
            specifier: specifier.to_string(),
            base_dir: base_dir.display().to_string(),
        })
    }

    async fn fetch_remote(&self, url: &str) -> Result<String, MdxeError> {
        self.allow_list.validate(url)?;

        if let Some(entry) = self.cache.lookup(url).await {
            if entry.freshness == Freshness::RefreshDue {
                debug!("Cache entry for {} is {}s old, refreshing in background", url, entry.age.as_secs());
                self.spawn_refresh(url);
            } else {
                debug!("Cache hit for {}", url);
            }
            return Ok(entry.content);
        }

        let body = download(self.transport.as_ref(), url).await?;
        info!("Fetched {} ({} bytes)", url, body.len());
        if let Err(e) = self.cache.store(url, &body).await {
            warn!("{:#}", e);
        }
        Ok(body)
    }

    /// Refetch `url` on a detached task, overwriting the cache on success.
    ///
    /// The handle is dropped; failures are logged and otherwise discarded.
    fn spawn_refresh(&self, url: &str) {
        let url = url.to_string();
        let cache = self.cache.clone();
        let transport = Arc::clone(&self.transport);

        tokio::spawn(async move {
            let body = match download(transport.as_ref(), &url).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Background refresh failed: {}", e);
                    return;
                }
            };
            match cache.store(&url, &body).await {
                Ok(_) => debug!("Background refresh updated {}", url),
                Err(e) => warn!("Background refresh failed: {:#}", e),
            }
        });
    }
}

async fn download(transport: &dyn Transport, url: &str) -> Result<String, MdxeError> {
    let response = transport.get(url).await.map_err(|e| MdxeError::FetchError {
        url: url.to_string(),
        cause: format!("{e:#}"),
    })?;

    if !response.is_success() {
        return Err(MdxeError::FetchError {
            url: url.to_string(),
            cause: response.status_line(),
        });
    }

    Ok(response.body)
}
