//! Configuration management for MDXE
//!
//! Project settings live in an optional `mdxe.toml`, found by walking up from
//! the working directory or named explicitly with `MDXE_CONFIG_PATH` or
//! `--config`. Every section is optional; a missing file means defaults.
//!
//! ```toml
//! [imports]
//! base_url = "https://esm.sh"
//! rewrite_bare_imports = true
//!
//! [imports.aliases]
//! react-icons = "react-icons@4.11.0"
//!
//! [security]
//! allowed_domains = ["esm.sh", "cdn.skypack.dev", "unpkg.com"]
//!
//! [cache]
//! dir = "~/.cache/mdxe"
//! ttl_hours = 24
//! refresh_window_minutes = 60
//!
//! [local]
//! extensions = [".tsx", ".jsx", ".ts", ".js"]
//!
//! [resolver]
//! probe = false
//! layout_tokens = ["layout", "theme"]
//!
//! [mappings.default.layouts]
//! "schema.org/Thing" = "https://esm.sh/@mdxui/thing-layout"
//!
//! [mappings.contexts."mdx.org.ai/docs".layouts]
//! "schema.org/BlogPosting" = "https://esm.sh/@mdxui/docs-layout"
//!
//! [types."mdx.org.ai/Guide"]
//! inherits = ["schema.org/BlogPosting"]
//! ```
//!
//! # Precedence
//!
//! - Config path: `--config`, then `MDXE_CONFIG_PATH`, then discovery
//! - Cache root: `MDXE_CACHE_DIR`, then `[cache].dir`, then the temp directory

mod parser;

pub use parser::parse_config;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::cache::CacheStore;
use crate::constants::{
    CACHE_DIR_ENV, CACHE_REFRESH_WINDOW, CACHE_TTL, CONFIG_PATH_ENV, DEFAULT_ALLOWED_DOMAINS,
    DEFAULT_LAYOUT_TOKENS, DEFAULT_LOCAL_EXTENSIONS, DEFAULT_REGISTRY_BASE,
};
use crate::core::MdxeError;
use crate::resolver::{Mappings, MappingsConfig, Registry, TypeConfig};
use crate::utils::{DomainAllowList, expand_path, find_config_file};

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// `[imports]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportsConfig {
    /// Registry base used to synthesize package URLs
    pub base_url: String,
    /// Package name → versioned package specifier
    pub aliases: BTreeMap<String, String>,
    /// Rewrite bare `import` statements in the body to registry URLs
    pub rewrite_bare_imports: bool,
}

impl Default for ImportsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REGISTRY_BASE.to_string(),
            aliases: BTreeMap::new(),
            rewrite_bare_imports: false,
        }
    }
}

/// `[security]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Hosts remote artifacts may be resolved to and fetched from
    pub allowed_domains: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_domains: to_strings(DEFAULT_ALLOWED_DOMAINS),
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root; `~` and environment variables are expanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// Entry lifetime in hours
    pub ttl_hours: u64,
    /// Background refresh window at the end of the lifetime, in minutes
    pub refresh_window_minutes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            ttl_hours: CACHE_TTL.as_secs() / 3600,
            refresh_window_minutes: CACHE_REFRESH_WINDOW.as_secs() / 60,
        }
    }
}

/// `[local]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Extensions probed, in order, for relative specifiers
    pub extensions: Vec<String>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            extensions: to_strings(DEFAULT_LOCAL_EXTENSIONS),
        }
    }
}

/// `[resolver]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Check synthesized URLs for reachability before accepting them
    pub probe: bool,
    /// Case-insensitive substrings that classify a specifier as a layout
    pub layout_tokens: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            probe: false,
            layout_tokens: to_strings(DEFAULT_LAYOUT_TOKENS),
        }
    }
}

/// Contents of `mdxe.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MdxeConfig {
    pub imports: ImportsConfig,
    pub security: SecurityConfig,
    pub cache: CacheConfig,
    pub local: LocalConfig,
    pub resolver: ResolverConfig,
    pub mappings: MappingsConfig,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub types: BTreeMap<String, TypeConfig>,
}

impl MdxeConfig {
    /// Locate the configuration file for a run started in `start`.
    ///
    /// `MDXE_CONFIG_PATH` wins over discovery.
    pub fn discover(start: &Path) -> Option<PathBuf> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Some(expand_path(&path)),
            _ => find_config_file(start),
        }
    }

    /// Load configuration from `explicit`, or from the discovered file.
    ///
    /// # Errors
    ///
    /// Fails if an explicitly named file is missing, or if the selected file
    /// cannot be parsed or holds invalid values.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(MdxeError::ConfigError {
                    message: format!("Config file not found: {}", path.display()),
                }
                .into());
            }
            return Self::load_from(path);
        }

        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        match Self::discover(&cwd) {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No {} found, using defaults", crate::constants::CONFIG_FILE_NAME);
                Ok(Self::default())
            }
        }
    }

    /// Load and validate a specific file.
    ///
    /// # Errors
    ///
    /// Fails on read, parse, or validation errors.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Self = parse_config(path)?;
        config.validate().with_context(|| format!("Invalid configuration in {}", path.display()))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check values that deserialize fine but cannot work.
    ///
    /// # Errors
    ///
    /// [`MdxeError::ConfigError`] describing the first invalid value.
    pub fn validate(&self) -> Result<(), MdxeError> {
        let invalid = |message: String| {
            Err(MdxeError::ConfigError {
                message,
            })
        };

        let base = url::Url::parse(&self.imports.base_url).map_err(|e| MdxeError::ConfigError {
            message: format!("imports.base_url '{}' is not a URL: {e}", self.imports.base_url),
        })?;
        if base.host_str().is_none() {
            return invalid(format!("imports.base_url '{}' has no host", self.imports.base_url));
        }
        if self.cache.ttl_hours == 0 {
            return invalid("cache.ttl_hours must be greater than zero".to_string());
        }
        if self.cache.ttl_hours.checked_mul(3600).is_none() {
            return invalid(format!("cache.ttl_hours {} is too large", self.cache.ttl_hours));
        }
        if self.cache.refresh_window_minutes.checked_mul(60).is_none() {
            return invalid(format!(
                "cache.refresh_window_minutes {} is too large",
                self.cache.refresh_window_minutes
            ));
        }
        if self.local.extensions.iter().any(|ext| !ext.starts_with('.')) {
            return invalid("local.extensions entries must start with '.'".to_string());
        }
        Ok(())
    }

    /// The domain allow-list.
    pub fn allow_list(&self) -> DomainAllowList {
        DomainAllowList::new(&self.security.allowed_domains)
    }

    /// Registry base plus aliases.
    pub fn registry(&self) -> Registry {
        Registry::new(self.imports.base_url.clone()).with_aliases(self.imports.aliases.clone())
    }

    /// Normalized mapping tables with type inheritance.
    pub fn mappings(&self) -> Mappings {
        Mappings::new(&self.mappings, &self.types)
    }

    /// Cache root after applying `MDXE_CACHE_DIR` and `[cache].dir`.
    pub fn cache_dir(&self) -> PathBuf {
        if std::env::var_os(CACHE_DIR_ENV).is_some() {
            return CacheStore::default_root();
        }
        match &self.cache.dir {
            Some(dir) => expand_path(dir),
            None => CacheStore::default_root(),
        }
    }

    /// Cache store configured from the `[cache]` section.
    pub fn cache_store(&self) -> CacheStore {
        CacheStore::new(self.cache_dir()).with_ttl(
            Duration::from_secs(self.cache.ttl_hours.saturating_mul(3600)),
            Duration::from_secs(self.cache.refresh_window_minutes.saturating_mul(60)),
        )
    }
}
