//! Specifier resolution
//!
//! Maps a logical artifact reference (URL, package name, or type identifier)
//! to a fetchable URL on a trusted registry and classifies it as a component
//! or a layout.
//!
//! # Resolution Order
//!
//! 1. Known mappings: the `$context`-specific table, then the default table
//!    (see [`mappings`])
//! 2. Absolute URLs pass through unchanged
//! 3. Anything else is treated as a package name and synthesized against the
//!    registry base (see [`specifier::Registry`])
//!
//! Every result, mapped or not, is checked against the domain allow-list. When
//! probing is enabled, synthesized and pass-through URLs are additionally
//! checked for reachability; a failed probe degrades to
//! [`MdxeError::UnresolvableSpecifier`] rather than a transport error.
//!
//! # Example
//!
//! ```rust,no_run
//! use mdxe::resolver::{ArtifactKind, SpecifierResolver};
//!
//! # async fn example() -> Result<(), mdxe::core::MdxeError> {
//! let resolver = SpecifierResolver::default();
//! let resolved = resolver.resolve("@mdx-js/react", None, None).await?;
//! assert_eq!(resolved.url, "https://esm.sh/@mdx-js/react");
//! assert_eq!(resolved.kind, ArtifactKind::Component);
//! # Ok(())
//! # }
//! ```

pub mod mappings;
pub mod specifier;

pub use mappings::{MappedArtifact, MappingTable, Mappings, MappingsConfig, TypeConfig};
pub use specifier::{PackageSpecifier, Registry, SpecifierKind, is_local_specifier};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::constants::DEFAULT_LAYOUT_TOKENS;
use crate::core::MdxeError;
use crate::fetcher::Transport;
use crate::utils::DomainAllowList;

/// What role a resolved artifact plays in the compiled module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Named, reusable fragment; any number per document
    Component,
    /// Singular wrapper around the document body
    Layout,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component => write!(f, "component"),
            Self::Layout => write!(f, "layout"),
        }
    }
}

/// Result of resolving a specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSpecifier {
    /// Fetchable URL on an allowed host
    pub url: String,
    /// Inferred or mapped artifact kind
    pub kind: ArtifactKind,
}

/// Classify a specifier by a case-insensitive token match on it and its context.
pub fn classify(specifier: &str, context: Option<&str>, layout_tokens: &[String]) -> ArtifactKind {
    let specifier = specifier.to_lowercase();
    let context = context.map(str::to_lowercase).unwrap_or_default();

    let is_layout = layout_tokens.iter().any(|token| {
        let token = token.to_lowercase();
        !token.is_empty() && (specifier.contains(&token) || context.contains(&token))
    });

    if is_layout {
        ArtifactKind::Layout
    } else {
        ArtifactKind::Component
    }
}

/// Resolves specifiers to allowed, fetchable URLs.
#[derive(Debug, Clone)]
pub struct SpecifierResolver {
    registry: Registry,
    allow_list: DomainAllowList,
    mappings: Arc<Mappings>,
    layout_tokens: Vec<String>,
    probe: Option<Arc<dyn Transport>>,
}

impl Default for SpecifierResolver {
    fn default() -> Self {
        Self::new(Registry::default(), DomainAllowList::default())
    }
}

impl SpecifierResolver {
    /// Resolver with no mappings and no probe.
    pub fn new(registry: Registry, allow_list: DomainAllowList) -> Self {
        Self {
            registry,
            allow_list,
            mappings: Arc::new(Mappings::default()),
            layout_tokens: DEFAULT_LAYOUT_TOKENS.iter().map(|t| (*t).to_string()).collect(),
            probe: None,
        }
    }

    /// Use the given mapping tables.
    #[must_use]
    pub fn with_mappings(mut self, mappings: Mappings) -> Self {
        self.mappings = Arc::new(mappings);
        self
    }

    /// Replace the layout-indicating vocabulary.
    #[must_use]
    pub fn with_layout_tokens(mut self, tokens: Vec<String>) -> Self {
        self.layout_tokens = tokens;
        self
    }

    /// Probe unmapped URLs through `transport` before accepting them.
    #[must_use]
    pub fn with_probe(mut self, transport: Arc<dyn Transport>) -> Self {
        self.probe = Some(transport);
        self
    }

    /// The registry used for URL synthesis.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve a specifier.
    ///
    /// # Errors
    ///
    /// - [`MdxeError::DomainNotAllowed`] if the resulting URL's host is not allowed
    /// - [`MdxeError::UnresolvableSpecifier`] for local paths, unparseable
    ///   package names, or a failed probe
    /// - [`MdxeError::InvalidUrl`] if a mapped or given URL cannot be parsed
    pub async fn resolve(
        &self,
        specifier: &str,
        version: Option<&str>,
        context: Option<&str>,
    ) -> Result<ResolvedSpecifier, MdxeError> {
        let specifier = specifier.trim();

        if let Some(mapped) = self.mappings.lookup(context, specifier) {
            self.allow_list.validate(&mapped.url)?;
            debug!("Resolved '{}' via mapping to {} ({})", specifier, mapped.url, mapped.kind);
            return Ok(ResolvedSpecifier {
                url: mapped.url,
                kind: mapped.kind,
            });
        }

        let url = match SpecifierKind::of(specifier) {
            SpecifierKind::Url => specifier.to_string(),
            SpecifierKind::Local => {
                return Err(MdxeError::UnresolvableSpecifier {
                    specifier: specifier.to_string(),
                });
            }
            SpecifierKind::Package => self.registry.package_url(specifier, version)?,
        };

        self.allow_list.validate(&url)?;

        if let Some(transport) = &self.probe {
            self.probe(transport.as_ref(), specifier, &url).await?;
        }

        let kind = classify(specifier, context, &self.layout_tokens);
        debug!("Resolved '{}' to {} ({})", specifier, url, kind);

        Ok(ResolvedSpecifier {
            url,
            kind,
        })
    }

    async fn probe(&self, transport: &dyn Transport, specifier: &str, url: &str) -> Result<(), MdxeError> {
        let unresolvable = || MdxeError::UnresolvableSpecifier {
            specifier: specifier.to_string(),
        };

        match transport.head(url).await {
            Ok(status) if (200..300).contains(&status) => Ok(()),
            Ok(status) => {
                warn!("Probe of {} returned HTTP {}", url, status);
                Err(unresolvable())
            }
            Err(e) => {
                warn!("Probe of {} failed: {:#}", url, e);
                Err(unresolvable())
            }
        }
    }
}
