//! Security utilities for remote host validation
//!
//! Remote artifacts may only come from an allow-list of trusted registries.
//! The same check guards URL resolution and fetching, so a URL that fails here
//! can never reach the network or the cache.

use url::Url;

use crate::constants::DEFAULT_ALLOWED_DOMAINS;
use crate::core::MdxeError;

/// Exact-match allow-list of remote hosts.
///
/// Matching is on the full host name, case-insensitive. Subdomains of an
/// allowed host are *not* implicitly allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainAllowList {
    hosts: Vec<String>,
}

impl Default for DomainAllowList {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_DOMAINS.iter().copied())
    }
}

impl DomainAllowList {
    /// Build an allow-list from host names.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hosts: hosts.into_iter().map(|h| h.as_ref().trim().to_ascii_lowercase()).collect(),
        }
    }

    /// The configured host names.
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Check whether a bare host name is allowed.
    #[must_use]
    pub fn is_allowed(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.hosts.iter().any(|allowed| *allowed == host)
    }

    /// Parse `url` and verify its host.
    ///
    /// # Errors
    ///
    /// - [`MdxeError::InvalidUrl`] if `url` does not parse or has no host
    /// - [`MdxeError::DomainNotAllowed`] if the host is not on the list
    pub fn validate(&self, url: &str) -> Result<Url, MdxeError> {
        let parsed = Url::parse(url).map_err(|e| MdxeError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let host = parsed.host_str().ok_or_else(|| MdxeError::InvalidUrl {
            url: url.to_string(),
            reason: "URL has no host".to_string(),
        })?;

        if !self.is_allowed(host) {
            return Err(MdxeError::DomainNotAllowed {
                host: host.to_string(),
            });
        }

        Ok(parsed)
    }
}

/// Whether a specifier is an absolute http(s) URL.
#[must_use]
pub fn is_remote_url(specifier: &str) -> bool {
    specifier.starts_with("https://") || specifier.starts_with("http://")
}
