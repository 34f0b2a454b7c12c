//! Package specifier parsing and registry URL synthesis.
//!
//! Accepted forms:
//!
//! | Specifier                    | Package          | Version | Sub-path   |
//! |------------------------------|------------------|---------|------------|
//! | `react`                      | `react`          | -       | -          |
//! | `react@18.2.0`               | `react`          | 18.2.0  | -          |
//! | `react/jsx-runtime`          | `react`          | -       | jsx-runtime|
//! | `@mdx-js/react`              | `@mdx-js/react`  | -       | -          |
//! | `@mdx-js/react@3/dist/x.js`  | `@mdx-js/react`  | 3       | dist/x.js  |

use std::collections::BTreeMap;

use crate::constants::DEFAULT_REGISTRY_BASE;
use crate::core::MdxeError;

/// How a specifier string should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// Absolute `http(s)://` URL
    Url,
    /// Relative local path (`./` or `../`)
    Local,
    /// Registry package name, possibly scoped, versioned, or with a sub-path
    Package,
}

impl SpecifierKind {
    /// Classify a raw specifier.
    pub fn of(specifier: &str) -> Self {
        if crate::utils::is_remote_url(specifier) {
            Self::Url
        } else if is_local_specifier(specifier) {
            Self::Local
        } else {
            Self::Package
        }
    }
}

/// Whether a specifier is a relative local path.
pub fn is_local_specifier(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// A parsed registry package reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpecifier {
    /// Package name; scoped names keep their `@scope/name` form
    pub name: String,
    /// Version suffix, if any
    pub version: Option<String>,
    /// Path below the package root, without leading slash
    pub subpath: Option<String>,
}

impl PackageSpecifier {
    /// Parse a package specifier.
    ///
    /// # Errors
    ///
    /// [`MdxeError::UnresolvableSpecifier`] for empty names, a bare scope
    /// (`@scope`), or an empty version (`react@`).
    pub fn parse(specifier: &str) -> Result<Self, MdxeError> {
        let unresolvable = || MdxeError::UnresolvableSpecifier {
            specifier: specifier.to_string(),
        };

        let trimmed = specifier.trim().trim_matches('/');
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(unresolvable());
        }

        let mut segments = trimmed.split('/');
        let (scope, head) = if trimmed.starts_with('@') {
            let scope = segments.next().ok_or_else(unresolvable)?;
            let head = segments.next().ok_or_else(unresolvable)?;
            if scope.len() < 2 {
                return Err(unresolvable());
            }
            (Some(scope), head)
        } else {
            (None, segments.next().ok_or_else(unresolvable)?)
        };

        let (base_name, version) = match head.split_once('@') {
            Some((name, version)) => {
                if version.is_empty() {
                    return Err(unresolvable());
                }
                (name, Some(version.to_string()))
            }
            None => (head, None),
        };
        if base_name.is_empty() {
            return Err(unresolvable());
        }

        let name = match scope {
            Some(scope) => format!("{scope}/{base_name}"),
            None => base_name.to_string(),
        };

        let rest: Vec<&str> = segments.filter(|s| !s.is_empty()).collect();
        let subpath = if rest.is_empty() {
            None
        } else {
            Some(rest.join("/"))
        };

        Ok(Self {
            name,
            version,
            subpath,
        })
    }

    /// Render as a URL under `base_url`.
    pub fn to_url(&self, base_url: &str) -> String {
        let mut url = format!("{}/{}", base_url.trim_end_matches('/'), self.name);
        if let Some(version) = &self.version {
            url.push('@');
            url.push_str(version);
        }
        if let Some(subpath) = &self.subpath {
            url.push('/');
            url.push_str(subpath);
        }
        url
    }
}

/// Registry base URL plus package aliases.
///
/// Shared by the resolver (URL synthesis) and the fetcher (bare package
/// specifiers handed directly to `fetch`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    base_url: String,
    aliases: BTreeMap<String, String>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_BASE)
    }
}

impl Registry {
    /// Registry without aliases.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            aliases: BTreeMap::new(),
        }
    }

    /// Attach package aliases (`react-icons` → `react-icons@4.11.0`).
    #[must_use]
    pub fn with_aliases(mut self, aliases: BTreeMap<String, String>) -> Self {
        self.aliases = aliases;
        self
    }

    /// The registry base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Synthesize the registry URL for a package specifier.
    ///
    /// Aliases are matched against the package name and replace it (and any
    /// version it implies). `version` is used only when the specifier itself
    /// carries none.
    ///
    /// # Errors
    ///
    /// [`MdxeError::UnresolvableSpecifier`] if the specifier cannot be parsed.
    pub fn package_url(&self, specifier: &str, version: Option<&str>) -> Result<String, MdxeError> {
        let mut parsed = PackageSpecifier::parse(specifier)?;

        if let Some(alias) = self.aliases.get(&parsed.name) {
            let target = PackageSpecifier::parse(alias)?;
            parsed.name = target.name;
            if parsed.version.is_none() {
                parsed.version = target.version;
            }
            if parsed.subpath.is_none() {
                parsed.subpath = target.subpath;
            }
        }

        if parsed.version.is_none() {
            parsed.version = version.filter(|v| !v.trim().is_empty()).map(str::to_string);
        }

        Ok(parsed.to_url(&self.base_url))
    }
}
