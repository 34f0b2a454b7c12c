//! Core types and error handling for MDXE
//!
//! This module hosts the error taxonomy shared by every subsystem and the
//! small value types that flow between them: the [`Document`] being compiled
//! and the [`ArtifactReference`]s it declares.

pub mod error;

pub use error::{ErrorContext, MdxeError, user_friendly_error};

use serde::{Deserialize, Serialize};

/// Convenience alias used by library code.
pub type Result<T, E = MdxeError> = std::result::Result<T, E>;

/// A document submitted for compilation.
///
/// Immutable input created per compilation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Identifier used in diagnostics, usually the file path
    pub path: String,
    /// Full text including the frontmatter preamble
    pub raw_text: String,
}

impl Document {
    /// Create a document from an identifier and its raw text.
    pub fn new(path: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            raw_text: raw_text.into(),
        }
    }
}

/// A named reference to an external artifact.
///
/// Components are referenced by name; the layout reference uses the name
/// `layout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReference {
    /// Export name in the generated module
    pub name: String,
    /// URL, package name, relative path, or type identifier
    pub specifier: String,
    /// Optional version, applied when the specifier carries none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ArtifactReference {
    /// Reference without an explicit version.
    pub fn new(name: impl Into<String>, specifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specifier: specifier.into(),
            version: None,
        }
    }

    /// Attach a version to the reference.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}
