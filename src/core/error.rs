//! Error handling for MDXE
//!
//! This module provides the error taxonomy for artifact resolution, fetching, and
//! document compilation, plus user-friendly rendering for the CLI. The design
//! follows two rules:
//! 1. **Strongly-typed errors** so callers can match on the exact failure
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Security**: [`MdxeError::DomainNotAllowed`]
//! - **Resolution**: [`MdxeError::UnresolvableSpecifier`], [`MdxeError::InvalidUrl`],
//!   [`MdxeError::InvalidComponentName`]
//! - **Fetching**: [`MdxeError::FetchError`], [`MdxeError::LocalArtifactNotFound`]
//! - **Compilation**: [`MdxeError::CompilationError`], the only error that escapes
//!   [`crate::compiler::Compiler::compile`]
//! - **Ambient**: [`MdxeError::ConfigError`], [`MdxeError::IoError`], [`MdxeError::TomlError`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use mdxe::core::{MdxeError, user_friendly_error};
//!
//! let error = MdxeError::DomainNotAllowed {
//!     host: "evil.example.com".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Colored error with a suggestion
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for MDXE operations.
///
/// Every variant carries the identifiers a user needs to find the offending
/// reference (host, specifier, URL, or document path) without re-running with
/// verbose logging.
#[derive(Error, Debug)]
pub enum MdxeError {
    /// Remote host is not in the allow-list.
    ///
    /// Always fatal to the fetch or resolve call that produced it and never retried.
    #[error("Domain {host} not allowed for remote imports")]
    DomainNotAllowed {
        /// The rejected host name
        host: String,
    },

    /// None of the probed extensions matched an existing file.
    #[error("Local artifact not found: {specifier} in {base_dir}")]
    LocalArtifactNotFound {
        /// The relative specifier as written in the document
        specifier: String,
        /// The directory it was resolved against
        base_dir: String,
    },

    /// Non-2xx response or transport failure on a required fetch.
    #[error("Failed to fetch artifact from {url}: {cause}")]
    FetchError {
        /// The URL that was requested
        url: String,
        /// Upstream status line or transport message
        cause: String,
    },

    /// The resolver found no mapping and could not synthesize a usable URL.
    #[error("Unable to resolve specifier '{specifier}'")]
    UnresolvableSpecifier {
        /// The specifier that could not be resolved
        specifier: String,
    },

    /// A string that should have been a URL could not be parsed as one.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending input
        url: String,
        /// Parser message
        reason: String,
    },

    /// A component name cannot be emitted as a JavaScript export binding.
    #[error("Invalid component name '{name}': expected a JavaScript identifier")]
    InvalidComponentName {
        /// The rejected name
        name: String,
    },

    /// Compilation of a document failed.
    ///
    /// Wraps the underlying failure with the document identifier and the
    /// specifier that triggered it.
    #[error("Failed to compile {path} while processing '{specifier}'")]
    CompilationError {
        /// Document identifier (usually its path)
        path: String,
        /// The specifier or URL whose resolution failed
        specifier: String,
        /// The underlying failure
        #[source]
        source: Box<MdxeError>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for MdxeError {
    fn clone(&self) -> Self {
        match self {
            Self::DomainNotAllowed {
                host,
            } => Self::DomainNotAllowed {
                host: host.clone(),
            },
            Self::LocalArtifactNotFound {
                specifier,
                base_dir,
            } => Self::LocalArtifactNotFound {
                specifier: specifier.clone(),
                base_dir: base_dir.clone(),
            },
            Self::FetchError {
                url,
                cause,
            } => Self::FetchError {
                url: url.clone(),
                cause: cause.clone(),
            },
            Self::UnresolvableSpecifier {
                specifier,
            } => Self::UnresolvableSpecifier {
                specifier: specifier.clone(),
            },
            Self::InvalidUrl {
                url,
                reason,
            } => Self::InvalidUrl {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::InvalidComponentName {
                name,
            } => Self::InvalidComponentName {
                name: name.clone(),
            },
            Self::CompilationError {
                path,
                specifier,
                source,
            } => Self::CompilationError {
                path: path.clone(),
                specifier: specifier.clone(),
                source: source.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            // io::Error is not Clone; keep the kind and message
            Self::IoError(e) => Self::IoError(std::io::Error::new(e.kind(), e.to_string())),
            // toml::de::Error is not Clone either
            Self::TomlError(e) => Self::ConfigError {
                message: e.to_string(),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

impl MdxeError {
    /// Wrap this error with the identity of the document being compiled.
    ///
    /// Already-wrapped errors are returned unchanged so the innermost document
    /// context is preserved.
    #[must_use]
    pub fn in_document(self, path: impl Into<String>, specifier: impl Into<String>) -> Self {
        match self {
            wrapped @ Self::CompilationError {
                ..
            } => wrapped,
            other => Self::CompilationError {
                path: path.into(),
                specifier: specifier.into(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost cause, unwrapping any [`MdxeError::CompilationError`] layers.
    #[must_use]
    pub fn root_cause(&self) -> &MdxeError {
        match self {
            Self::CompilationError {
                source,
                ..
            } => source.root_cause(),
            other => other,
        }
    }

    /// Full diagnostic line including the wrapped cause.
    ///
    /// `Display` follows the usual convention of not repeating the source; CLI
    /// rendering and logs want everything on one line.
    #[must_use]
    pub fn full_message(&self) -> String {
        match self {
            Self::CompilationError {
                source,
                ..
            } => format!("{self}: {}", source.full_message()),
            other => other.to_string(),
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Wraps a [`MdxeError`] with optional details and a suggestion, displayed in
/// color on the terminal.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying MDXE error
    pub error: MdxeError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`MdxeError`]
    #[must_use]
    pub const fn new(error: MdxeError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error.full_message());

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error.full_message())?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`MdxeError`] (including compilation-wrapped errors, which are
/// classified by their root cause), [`std::io::Error`] and [`toml::de::Error`].
/// Anything else is reported with its full `anyhow` chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(mdxe_error) = error.downcast_ref::<MdxeError>() {
        return create_error_context(mdxe_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(MdxeError::Other {
                    message: format!("Permission denied: {io_error}"),
                })
                .with_suggestion("Check ownership and permissions of the document and cache directories");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(MdxeError::Other {
                    message: format!("File not found: {io_error}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(MdxeError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in your mdxe.toml file. Verify quotes, brackets, and indentation");
    }

    // Generic error - include the full error chain
    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(MdxeError::Other {
        message,
    })
}

fn create_error_context(error: MdxeError) -> ErrorContext {
    let suggestion = match error.root_cause() {
        MdxeError::DomainNotAllowed {
            host,
        } => Some(format!(
            "Use a package name or a URL on a trusted registry, or add '{host}' to [security].allowed_domains in mdxe.toml"
        )),
        MdxeError::LocalArtifactNotFound {
            specifier,
            ..
        } => Some(format!(
            "Create '{specifier}' with one of the configured extensions or fix the relative path"
        )),
        MdxeError::FetchError {
            ..
        } => Some(
            "Check your network connection and that the package or version exists on the registry"
                .to_string(),
        ),
        MdxeError::UnresolvableSpecifier {
            ..
        } => Some(
            "Add a mapping under [mappings] in mdxe.toml or reference the artifact by URL".to_string(),
        ),
        MdxeError::InvalidComponentName {
            ..
        } => Some(
            "Use letters, digits, '_' or '$' for component names, not starting with a digit".to_string(),
        ),
        MdxeError::ConfigError {
            ..
        }
        | MdxeError::TomlError(_) => {
            Some("Check the syntax and values in your mdxe.toml file".to_string())
        }
        _ => None,
    };

    let details = match &error {
        MdxeError::CompilationError {
            path,
            ..
        } => Some(format!("The document {path} was not compiled; no partial output was produced")),
        MdxeError::DomainNotAllowed {
            ..
        } => Some("Remote imports are restricted to an allow-list of trusted registries".to_string()),
        _ => None,
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(suggestion) = suggestion {
        ctx = ctx.with_suggestion(suggestion);
    }
    if let Some(details) = details {
        ctx = ctx.with_details(details);
    }
    ctx
}
