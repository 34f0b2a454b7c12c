//! Body transforms applied after metadata splitting.
//!
//! The markup compiler proper lives outside this crate; [`BodyTransform`] is
//! the seam it plugs into. Transforms run in registration order, each
//! receiving the previous one's output.

use anyhow::Result;
use regex::{Captures, Regex};
use std::fmt;
use std::path::PathBuf;

use crate::utils::is_remote_url;

/// Per-document inputs available to transforms.
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// Document identifier
    pub path: String,
    /// Directory relative specifiers resolve against
    pub base_dir: Option<PathBuf>,
}

/// A rewrite of the document body.
pub trait BodyTransform: Send + Sync + fmt::Debug {
    /// Short identifier used in diagnostics.
    fn name(&self) -> &str;

    /// Rewrite `body`.
    ///
    /// # Errors
    ///
    /// Any error aborts the compilation of the current document.
    fn transform(&self, body: &str, options: &TransformOptions) -> Result<String>;
}

/// Returns the body unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl BodyTransform for IdentityTransform {
    fn name(&self) -> &str {
        "identity"
    }

    fn transform(&self, body: &str, _options: &TransformOptions) -> Result<String> {
        Ok(body.to_string())
    }
}

/// Rewrites bare package imports to registry URLs.
///
/// ```text
/// import Chart from 'recharts'          -> import Chart from 'https://esm.sh/recharts'
/// import { a, b } from "lodash-es"      -> import { a, b } from 'https://esm.sh/lodash-es'
/// import Local from './Local'           (unchanged)
/// ```
#[derive(Debug, Clone)]
pub struct ImportRewriter {
    base_url: String,
    pattern: Regex,
}

impl ImportRewriter {
    /// Rewriter targeting `base_url`.
    ///
    /// # Errors
    ///
    /// Fails only if the import pattern cannot be compiled.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let pattern = Regex::new(r#"import\s+(?:\{\s*([^}]+?)\s*\}|([^'"{}]+?))\s+from\s+['"]([^'"]+)['"]"#)?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            pattern,
        })
    }

    fn rewrite(&self, caps: &Captures<'_>) -> String {
        let original = caps[0].to_string();
        let path = &caps[3];
        if path.starts_with('.') || path.starts_with('/') || is_remote_url(path) {
            return original;
        }

        let target = format!("{}/{}", self.base_url, path);
        if let Some(named) = caps.get(1) {
            let names: Vec<&str> = named.as_str().split(',').map(str::trim).filter(|n| !n.is_empty()).collect();
            format!("import {{ {} }} from '{}'", names.join(", "), target)
        } else {
            format!("import {} from '{}'", caps[2].trim(), target)
        }
    }
}

impl BodyTransform for ImportRewriter {
    fn name(&self) -> &str {
        "import-rewriter"
    }

    fn transform(&self, body: &str, _options: &TransformOptions) -> Result<String> {
        Ok(self.pattern.replace_all(body, |caps: &Captures<'_>| self.rewrite(caps)).into_owned())
    }
}
