//! Document compilation pipeline
//!
//! [`Compiler::compile`] turns one MDX document into a module:
//!
//! 1. Split the preamble into plain and linked metadata
//! 2. Resolve and fetch every declared component, in declaration order
//! 3. Resolve and fetch the explicit layout, or try to derive one from the
//!    document type
//! 4. Run the body through the registered [`BodyTransform`]s
//! 5. Emit `export` statements (components, layout, optional metadata)
//!    followed by the body
//!
//! Compilation is all or nothing. A failure on any declared artifact aborts
//! with [`MdxeError::CompilationError`] naming the document and the specifier.
//! Only the derived layout is allowed to fail quietly.
//!
//! # Example
//!
//! ```rust,no_run
//! use mdxe::compiler::{CompileOptions, Compiler};
//! use mdxe::config::MdxeConfig;
//! use mdxe::core::{ArtifactReference, Document};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let compiler = Compiler::from_config(&MdxeConfig::default())?;
//! let document = Document::new("post.mdx", "---\ntitle: Hi\n---\n<Button />\n");
//! let options = CompileOptions::default()
//!     .with_component(ArtifactReference::new("Button", "react-button"));
//!
//! let output = compiler.compile(&document, &options).await?;
//! println!("{}", output.code);
//! # Ok(())
//! # }
//! ```

pub mod exports;
pub mod transform;

pub use transform::{BodyTransform, IdentityTransform, ImportRewriter, TransformOptions};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::MdxeConfig;
use crate::core::{ArtifactReference, Document, MdxeError};
use crate::fetcher::{ArtifactFetcher, ReqwestTransport, Transport};
use crate::markdown::{self, Metadata};
use crate::resolver::{SpecifierKind, SpecifierResolver};

/// Per-call compilation inputs.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Component references; override frontmatter declarations by name
    pub components: Vec<ArtifactReference>,
    /// Explicit layout; overrides a frontmatter `layout` entry
    pub layout: Option<ArtifactReference>,
    /// Type identifier for layout derivation; overrides `$type`
    pub type_id: Option<String>,
    /// Directory for relative specifiers
    pub base_dir: Option<PathBuf>,
    /// Pre-extracted body; metadata is still read from the document
    pub body: Option<String>,
    /// Emit `export const metadata = {...}`
    pub emit_metadata: bool,
}

impl CompileOptions {
    /// Add a component reference.
    #[must_use]
    pub fn with_component(mut self, reference: ArtifactReference) -> Self {
        self.components.push(reference);
        self
    }

    /// Set the explicit layout.
    #[must_use]
    pub fn with_layout(mut self, reference: ArtifactReference) -> Self {
        self.layout = Some(reference);
        self
    }

    /// Set the type used for layout derivation.
    #[must_use]
    pub fn with_type(mut self, type_id: impl Into<String>) -> Self {
        self.type_id = Some(type_id.into());
        self
    }

    /// Set the base directory for relative specifiers.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }
}

/// Result of a successful compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledOutput {
    /// Generated exports followed by the body
    pub code: String,
    /// Frontmatter entries without a linked-data prefix
    pub plain_metadata: Metadata,
    /// Linked-data entries actually present in the frontmatter
    pub linked_metadata: Metadata,
}

/// Drives resolution, fetching, and code generation for documents.
#[derive(Debug, Clone)]
pub struct Compiler {
    resolver: SpecifierResolver,
    fetcher: ArtifactFetcher,
    transforms: Vec<Arc<dyn BodyTransform>>,
}

impl Compiler {
    /// Compiler with no body transforms.
    pub fn new(resolver: SpecifierResolver, fetcher: ArtifactFetcher) -> Self {
        Self {
            resolver,
            fetcher,
            transforms: Vec::new(),
        }
    }

    /// Compiler using the network.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client or a configured transform cannot be built.
    pub fn from_config(config: &MdxeConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.allow_list())?);
        Self::with_transport(config, transport)
    }

    /// Compiler using `transport` for all network access.
    ///
    /// # Errors
    ///
    /// Fails if a configured transform cannot be built.
    pub fn with_transport(config: &MdxeConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let mut resolver = SpecifierResolver::new(config.registry(), config.allow_list())
            .with_mappings(config.mappings())
            .with_layout_tokens(config.resolver.layout_tokens.clone());
        if config.resolver.probe {
            resolver = resolver.with_probe(Arc::clone(&transport));
        }

        let fetcher = ArtifactFetcher::new(config.cache_store(), transport)
            .with_allow_list(config.allow_list())
            .with_registry(config.registry())
            .with_extensions(config.local.extensions.clone());

        let mut compiler = Self::new(resolver, fetcher);
        if config.imports.rewrite_bare_imports {
            compiler = compiler.with_transform(Arc::new(ImportRewriter::new(config.imports.base_url.clone())?));
        }
        Ok(compiler)
    }

    /// Append a body transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Arc<dyn BodyTransform>) -> Self {
        self.transforms.push(transform);
        self
    }

    /// The resolver used for non-URL specifiers.
    pub fn resolver(&self) -> &SpecifierResolver {
        &self.resolver
    }

    /// The fetcher used for artifact content.
    pub fn fetcher(&self) -> &ArtifactFetcher {
        &self.fetcher
    }

    /// Compile a document.
    ///
    /// # Errors
    ///
    /// Always [`MdxeError::CompilationError`], naming `document.path` and the
    /// specifier whose resolution or fetch failed.
    pub async fn compile(&self, document: &Document, options: &CompileOptions) -> Result<CompiledOutput, MdxeError> {
        let split = markdown::split(&document.raw_text);
        let body = options.body.clone().unwrap_or(split.body);
        let context = string_entry(&split.linked, "$context");
        let base_dir = options.base_dir.as_deref();
        let wrap = |specifier: &str| {
            let path = document.path.clone();
            let specifier = specifier.to_string();
            move |e: MdxeError| e.in_document(path, specifier)
        };

        let mut exports = Vec::new();

        for reference in declared_components(&split.plain, &options.components) {
            if !exports::is_export_name(&reference.name) {
                return Err(MdxeError::InvalidComponentName {
                    name: reference.name.clone(),
                }
                .in_document(document.path.clone(), reference.specifier.clone()));
            }
            let url = self
                .load(&reference, context.as_deref(), base_dir)
                .await
                .map_err(wrap(&reference.specifier))?;
            exports.push(exports::export_from(&reference.name, &url));
        }

        let layout = options.layout.clone().or_else(|| {
            string_entry(&split.plain, "layout").map(|specifier| ArtifactReference::new("layout", specifier))
        });
        if let Some(reference) = layout {
            let url = self
                .load(&reference, context.as_deref(), base_dir)
                .await
                .map_err(wrap(&reference.specifier))?;
            exports.push(exports::layout_export(&url));
        } else if let Some(type_id) = options.type_id.clone().or_else(|| string_entry(&split.linked, "$type")) {
            if let Some(url) = self.derive_layout(&type_id, context.as_deref()).await {
                exports.push(exports::layout_export(&url));
            }
        }

        if options.emit_metadata {
            exports.push(exports::metadata_export(&split.plain, &split.linked));
        }

        let transform_options = TransformOptions {
            path: document.path.clone(),
            base_dir: options.base_dir.clone(),
        };
        let mut body = body;
        for transform in &self.transforms {
            body = transform.transform(&body, &transform_options).map_err(|e| {
                MdxeError::Other {
                    message: format!("{e:#}"),
                }
                .in_document(document.path.clone(), transform.name())
            })?;
        }

        let mut code = exports.join("\n");
        if !exports.is_empty() {
            code.push('\n');
        }
        code.push_str(&body);

        debug!("Compiled {} with {} generated statement(s)", document.path, exports.len());

        Ok(CompiledOutput {
            code,
            plain_metadata: split.plain,
            linked_metadata: split.linked,
        })
    }

    /// Fetch a declared artifact and return the URL or path to export.
    async fn load(
        &self,
        reference: &ArtifactReference,
        context: Option<&str>,
        base_dir: Option<&Path>,
    ) -> Result<String, MdxeError> {
        let specifier = reference.specifier.trim();
        match SpecifierKind::of(specifier) {
            SpecifierKind::Url => {
                self.fetcher.fetch(specifier, None).await?;
                Ok(specifier.to_string())
            }
            SpecifierKind::Local => {
                self.fetcher.fetch(specifier, base_dir).await?;
                Ok(specifier.to_string())
            }
            SpecifierKind::Package => {
                let resolved = self.resolver.resolve(specifier, reference.version.as_deref(), context).await?;
                self.fetcher.fetch(&resolved.url, None).await?;
                Ok(resolved.url)
            }
        }
    }

    /// Best-effort layout for a type; every failure is logged and dropped.
    async fn derive_layout(&self, type_id: &str, context: Option<&str>) -> Option<String> {
        let resolved = match self.resolver.resolve(type_id, None, context).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("No layout for type '{}': {}", type_id, e);
                return None;
            }
        };
        match self.fetcher.fetch(&resolved.url, None).await {
            Ok(_) => Some(resolved.url),
            Err(e) => {
                warn!("No layout for type '{}': {}", type_id, e);
                None
            }
        }
    }
}

fn string_entry(metadata: &Metadata, key: &str) -> Option<String> {
    metadata.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Frontmatter `components` merged with explicit references; explicit wins by name.
fn declared_components(plain: &Metadata, explicit: &[ArtifactReference]) -> Vec<ArtifactReference> {
    let mut components: Vec<ArtifactReference> = Vec::new();

    if let Some(declared) = plain.get("components") {
        match declared.as_object() {
            Some(map) => {
                for (name, value) in map {
                    if !exports::is_export_name(name) {
                        warn!("Ignoring component {:?}: name is not a JavaScript identifier", name);
                        continue;
                    }
                    match value.as_str() {
                        Some(specifier) => components.push(ArtifactReference::new(name.clone(), specifier)),
                        None => warn!("Ignoring component '{}': specifier must be a string", name),
                    }
                }
            }
            None => warn!("Ignoring frontmatter 'components': expected an object"),
        }
    }

    for reference in explicit {
        match components.iter_mut().find(|c| c.name == reference.name) {
            Some(existing) => *existing = reference.clone(),
            None => components.push(reference.clone()),
        }
    }

    components
}
