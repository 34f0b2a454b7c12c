//! MDXE - MDX compilation with remote artifact resolution
//!
//! Compiles MDX documents whose components and layouts live on package
//! registries. Each document declares artifacts by package name, URL, relative
//! path, or type identifier; MDXE resolves them to URLs on an allow-listed
//! registry, fetches their source through a content-addressed cache, and emits
//! a module whose `export` statements precede the document body.
//!
//! # Architecture Overview
//!
//! ```text
//!            ┌──────────────┐
//! Document ─►│   markdown   │─► body, plain metadata, linked metadata
//!            └──────┬───────┘
//!                   ▼
//!            ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//!            │   compiler   │────►│   resolver   │     │    cache     │
//!            └──────┬───────┘     └──────────────┘     └──────▲───────┘
//!                   │                                         │
//!                   └──────────────►┌──────────────┐──────────┘
//!                                   │   fetcher    │──► Transport (HTTP)
//!                                   └──────────────┘
//! ```
//!
//! # Core Modules
//!
//! - [`markdown`] - Frontmatter splitting and plain/linked partitioning
//! - [`resolver`] - Specifier → URL resolution, mappings, classification
//! - [`cache`] - Content-addressed artifact cache with freshness tracking
//! - [`fetcher`] - Local and remote artifact retrieval, background refresh
//! - [`compiler`] - The compilation pipeline and body transforms
//!
//! ## Supporting Modules
//!
//! - [`config`] - `mdxe.toml` loading and defaults
//! - [`core`] - Error taxonomy and shared value types
//! - [`cli`] - The `mdxe` command
//! - [`utils`] - Atomic writes, path helpers, host allow-list
//!
//! # Example
//!
//! ```rust,no_run
//! use mdxe::compiler::{CompileOptions, Compiler};
//! use mdxe::config::MdxeConfig;
//! use mdxe::core::{ArtifactReference, Document};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = MdxeConfig::load(None)?;
//! let compiler = Compiler::from_config(&config)?;
//!
//! let document = Document::new(
//!     "post.mdx",
//!     "---\ntitle: Hello\n$type: https://schema.org/BlogPosting\n---\n<Button>Hi</Button>\n",
//! );
//! let options = CompileOptions::default()
//!     .with_component(ArtifactReference::new("Button", "react-button").with_version("1.0.0"));
//!
//! let output = compiler.compile(&document, &options).await?;
//! assert!(output.code.starts_with("export Button from 'https://esm.sh/react-button@1.0.0'"));
//! # Ok(())
//! # }
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! mdxe compile post.mdx --component Button=react-button
//! mdxe resolve @mdx-js/react
//! mdxe cache path
//! ```

// Pipeline
pub mod cache;
pub mod compiler;
pub mod fetcher;
pub mod markdown;
pub mod resolver;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
