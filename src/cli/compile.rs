//! `mdxe compile`

use anyhow::{Context, Result, anyhow};
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::compiler::exports::is_export_name;
use crate::compiler::{CompileOptions, Compiler};
use crate::config::MdxeConfig;
use crate::core::{ArtifactReference, Document};
use crate::utils::fs::safe_write;

/// Compile an MDX document into a module.
///
/// ```bash
/// mdxe compile docs/post                  # reads docs/post.mdx
/// mdxe compile post.mdx --component Button=react-button@1.0.0
/// mdxe compile post.mdx --layout @acme/docs-layout --metadata --out post.js
/// mdxe compile post.mdx --json
/// ```
#[derive(Args, Debug)]
pub struct CompileCommand {
    /// Document to compile; `.mdx` is appended when no extension is given
    file: PathBuf,

    /// Component as NAME=SPECIFIER; repeatable
    #[arg(long = "component", value_name = "NAME=SPEC", value_parser = parse_component)]
    components: Vec<ArtifactReference>,

    /// Layout specifier
    #[arg(long)]
    layout: Option<String>,

    /// Type identifier used to derive a layout (overrides `$type`)
    #[arg(long = "type", value_name = "TYPE")]
    type_id: Option<String>,

    /// Emit `export const metadata`
    #[arg(long)]
    metadata: bool,

    /// Print the full output (code and metadata) as JSON
    #[arg(long)]
    json: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// Parse `NAME=SPEC` or `NAME=SPEC@VERSION` for scoped and unscoped packages alike.
fn parse_component(raw: &str) -> Result<ArtifactReference> {
    let (name, specifier) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=SPECIFIER, got '{raw}'"))?;
    let (name, specifier) = (name.trim(), specifier.trim());
    if name.is_empty() || specifier.is_empty() {
        return Err(anyhow!("expected NAME=SPECIFIER, got '{raw}'"));
    }
    if !is_export_name(name) {
        return Err(anyhow!("'{name}' is not a valid component name"));
    }
    Ok(ArtifactReference::new(name, specifier))
}

/// Append `.mdx` to bare document names.
fn document_path(file: &Path) -> PathBuf {
    if file.extension().is_some() {
        file.to_path_buf()
    } else {
        file.with_extension("mdx")
    }
}

impl CompileCommand {
    pub async fn execute(self, config: &MdxeConfig) -> Result<()> {
        let path = document_path(&self.file);
        let raw_text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read document: {}", path.display()))?;

        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let options = CompileOptions {
            components: self.components,
            layout: self.layout.map(|specifier| ArtifactReference::new("layout", specifier)),
            type_id: self.type_id,
            base_dir: Some(base_dir),
            body: None,
            emit_metadata: self.metadata,
        };

        let compiler = Compiler::from_config(config)?;
        let document = Document::new(path.display().to_string(), raw_text);
        let output = compiler.compile(&document, &options).await?;

        let rendered = if self.json {
            serde_json::to_string_pretty(&output)?
        } else {
            output.code
        };

        match self.out {
            Some(out) => {
                safe_write(&out, &rendered)?;
                info!("Wrote {}", out.display());
            }
            None => println!("{rendered}"),
        }
        Ok(())
    }
}
